//! Configuration manager for the accounts service.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::validation::{EmailRule, PasswordRule};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8888;
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid `{field}` bounds: min {min}, max {max}")]
    InvalidBounds {
        field: &'static str,
        min: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Message returned for each error code.
    #[serde(default)]
    pub error_messages: ErrorMessages,
    /// Bounds of the field rules.
    #[serde(default)]
    pub rules: Rules,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            port: DEFAULT_PORT,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            error_messages: ErrorMessages::default(),
            rules: Rules::default(),
        }
    }
}

/// Smallest request body accepted whatever the rule bounds.
const MIN_BODY_LIMIT: usize = 64 * 1024;
/// A JSON surrogate pair escape (`\uXXXX\uXXXX`) spends 12 bytes on one char.
const MAX_ESCAPED_CHAR_LEN: usize = 12;

/// Field rules configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub email: EmailRule,
    pub password: PasswordRule,
}

impl Rules {
    /// Reject bounds no value could ever satisfy.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.email.max_length == 0 {
            return Err(ConfigError::InvalidBounds {
                field: "email",
                min: 1,
                max: self.email.max_length,
            });
        }

        if self.password.max_length == 0
            || self.password.min_length > self.password.max_length
        {
            return Err(ConfigError::InvalidBounds {
                field: "password",
                min: self.password.min_length,
                max: self.password.max_length,
            });
        }

        Ok(())
    }

    /// Largest request body read before answering `413`.
    ///
    /// Big enough for every bounded field well past its maximum, so an
    /// oversized value still gets its length message.
    pub fn body_limit(&self) -> usize {
        self.email
            .max_length
            .saturating_add(self.password.max_length)
            .saturating_mul(MAX_ESCAPED_CHAR_LEN)
            .saturating_mul(2)
            .max(MIN_BODY_LIMIT)
    }
}

/// Static error code to message table.
///
/// Entries read from the configuration file override the built-in ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<u16, String>")]
pub struct ErrorMessages(HashMap<u16, String>);

impl ErrorMessages {
    /// Message for `code`, or the canonical HTTP reason for unknown codes.
    pub fn get(&self, code: u16) -> &str {
        self.0.get(&code).map(String::as_str).unwrap_or_else(|| {
            StatusCode::from_u16(code)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("Unknown Error")
        })
    }
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self(
            [
                (400, "Bad Request"),
                (404, "Not Found"),
                (405, "Method Not Allowed"),
                (408, "Request Timeout"),
                (409, "Conflict"),
                (413, "Payload Too Large"),
                (415, "Unsupported Media Type"),
                (422, "Unprocessable Entity"),
                (500, "Internal Server Error"),
            ]
            .into_iter()
            .map(|(code, message)| (code, message.to_owned()))
            .collect(),
        )
    }
}

impl From<HashMap<u16, String>> for ErrorMessages {
    fn from(entries: HashMap<u16, String>) -> Self {
        let mut messages = Self::default();
        messages.0.extend(entries);
        messages
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, ConfigError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let config = match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(mut config) => {
                    // set app version.
                    config.version = VERSION.to_owned();
                    config.path = file_path.clone();
                    config
                },
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        config.rules.check()?;
        Ok(Arc::new(config))
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file cannot be read, using defaults");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_configuration() {
        let config: Configuration = serde_yaml::from_str(
            r#"
name: accounts
port: 9000
error_messages:
  422: The given data was invalid.
  429: Too Many Requests
rules:
  password:
    min_length: 10
"#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.error_messages.get(422), "The given data was invalid.");
        assert_eq!(config.error_messages.get(429), "Too Many Requests");
        // built-in entries are kept.
        assert_eq!(config.error_messages.get(400), "Bad Request");
        assert_eq!(config.rules.password.min_length, 10);
        assert_eq!(
            config.rules.password.max_length,
            PasswordRule::DEFAULT_MAX_LENGTH
        );
        assert_eq!(config.rules.email, EmailRule::default());
    }

    #[test]
    fn test_empty_configuration() {
        let config: Configuration = serde_yaml::from_str("name: accounts").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.error_messages, ErrorMessages::default());
        assert_eq!(config.rules, Rules::default());
    }

    #[test]
    fn test_unknown_code_message() {
        let messages = ErrorMessages::default();
        assert_eq!(messages.get(422), "Unprocessable Entity");
        assert_eq!(messages.get(503), "Service Unavailable");
        assert_eq!(messages.get(999), "Unknown Error");
    }

    #[test]
    fn test_invalid_bounds() {
        let rules = Rules {
            password: PasswordRule {
                min_length: 20,
                max_length: 10,
            },
            ..Default::default()
        };
        assert!(matches!(
            rules.check(),
            Err(ConfigError::InvalidBounds { field: "password", .. })
        ));
        assert!(Rules::default().check().is_ok());
    }

    #[test]
    fn test_body_limit() {
        assert_eq!(Rules::default().body_limit(), MIN_BODY_LIMIT);

        let rules = Rules {
            password: PasswordRule {
                min_length: 8,
                max_length: 10_000,
            },
            ..Default::default()
        };
        assert!(rules.body_limit() > 10_000 * MAX_ESCAPED_CHAR_LEN);
    }

    #[test]
    fn test_missing_file_uses_default_path() {
        let config = Configuration::default()
            .path(PathBuf::from("does/not/exist.yaml"))
            .read()
            .unwrap();
        assert_eq!(config.error_messages.get(422), "Unprocessable Entity");
    }
}
