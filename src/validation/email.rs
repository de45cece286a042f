//! Email address rule.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidateEmail;

use super::violation::{Field, FieldResult, Violation, conclude};
use super::{FieldRule, filled};

/// Required field, must be a valid address no longer than `max_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRule {
    /// Maximum length, in characters.
    pub max_length: usize,
}

impl EmailRule {
    pub const DEFAULT_MAX_LENGTH: usize = 128;
}

impl Default for EmailRule {
    fn default() -> Self {
        Self {
            max_length: Self::DEFAULT_MAX_LENGTH,
        }
    }
}

impl FieldRule for EmailRule {
    type Output = String;
    const FIELD: Field = Field::Email;

    fn check(&self, value: Option<&Value>) -> FieldResult<String> {
        let Some(value) = filled(value) else {
            return Err(vec![Violation::Required(Self::FIELD)]);
        };
        let Value::String(email) = value else {
            return Err(vec![Violation::not_a_string(Self::FIELD)]);
        };

        let mut violations = Vec::new();
        if !email.validate_email() {
            violations.push(Violation::Format {
                field: Self::FIELD,
                reason: "must be a valid email address",
            });
        }
        if email.chars().count() > self.max_length {
            violations.push(Violation::TooLong {
                field: Self::FIELD,
                max: self.max_length,
            });
        }

        conclude(email.clone(), violations)
    }
}
