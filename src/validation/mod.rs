//! Account creation payload validation.
//!
//! Each field has its own rule, evaluated in isolation. [`AccountValidator`]
//! runs every rule on a payload and either hands back the normalized
//! [`NewAccount`] or the messages of every rejected field.

mod email;
mod email_verified;
mod password;
mod violation;

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

pub use email::EmailRule;
pub use email_verified::EmailVerifiedRule;
pub use password::PasswordRule;
pub use violation::{Field, FieldErrors, FieldResult, Violation, ViolationKind};

use crate::config::Rules;

/// A pure classifier for one input field.
pub trait FieldRule {
    /// Normalized value of an accepted field.
    type Output;
    /// Field this rule applies to.
    const FIELD: Field;

    /// Accept or reject the raw value. `None` means the field was absent.
    fn check(&self, value: Option<&Value>) -> FieldResult<Self::Output>;
}

/// `None` for absent, `null` and blank string values.
pub(crate) fn filled(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    })
}

/// Raw, untyped account creation payload.
#[derive(Default, Clone, Deserialize)]
pub struct AccountCreationRequest {
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
    #[serde(default)]
    pub email_verified: Option<Value>,
}

impl fmt::Debug for AccountCreationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCreationRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("email_verified", &self.email_verified)
            .finish()
    }
}

/// Validated payload, ready to be stored.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub email_verified: bool,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("email_verified", &self.email_verified)
            .finish()
    }
}

/// Aggregate of every field result for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(NewAccount),
    /// Never empty.
    Invalid(FieldErrors),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}

/// Runs all field rules against a payload.
#[derive(Debug, Clone, Default)]
pub struct AccountValidator {
    email: EmailRule,
    password: PasswordRule,
    email_verified: EmailVerifiedRule,
}

impl AccountValidator {
    pub fn new(rules: &Rules) -> Self {
        Self {
            email: rules.email,
            password: rules.password,
            email_verified: EmailVerifiedRule,
        }
    }

    /// Evaluate every rule, never stopping at the first rejected field.
    pub fn validate(&self, request: &AccountCreationRequest) -> ValidationOutcome {
        let email = self.email.check(request.email.as_ref());
        let password = self.password.check(request.password.as_ref());
        let email_verified =
            self.email_verified.check(request.email_verified.as_ref());

        match (email, password, email_verified) {
            (Ok(email), Ok(password), Ok(email_verified)) => {
                ValidationOutcome::Valid(NewAccount {
                    email,
                    password,
                    email_verified,
                })
            },
            (email, password, email_verified) => {
                let mut errors = FieldErrors::default();
                errors.record(Field::Email, email.err());
                errors.record(Field::Password, password.err());
                errors.record(Field::EmailVerified, email_verified.err());
                ValidationOutcome::Invalid(errors)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> AccountCreationRequest {
        serde_json::from_value(body).unwrap()
    }

    fn rejected(body: Value) -> Vec<Field> {
        match AccountValidator::default().validate(&request(body)) {
            ValidationOutcome::Invalid(errors) => errors.fields().collect(),
            ValidationOutcome::Valid(account) => {
                panic!("{account:?} should have been rejected")
            },
        }
    }

    #[test]
    fn test_valid_request() {
        let outcome = AccountValidator::default().validate(&request(json!({
            "email": "k-keita@example.com",
            "password": "Password1",
            "email_verified": "true",
        })));

        assert_eq!(
            outcome,
            ValidationOutcome::Valid(NewAccount {
                email: "k-keita@example.com".into(),
                password: "Password1".into(),
                email_verified: true,
            })
        );
    }

    #[test]
    fn test_email_verified_defaults_to_false() {
        let outcome = AccountValidator::default().validate(&request(json!({
            "email": "k-keita@example.com",
            "password": "Password1",
        })));

        let ValidationOutcome::Valid(account) = outcome else {
            panic!("request should be valid");
        };
        assert!(!account.email_verified);
    }

    #[test]
    fn test_every_field_is_reported() {
        let cases = [
            json!({
                "email": "あいうえお",
                "password": "あいうえお",
                "email_verified": "あいうえお",
            }),
            json!({ "email": "@@@", "password": "---", "email_verified": "+++" }),
            json!({
                "email": r#"["りんご","ばなな","みかん"]"#,
                "password": r#"["りんご","ばなな","みかん"]"#,
                "email_verified": r#"["りんご","ばなな","みかん"]"#,
            }),
            json!({
                "email": -9999999999_i64,
                "password": 99999999999_u64,
                "email_verified": 99999999999_u64,
            }),
            json!({
                "email": "a@".repeat(65),
                "password": "11".repeat(2),
                "email_verified": "p1".repeat(50),
            }),
        ];

        for case in cases {
            assert_eq!(rejected(case), Field::ALL.to_vec());
        }
    }

    #[test]
    fn test_rules_are_independent() {
        assert_eq!(
            rejected(json!({ "email": "@@@", "password": "Password123" })),
            vec![Field::Email]
        );
        assert_eq!(
            rejected(json!({ "email": "k-keita@example.com", "password": "---" })),
            vec![Field::Password]
        );
        assert_eq!(
            rejected(json!({
                "email": "k-keita@example.com",
                "password": "Password1",
                "email_verified": "+++",
            })),
            vec![Field::EmailVerified]
        );
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(rejected(json!({})), vec![Field::Email, Field::Password]);
        assert_eq!(
            rejected(json!({ "password": "Password1" })),
            vec![Field::Email]
        );
        assert_eq!(
            rejected(json!({ "email": "k-keita@example.com" })),
            vec![Field::Password]
        );
    }

    #[test]
    fn test_all_messages_are_kept() {
        let outcome = AccountValidator::default().validate(&request(json!({
            "email": "a@".repeat(65),
            "password": "Password1",
        })));

        let ValidationOutcome::Invalid(errors) = outcome else {
            panic!("request should be invalid");
        };
        assert_eq!(
            errors.get(Field::Email).unwrap(),
            [
                "The email must be a valid email address.",
                "The email may not be greater than 128 characters.",
            ]
        );
    }

    #[test]
    fn test_configured_bounds() {
        let rules = Rules {
            email: EmailRule { max_length: 128 },
            password: PasswordRule {
                min_length: 12,
                max_length: 16,
            },
        };
        let outcome = AccountValidator::new(&rules).validate(&request(json!({
            "email": "k-keita@example.com",
            "password": "Password1",
        })));
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_debug_redacts_password() {
        let request = request(json!({ "password": "Password1" }));
        assert!(!format!("{request:?}").contains("Password1"));
    }
}
