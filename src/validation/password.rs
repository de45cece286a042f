//! Password rule.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::violation::{Field, FieldResult, Violation, conclude};
use super::{FieldRule, filled};

static PRINTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[!-~]+$").unwrap());
static LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]").unwrap());
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").unwrap());

/// Required field, bounded in length, mixing letters and digits.
///
/// Oversized values are rejected, never truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRule {
    /// Minimum length, in characters.
    pub min_length: usize,
    /// Maximum length, in characters.
    pub max_length: usize,
}

impl PasswordRule {
    pub const DEFAULT_MIN_LENGTH: usize = 8;
    pub const DEFAULT_MAX_LENGTH: usize = 100;

    fn is_composed(password: &str) -> bool {
        PRINTABLE.is_match(password)
            && LETTER.is_match(password)
            && DIGIT.is_match(password)
    }
}

impl Default for PasswordRule {
    fn default() -> Self {
        Self {
            min_length: Self::DEFAULT_MIN_LENGTH,
            max_length: Self::DEFAULT_MAX_LENGTH,
        }
    }
}

impl FieldRule for PasswordRule {
    type Output = String;
    const FIELD: Field = Field::Password;

    fn check(&self, value: Option<&Value>) -> FieldResult<String> {
        let Some(value) = filled(value) else {
            return Err(vec![Violation::Required(Self::FIELD)]);
        };
        let Value::String(password) = value else {
            return Err(vec![Violation::not_a_string(Self::FIELD)]);
        };

        let mut violations = Vec::new();
        let length = password.chars().count();
        if length < self.min_length {
            violations.push(Violation::TooShort {
                field: Self::FIELD,
                min: self.min_length,
            });
        } else if length > self.max_length {
            violations.push(Violation::TooLong {
                field: Self::FIELD,
                max: self.max_length,
            });
        }
        if !Self::is_composed(password) {
            violations.push(Violation::Composition(Self::FIELD));
        }

        conclude(password.clone(), violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;
    use serde_json::json;

    fn kinds(result: FieldResult<String>) -> Vec<ViolationKind> {
        result.unwrap_err().iter().map(Violation::kind).collect()
    }

    #[test]
    fn test_valid_password() {
        let rule = PasswordRule::default();
        for password in ["Password1", "Password123", "p1".repeat(50).as_str(), "Pa$$w0rd!"] {
            assert_eq!(rule.check(Some(&json!(password))).unwrap(), password);
        }
    }

    #[test]
    fn test_missing_password() {
        let rule = PasswordRule::default();
        assert_eq!(
            kinds(rule.check(None)),
            vec![ViolationKind::RequiredFieldMissing]
        );
        assert_eq!(
            kinds(rule.check(Some(&json!("")))),
            vec![ViolationKind::RequiredFieldMissing]
        );
    }

    #[test]
    fn test_multibyte_password() {
        let rule = PasswordRule::default();
        assert_eq!(
            kinds(rule.check(Some(&json!("あいうえお")))),
            vec![ViolationKind::LengthViolation, ViolationKind::CompositionViolation]
        );
        assert_eq!(
            kinds(rule.check(Some(&json!("あいうえおかきくけこ1a")))),
            vec![ViolationKind::CompositionViolation]
        );
    }

    #[test]
    fn test_weak_password() {
        let rule = PasswordRule::default();
        assert_eq!(
            kinds(rule.check(Some(&json!("---")))),
            vec![ViolationKind::LengthViolation, ViolationKind::CompositionViolation]
        );
        assert_eq!(
            kinds(rule.check(Some(&json!("99999999999")))),
            vec![ViolationKind::CompositionViolation]
        );
        assert_eq!(
            kinds(rule.check(Some(&json!("only letters")))),
            vec![ViolationKind::CompositionViolation]
        );
        assert_eq!(
            kinds(rule.check(Some(&json!(r#"["りんご","ばなな","みかん"]"#)))),
            vec![ViolationKind::CompositionViolation]
        );
    }

    #[test]
    fn test_non_string_password() {
        let rule = PasswordRule::default();
        assert_eq!(
            kinds(rule.check(Some(&json!(99999999999_u64)))),
            vec![ViolationKind::FormatViolation]
        );
    }

    #[test]
    fn test_oversized_password() {
        let rule = PasswordRule::default();
        let password = "p1".repeat(51);
        let violations = rule.check(Some(&json!(password))).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::TooLong {
                field: Field::Password,
                max: PasswordRule::DEFAULT_MAX_LENGTH
            }]
        );
    }
}
