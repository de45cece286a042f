//! `email_verified` flag rule.

use serde_json::Value;

use super::violation::{Field, FieldResult, Violation};
use super::{FieldRule, filled};

/// Optional boolean-like flag, `false` when absent.
///
/// Accepted: `true`, `false`, `1`, `0`, and the strings `"true"`, `"false"`,
/// `"1"`, `"0"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailVerifiedRule;

impl EmailVerifiedRule {
    pub const DEFAULT: bool = false;
}

impl FieldRule for EmailVerifiedRule {
    type Output = bool;
    const FIELD: Field = Field::EmailVerified;

    fn check(&self, value: Option<&Value>) -> FieldResult<bool> {
        let Some(value) = filled(value) else {
            return Ok(Self::DEFAULT);
        };

        let flag = match value {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => match number.as_u64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(text) => match text.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };

        flag.ok_or_else(|| {
            vec![Violation::Format {
                field: Self::FIELD,
                reason: "field must be true or false",
            }]
        })
    }
}
