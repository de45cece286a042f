//! Field names and the violations a rule can report.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Result of a single field rule.
///
/// `Err` always holds at least one [`Violation`].
pub type FieldResult<T> = Result<T, Vec<Violation>>;

const STRING: &str = "must be a string";

/// Fields of an account creation payload, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Password,
    EmailVerified,
}

impl Field {
    /// Every field, in the order errors are reported.
    pub const ALL: [Field; 3] = [Field::Email, Field::Password, Field::EmailVerified];

    /// Key used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Password => "password",
            Field::EmailVerified => "email_verified",
        }
    }
}

impl fmt::Display for Field {
    /// Human label, as used inside messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::EmailVerified => f.write_str("email verified"),
            field => f.write_str(field.as_str()),
        }
    }
}

/// Category of a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    RequiredFieldMissing,
    FormatViolation,
    LengthViolation,
    CompositionViolation,
}

/// A user-facing reason why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("The {0} field is required.")]
    Required(Field),
    #[error("The {field} {reason}.")]
    Format { field: Field, reason: &'static str },
    #[error("The {field} must be at least {min} characters.")]
    TooShort { field: Field, min: usize },
    #[error("The {field} may not be greater than {max} characters.")]
    TooLong { field: Field, max: usize },
    #[error(
        "The {0} must contain at least one letter and one number and only printable ASCII characters."
    )]
    Composition(Field),
}

impl Violation {
    /// Shortcut for a value of the wrong JSON type.
    pub(crate) fn not_a_string(field: Field) -> Self {
        Violation::Format {
            field,
            reason: STRING,
        }
    }

    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::Required(_) => ViolationKind::RequiredFieldMissing,
            Violation::Format { .. } => ViolationKind::FormatViolation,
            Violation::TooShort { .. } | Violation::TooLong { .. } => {
                ViolationKind::LengthViolation
            },
            Violation::Composition(_) => ViolationKind::CompositionViolation,
        }
    }

    pub fn field(&self) -> Field {
        match self {
            Violation::Required(field)
            | Violation::Composition(field)
            | Violation::Format { field, .. }
            | Violation::TooShort { field, .. }
            | Violation::TooLong { field, .. } => *field,
        }
    }
}

/// Turn collected violations into a [`FieldResult`].
pub(crate) fn conclude<T>(value: T, violations: Vec<Violation>) -> FieldResult<T> {
    if violations.is_empty() {
        Ok(value)
    } else {
        Err(violations)
    }
}

/// Messages of every rejected field, keyed by field name.
///
/// Keys keep insertion order so responses are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<Field, Vec<String>>);

impl FieldErrors {
    /// Record the violations of `field`, if any.
    pub fn record(&mut self, field: Field, violations: Option<Vec<Violation>>) {
        if let Some(violations) = violations.filter(|v| !v.is_empty()) {
            self.0
                .entry(field)
                .or_default()
                .extend(violations.iter().map(ToString::to_string));
        }
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn get(&self, field: Field) -> Option<&[String]> {
        self.0.get(&field).map(Vec::as_slice)
    }

    /// Rejected fields in reporting order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Violation::Required(Field::Email).to_string(),
            "The email field is required."
        );
        assert_eq!(
            Violation::TooLong {
                field: Field::Email,
                max: 128
            }
            .to_string(),
            "The email may not be greater than 128 characters."
        );
        assert_eq!(
            Violation::not_a_string(Field::EmailVerified).to_string(),
            "The email verified must be a string."
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            Violation::TooShort {
                field: Field::Password,
                min: 8
            }
            .kind(),
            ViolationKind::LengthViolation
        );
        assert_eq!(
            Violation::Composition(Field::Password).kind(),
            ViolationKind::CompositionViolation
        );
        assert_eq!(Violation::Composition(Field::Password).field(), Field::Password);
    }

    #[test]
    fn test_field_errors_keep_order() {
        let mut errors = FieldErrors::default();
        errors.record(
            Field::EmailVerified,
            Some(vec![Violation::not_a_string(Field::EmailVerified)]),
        );
        errors.record(Field::Password, None);
        errors.record(Field::Email, Some(vec![Violation::Required(Field::Email)]));

        assert_eq!(errors.len(), 2);
        assert!(!errors.contains(Field::Password));
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![Field::EmailVerified, Field::Email]
        );

        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(
            json,
            r#"{"email_verified":["The email verified must be a string."],"email":["The email field is required."]}"#
        );
    }
}
