//! Validation error types
//!
//! Validation failures are data: they are collected into [`ErrorRecord`]s and
//! returned to the caller. Misuse of the API (reading a missing value, building
//! an impossible constraint) is a [`UsageError`] instead.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Kind Classification
// ============================================================================

/// Classification of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Required value is missing
    Required,

    /// Null given where null is not allowed
    NullNotAllowed,

    /// Type mismatch (e.g., expected string, got integer)
    TypeMismatch,

    /// No candidate coercion could convert the value
    CoercionFailure,

    /// Numeric bound violated (inclusive or exclusive)
    RangeViolation,

    /// String length violated (exact, min or max)
    LengthViolation,

    /// Value is not in the allowed set
    AllowedValueViolation,

    /// A named user-supplied check failed
    CustomCheckFailure,

    /// Key not declared in a shape that forbids extra keys
    ExtraForbidden,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::NullNotAllowed => write!(f, "null_not_allowed"),
            Self::TypeMismatch => write!(f, "type_mismatch"),
            Self::CoercionFailure => write!(f, "coercion_failure"),
            Self::RangeViolation => write!(f, "range_violation"),
            Self::LengthViolation => write!(f, "length_violation"),
            Self::AllowedValueViolation => write!(f, "allowed_value_violation"),
            Self::CustomCheckFailure => write!(f, "custom_check_failure"),
            Self::ExtraForbidden => write!(f, "extra_forbidden"),
        }
    }
}

// ============================================================================
// Error Record
// ============================================================================

/// A single validation error
///
/// Either a plain message, or a message attributed to a field. Field records
/// nest, so an error deep inside nested shapes keeps its full path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ErrorRecord {
    /// Unattributed error message
    Message {
        /// Error classification
        kind: ErrorKind,
        /// Human-readable error message
        message: String,
    },
    /// Error attributed to a named field
    Field {
        /// Field name
        name: String,
        /// The field's own error (may itself be a field error)
        error: Box<ErrorRecord>,
    },
}

impl ErrorRecord {
    /// Create a plain error message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Message {
            kind,
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    /// Create a missing value error
    pub fn required() -> Self {
        Self::new(ErrorKind::Required, "Value is required.")
    }

    /// Create a null rejection error
    pub fn null_not_allowed() -> Self {
        Self::new(ErrorKind::NullNotAllowed, "Value cannot be null.")
    }

    /// Attribute this error to a field, extending the path if it already has one
    pub fn in_field(self, name: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            error: Box::new(self),
        }
    }

    /// Classification of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Message { kind, .. } => *kind,
            Self::Field { error, .. } => error.kind(),
        }
    }

    /// Message of the innermost error
    pub fn message(&self) -> &str {
        match self {
            Self::Message { message, .. } => message,
            Self::Field { error, .. } => error.message(),
        }
    }

    /// Field path leading to the error, outermost first (empty for plain messages)
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Field { name, error } = current {
            path.push(name.as_str());
            current = error;
        }
        path
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path();
        if path.is_empty() {
            write!(f, "{}", self.message())
        } else {
            write!(f, "{}: {}", path.join("."), self.message())
        }
    }
}

// ============================================================================
// Validation Errors Collection
// ============================================================================

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Collection of validation errors, in the order they were produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    /// List of individual validation errors
    pub errors: Vec<ErrorRecord>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get errors as a slice
    pub fn as_slice(&self) -> &[ErrorRecord] {
        &self.errors
    }
}

impl From<Vec<ErrorRecord>> for ValidationErrors {
    fn from(errors: Vec<ErrorRecord>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Usage Errors
// ============================================================================

/// Programmer errors: preconditions of the API that were not met
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UsageError {
    /// A value was read from a container that holds none
    #[error("There is no value inside this container.")]
    EmptyValue,

    /// A string length constraint was built with a negative length
    #[error("Required string length cannot be a negative number (got '{0}').")]
    NegativeLength(i64),

    /// A string length constraint was built with a fractional or non-finite length
    #[error("Required string length must be a whole number (got '{0}').")]
    FractionalLength(f64),

    /// A kind-specific builder was called on a schema of another kind
    #[error("`{method}` is not supported by {kind} schemas.")]
    UnsupportedBuilder {
        /// Builder method name
        method: &'static str,
        /// Schema kind name
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path() {
        let error = ErrorRecord::new(ErrorKind::RangeViolation, "The number must be greater than 0.")
            .in_field("age")
            .in_field("user");

        assert_eq!(error.path(), vec!["user", "age"]);
        assert_eq!(error.message(), "The number must be greater than 0.");
        assert_eq!(error.kind(), ErrorKind::RangeViolation);
        assert_eq!(error.to_string(), "user.age: The number must be greater than 0.");
    }

    #[test]
    fn test_plain_message() {
        let error = ErrorRecord::required();
        assert!(error.path().is_empty());
        assert_eq!(error.to_string(), "Value is required.");
    }

    #[test]
    fn test_validation_errors_display() {
        let errors = ValidationErrors::from(vec![
            ErrorRecord::null_not_allowed(),
            ErrorRecord::required().in_field("name"),
        ]);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "2 validation error(s)\n  - Value cannot be null.\n  - name: Value is required."
        );
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::TypeMismatch.to_string(), "type_mismatch");
        assert_eq!(ErrorKind::RangeViolation.to_string(), "range_violation");
        assert_eq!(ErrorKind::Required.to_string(), "required");
    }

    #[test]
    fn test_usage_error_messages() {
        assert_eq!(
            UsageError::NegativeLength(-3).to_string(),
            "Required string length cannot be a negative number (got '-3')."
        );
        assert_eq!(
            UsageError::FractionalLength(2.5).to_string(),
            "Required string length must be a whole number (got '2.5')."
        );
        assert_eq!(
            UsageError::UnsupportedBuilder { method: "length", kind: "integer" }.to_string(),
            "`length` is not supported by integer schemas."
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_record() {
        let error = ErrorRecord::required().in_field("name");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "name", "error": {"kind": "required", "message": "Value is required."}})
        );
    }
}
