//! Ouroboros Schema
//!
//! Declarative validation and coercion of dynamically-typed values.
//!
//! A caller builds an immutable [`Schema`] describing the expected shape, type
//! and constraints of a value (decoded JSON, form data, ...), then validates
//! candidate values against it. Validation never stops at the first problem:
//! it yields a [`ValueContainer`] holding the normalized value (if any) and
//! every error that was found.
//!
//! # Features
//!
//! - **serde** (default): conversions between [`Value`] and `serde_json::Value`,
//!   and `Serialize` for error records
//!
//! # Example
//!
//! ```rust
//! use ouroboros_schema::{Schema, Value};
//!
//! let schema = Schema::shape([
//!     ("first", Schema::int().required().positive().smaller_than(100)),
//!     ("second", Schema::float().required().negative().greater_than(-100)),
//!     ("third", Schema::string().required().min(3).max(20)),
//! ]);
//!
//! let input = Value::object([
//!     ("first", Value::Int(42)),
//!     ("second", Value::Float(-0.25)),
//!     ("third", Value::from("some string")),
//! ]);
//!
//! let result = schema.validate(input.clone());
//! assert!(!result.has_errors());
//! assert_eq!(result.value(), Ok(&input));
//! ```

// Public modules
pub mod config;
pub mod constraints;
pub mod container;
pub mod errors;
pub mod rules;
pub mod schema;
pub mod shape;
pub mod types;

// Re-export commonly used types
pub use config::ExtraFields;
pub use constraints::{
    AllowedValues, Bound, CheckMessage, CustomCheck, NumericConstraints, StringConstraints,
};
pub use container::{Stage, ValueContainer};
pub use errors::{ErrorKind, ErrorRecord, UsageError, ValidationErrors, ValidationResult};
pub use rules::TypeRules;
pub use schema::{Schema, SchemaKind, TransformFn};
pub use shape::Shape;
pub use types::{Number, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
