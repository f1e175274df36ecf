//! Validation constraints for scalar values
//!
//! Each constraint record knows how to check itself against a value
//! container. Constraints assume the value already has the schema's type;
//! values of any other type are left alone.

use crate::container::ValueContainer;
use crate::errors::{ErrorKind, ErrorRecord};
use crate::types::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type Container = ValueContainer<Value>;

// ============================================================================
// Numeric Constraints
// ============================================================================

/// One side of a numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// Boundary value
    pub value: Number,
    /// Whether the boundary value itself is accepted
    pub inclusive: bool,
}

impl Bound {
    /// Bound that accepts its own value (`min`, `max`)
    pub fn inclusive(value: Number) -> Self {
        Self { value, inclusive: true }
    }

    /// Bound that rejects its own value (`greater_than`, `smaller_than`)
    pub fn exclusive(value: Number) -> Self {
        Self { value, inclusive: false }
    }

    /// Whether `number` lies on the wrong side, where `outside` is the ordering
    /// of a violating number relative to the bound
    fn violated_by(&self, number: Number, outside: Ordering) -> bool {
        match number.compare(self.value) {
            Some(Ordering::Equal) => !self.inclusive,
            Some(ordering) => ordering == outside,
            // NaN satisfies no bound
            None => true,
        }
    }
}

/// Range constraints for int and float schemas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericConstraints {
    /// Lower bound
    pub min: Option<Bound>,
    /// Upper bound
    pub max: Option<Bound>,
}

impl NumericConstraints {
    /// Check both bounds; each violated bound yields its own error
    pub fn check(&self, container: Container) -> Container {
        container
            .next(|c| check_min(self.min, c))
            .next(|c| check_max(self.max, c))
    }
}

fn check_min(bound: Option<Bound>, container: Container) -> Container {
    let Some(bound) = bound else {
        return container;
    };
    container.push_error_if_value(
        |value| {
            value
                .as_number()
                .is_some_and(|n| bound.violated_by(n, Ordering::Less))
        },
        |_| {
            ErrorRecord::new(
                ErrorKind::RangeViolation,
                format!(
                    "The number must be greater than {}{}.",
                    if bound.inclusive { "or equal to " } else { "" },
                    bound.value
                ),
            )
        },
    )
}

fn check_max(bound: Option<Bound>, container: Container) -> Container {
    let Some(bound) = bound else {
        return container;
    };
    container.push_error_if_value(
        |value| {
            value
                .as_number()
                .is_some_and(|n| bound.violated_by(n, Ordering::Greater))
        },
        |_| {
            ErrorRecord::new(
                ErrorKind::RangeViolation,
                format!(
                    "The number must be smaller than {}{}.",
                    if bound.inclusive { "or equal to " } else { "" },
                    bound.value
                ),
            )
        },
    )
}

// ============================================================================
// String Constraints
// ============================================================================

/// Length constraints for string schemas, measured in bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringConstraints {
    /// Exact length
    pub exact_length: Option<usize>,
    /// Minimum length
    pub min_length: Option<usize>,
    /// Maximum length
    pub max_length: Option<usize>,
}

impl StringConstraints {
    /// Check every configured length; they are independent of each other
    pub fn check(&self, container: Container) -> Container {
        container
            .next(|c| {
                check_length(c, self.exact_length, |len, n| len != n, |n| {
                    format!("String is required to have length exactly '{}'.", n)
                })
            })
            .next(|c| {
                check_length(c, self.min_length, |len, n| len < n, |n| {
                    format!("String is required to be at least '{}' characters long.", n)
                })
            })
            .next(|c| {
                check_length(c, self.max_length, |len, n| len > n, |n| {
                    format!("String is required to be at most '{}' characters long.", n)
                })
            })
    }
}

fn check_length(
    container: Container,
    limit: Option<usize>,
    violated: fn(usize, usize) -> bool,
    message: fn(usize) -> String,
) -> Container {
    let Some(limit) = limit else {
        return container;
    };
    container.push_error_if_value(
        |value| matches!(value, Value::String(s) if violated(s.len(), limit)),
        |_| ErrorRecord::new(ErrorKind::LengthViolation, message(limit)),
    )
}

// ============================================================================
// Allowed Values
// ============================================================================

/// Fixed set of allowed scalar values, compared by type and content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllowedValues {
    values: Vec<Value>,
}

impl AllowedValues {
    /// Create the set, keeping declaration order for error messages
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Allowed values, in declaration order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Whether the value is in the set (`Int(1)` and `Float(1.0)` differ)
    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    /// Push one error listing every allowed value when the value is not in the set
    pub fn check(&self, container: Container) -> Container {
        container.push_error_if_value(
            |value| !self.contains(value),
            |_| {
                let listed: Vec<String> = self.values.iter().map(ToString::to_string).collect();
                ErrorRecord::new(
                    ErrorKind::AllowedValueViolation,
                    format!("Only these scalar values are allowed: {}", listed.join(", ")),
                )
            },
        )
    }
}

// ============================================================================
// Custom Checks
// ============================================================================

/// Predicate of a custom check
pub type CheckFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Message builder of a custom check
pub type MessageFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Error message of a failed custom check
#[derive(Clone)]
pub enum CheckMessage {
    /// Fixed text; `{name}` and `{value}` are replaced by the check name and the value
    Text(String),
    /// Message computed from the failing value
    Template(MessageFn),
}

impl CheckMessage {
    /// Message computed from the failing value
    pub fn template(message: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        Self::Template(Arc::new(message))
    }

    fn render(&self, name: &str, value: &Value) -> String {
        match self {
            Self::Text(text) => text
                .replace("{name}", name)
                .replace("{value}", &value.to_string()),
            Self::Template(message) => message(value),
        }
    }
}

impl fmt::Debug for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Template(_) => f.write_str("Template(<fn>)"),
        }
    }
}

impl From<&str> for CheckMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CheckMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A named, user-supplied predicate with its error message
#[derive(Clone)]
pub struct CustomCheck {
    name: String,
    check: CheckFn,
    message: CheckMessage,
    short_circuit: bool,
}

impl CustomCheck {
    /// Create a check that reports `message` when `check` returns false
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<CheckMessage>,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
            message: message.into(),
            short_circuit: false,
        }
    }

    /// Halt the pipeline when this check fails
    pub fn short_circuit(mut self) -> Self {
        self.short_circuit = true;
        self
    }

    /// Check name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a failure halts the pipeline
    pub fn is_short_circuit(&self) -> bool {
        self.short_circuit
    }

    /// Run the check against the container's value
    pub fn apply(&self, container: Container) -> Container {
        let run = |c: Container| {
            c.push_error_if_value(
                |value| !(self.check)(value),
                |value| {
                    ErrorRecord::new(
                        ErrorKind::CustomCheckFailure,
                        self.message.render(&self.name, value),
                    )
                },
            )
        };
        if self.short_circuit {
            container.short_circuit(run)
        } else {
            container.next(run)
        }
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCheck")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("short_circuit", &self.short_circuit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(value: impl Into<Value>) -> Container {
        ValueContainer::with_value(value.into())
    }

    fn messages(container: &Container) -> Vec<&str> {
        container.errors().iter().map(ErrorRecord::message).collect()
    }

    #[test]
    fn test_numeric_constraints_default() {
        let constraints = NumericConstraints::default();
        assert!(constraints.min.is_none());
        assert!(constraints.max.is_none());
        assert!(!constraints.check(with(-5)).has_errors());
    }

    #[test]
    fn test_inclusive_min_accepts_boundary() {
        let constraints = NumericConstraints {
            min: Some(Bound::inclusive(Number::Int(42))),
            ..Default::default()
        };
        assert!(!constraints.check(with(42)).has_errors());
        assert_eq!(
            messages(&constraints.check(with(41))),
            vec!["The number must be greater than or equal to 42."]
        );
    }

    #[test]
    fn test_exclusive_min_rejects_boundary() {
        let constraints = NumericConstraints {
            min: Some(Bound::exclusive(Number::Int(42))),
            ..Default::default()
        };
        assert_eq!(
            messages(&constraints.check(with(42))),
            vec!["The number must be greater than 42."]
        );
        assert!(!constraints.check(with(42.000001)).has_errors());
    }

    #[test]
    fn test_both_bounds_report_independently() {
        let constraints = NumericConstraints {
            min: Some(Bound::exclusive(Number::Int(0))),
            max: Some(Bound::exclusive(Number::Float(-1.5))),
        };
        assert_eq!(
            messages(&constraints.check(with(-3))),
            vec!["The number must be greater than 0."]
        );
        assert_eq!(
            messages(&constraints.check(with(0))),
            vec![
                "The number must be greater than 0.",
                "The number must be smaller than -1.5."
            ]
        );
    }

    #[test]
    fn test_nan_violates_bounds() {
        let constraints = NumericConstraints {
            max: Some(Bound::inclusive(Number::Int(10))),
            ..Default::default()
        };
        assert!(constraints.check(with(f64::NAN)).has_errors());
    }

    #[test]
    fn test_string_constraints_default() {
        let constraints = StringConstraints::default();
        assert!(constraints.exact_length.is_none());
        assert!(constraints.min_length.is_none());
        assert!(constraints.max_length.is_none());
    }

    #[test]
    fn test_string_lengths_in_bytes() {
        let constraints = StringConstraints {
            max_length: Some(3),
            ..Default::default()
        };
        assert!(!constraints.check(with("abc")).has_errors());
        // "é" is two bytes
        assert!(constraints.check(with("abé")).has_errors());
    }

    #[test]
    fn test_string_lengths_all_fire() {
        let constraints = StringConstraints {
            exact_length: Some(5),
            min_length: Some(3),
            max_length: Some(4),
        };
        assert_eq!(
            messages(&constraints.check(with("ab"))),
            vec![
                "String is required to have length exactly '5'.",
                "String is required to be at least '3' characters long.",
            ]
        );
        assert_eq!(
            messages(&constraints.check(with("abcde"))),
            vec!["String is required to be at most '4' characters long."]
        );
    }

    #[test]
    fn test_allowed_values() {
        let allowed = AllowedValues::new([Value::from("foo"), Value::from("bar"), Value::Int(1)]);
        assert!(!allowed.check(with("foo")).has_errors());
        assert_eq!(
            messages(&allowed.check(with("qux"))),
            vec!["Only these scalar values are allowed: foo, bar, 1"]
        );
        assert!(allowed.check(with(1.0)).has_errors());
    }

    #[test]
    fn test_custom_check_text_message() {
        let check = CustomCheck::new(
            "even",
            |v| matches!(v, Value::Int(i) if i % 2 == 0),
            "{value} failed {name}",
        );
        assert!(!check.is_short_circuit());
        assert!(!check.apply(with(4)).has_errors());

        let failed = check.apply(with(3));
        assert_eq!(messages(&failed), vec!["3 failed even"]);
        assert_eq!(failed.errors()[0].kind(), ErrorKind::CustomCheckFailure);
        assert!(!failed.is_halted());
    }

    #[test]
    fn test_custom_check_template_and_short_circuit() {
        let check = CustomCheck::new(
            "short",
            |v| matches!(v, Value::String(s) if s.len() < 3),
            CheckMessage::template(|v| format!("'{}' is too long", v)),
        )
        .short_circuit();
        assert!(check.is_short_circuit());

        let failed = check.apply(with("long"));
        assert_eq!(messages(&failed), vec!["'long' is too long"]);
        assert!(failed.is_halted());
        assert_eq!(check.name(), "short");
    }
}
