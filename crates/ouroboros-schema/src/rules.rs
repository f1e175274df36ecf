//! Type rules for each schema kind
//!
//! A [`TypeRules`] table pairs a type check with the coercions a kind accepts.
//! Type checks let null through: null handling belongs to the nullable stage.

use crate::container::{Stage, ValueContainer};
use crate::errors::{ErrorKind, ErrorRecord};
use crate::types::{format_float, Value};

type Container = ValueContainer<Value>;

/// A single pipeline step over a value container
pub type RuleFn = fn(Container) -> Container;

// ============================================================================
// Capability Table
// ============================================================================

/// Type check and candidate coercions of one schema kind
#[derive(Debug)]
pub struct TypeRules {
    /// Kind name used in error messages
    pub kind: &'static str,
    /// Pushes a type mismatch error unless the value has the kind's type (or is null)
    pub check_type: RuleFn,
    /// Conversions tried, in order, when coercions are allowed
    pub coercions: &'static [RuleFn],
}

pub static STRING_RULES: TypeRules = TypeRules {
    kind: "string",
    check_type: check_string,
    coercions: &[string_from_bool, string_from_number],
};

pub static INT_RULES: TypeRules = TypeRules {
    kind: "integer",
    check_type: check_int,
    coercions: &[int_from_bool, int_from_string, int_from_float],
};

pub static FLOAT_RULES: TypeRules = TypeRules {
    kind: "float",
    check_type: check_float,
    coercions: &[float_from_bool, float_from_string, float_from_int],
};

pub static BOOL_RULES: TypeRules = TypeRules {
    kind: "boolean",
    check_type: check_bool,
    coercions: &[bool_from_int, bool_from_float, bool_from_string],
};

pub static OBJECT_RULES: TypeRules = TypeRules {
    kind: "object",
    check_type: check_object,
    coercions: &[],
};

pub static ANY_RULES: TypeRules = TypeRules {
    kind: "any",
    check_type: check_any,
    coercions: &[],
};

impl TypeRules {
    /// Check the type, or coerce to it when `allow_coercions` is set
    pub fn resolve(&self, allow_coercions: bool, container: Container) -> Container {
        if allow_coercions {
            self.coerce_to_type(container)
        } else {
            container.next(self.check_type)
        }
    }

    /// Convert the value to this kind.
    ///
    /// A value that already passes the type check is kept as is. Otherwise the
    /// coercion with the fewest errors wins; if none succeeds, the value is left
    /// untouched and a single coercion failure is reported.
    pub fn coerce_to_type(&self, container: Container) -> Container {
        if container.is_halted() {
            return container;
        }
        let before = container.error_count();
        let checked = (self.check_type)(container.clone());
        if checked.error_count() == before || self.coercions.is_empty() {
            return checked;
        }

        let stages: Vec<Stage<'_>> = self.coercions.iter().map(|f| f as Stage<'_>).collect();
        let candidate = container.clone().choose_one_of(&stages);
        if candidate.error_count() > before {
            return container.push_error(ErrorRecord::new(
                ErrorKind::CoercionFailure,
                format!("The value cannot be coerced to {}.", self.kind),
            ));
        }
        candidate
    }
}

// ============================================================================
// Type Checks
// ============================================================================

fn type_check(container: Container, accepts: fn(&Value) -> bool, message: &'static str) -> Container {
    container.push_error_if_value(
        |value| !value.is_null() && !accepts(value),
        |_| ErrorRecord::type_mismatch(message),
    )
}

fn check_string(container: Container) -> Container {
    type_check(container, |v| matches!(v, Value::String(_)), "The value is not a string.")
}

fn check_int(container: Container) -> Container {
    type_check(container, |v| matches!(v, Value::Int(_)), "The value is not an int.")
}

fn check_float(container: Container) -> Container {
    type_check(container, |v| matches!(v, Value::Float(_)), "The value is not a float.")
}

fn check_bool(container: Container) -> Container {
    type_check(container, |v| matches!(v, Value::Bool(_)), "The value is not a bool.")
}

fn check_object(container: Container) -> Container {
    type_check(container, |v| matches!(v, Value::Object(_)), "The value is not an object.")
}

fn check_any(container: Container) -> Container {
    container
}

// ============================================================================
// Coercions
// ============================================================================

/// Replace the value with `convert(value)`, or push `error` when it yields nothing
fn coerce_with(
    container: Container,
    error: &'static str,
    convert: impl FnOnce(&Value) -> Option<Value>,
) -> Container {
    if !container.has_value() {
        return container;
    }
    match container.value().ok().and_then(convert) {
        Some(converted) => container.set_value(converted),
        None => container.push_error(ErrorRecord::type_mismatch(error)),
    }
}

fn string_from_bool(container: Container) -> Container {
    coerce_with(container, "The value is not a bool.", |v| match v {
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    })
}

fn string_from_number(container: Container) -> Container {
    coerce_with(container, "The value is not a number.", |v| match v {
        Value::Int(i) => Some(Value::String(i.to_string())),
        Value::Float(f) => Some(Value::String(format_float(*f))),
        _ => None,
    })
}

fn int_from_bool(container: Container) -> Container {
    coerce_with(container, "The value is not a bool.", |v| match v {
        Value::Bool(b) => Some(Value::Int(i64::from(*b))),
        _ => None,
    })
}

fn int_from_string(container: Container) -> Container {
    coerce_with(container, "The value is not an integer string.", |v| match v {
        Value::String(s) => parse_int(s).map(Value::Int),
        _ => None,
    })
}

fn int_from_float(container: Container) -> Container {
    coerce_with(container, "The value is not a float.", |v| match v {
        Value::Float(f) => truncate(*f).map(Value::Int),
        _ => None,
    })
}

fn float_from_bool(container: Container) -> Container {
    coerce_with(container, "The value is not a bool.", |v| match v {
        Value::Bool(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
        _ => None,
    })
}

fn float_from_string(container: Container) -> Container {
    coerce_with(container, "The value is not a numeric string.", |v| match v {
        Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Float),
        _ => None,
    })
}

fn float_from_int(container: Container) -> Container {
    coerce_with(container, "The value is not an int.", |v| match v {
        Value::Int(i) => Some(Value::Float(*i as f64)),
        _ => None,
    })
}

fn bool_from_int(container: Container) -> Container {
    coerce_with(container, "The value is not an int.", |v| match v {
        Value::Int(i) => Some(Value::Bool(*i != 0)),
        _ => None,
    })
}

fn bool_from_float(container: Container) -> Container {
    coerce_with(container, "The value is not a float.", |v| match v {
        Value::Float(f) => Some(Value::Bool(*f != 0.0)),
        _ => None,
    })
}

fn bool_from_string(container: Container) -> Container {
    coerce_with(container, "The value is not a string.", |v| match v {
        Value::String(s) => Some(Value::Bool(!s.is_empty())),
        _ => None,
    })
}

/// Integer parse; decimal strings are truncated toward zero (`"3.7"` -> 3)
fn parse_int(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(truncate))
}

fn truncate(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coerce(rules: &TypeRules, value: Value) -> Container {
        rules.coerce_to_type(ValueContainer::with_value(value))
    }

    #[test]
    fn test_check_type_accepts_null() {
        for rules in [&STRING_RULES, &INT_RULES, &FLOAT_RULES, &BOOL_RULES, &OBJECT_RULES] {
            let result = (rules.check_type)(ValueContainer::with_value(Value::Null));
            assert!(!result.has_errors(), "{} rejected null", rules.kind);
        }
    }

    #[test]
    fn test_check_type_rejects_other_types() {
        let result = (INT_RULES.check_type)(ValueContainer::with_value(Value::Float(1.0)));
        assert_eq!(result.errors(), &[ErrorRecord::type_mismatch("The value is not an int.")]);

        let result = (OBJECT_RULES.check_type)(ValueContainer::with_value(Value::from("x")));
        assert_eq!(result.errors()[0].kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_string_coercions() {
        assert_eq!(coerce(&STRING_RULES, Value::Bool(true)).value(), Ok(&Value::from("true")));
        assert_eq!(coerce(&STRING_RULES, Value::Bool(false)).value(), Ok(&Value::from("false")));
        assert_eq!(coerce(&STRING_RULES, Value::Int(42)).value(), Ok(&Value::from("42")));
        assert_eq!(coerce(&STRING_RULES, Value::Float(-0.25)).value(), Ok(&Value::from("-0.25")));
        assert_eq!(coerce(&STRING_RULES, Value::Float(3.0)).value(), Ok(&Value::from("3")));
    }

    #[test]
    fn test_int_coercions() {
        assert_eq!(coerce(&INT_RULES, Value::Bool(true)).value(), Ok(&Value::Int(1)));
        assert_eq!(coerce(&INT_RULES, Value::from(" 17 ")).value(), Ok(&Value::Int(17)));
        assert_eq!(coerce(&INT_RULES, Value::from("3.7")).value(), Ok(&Value::Int(3)));
        assert_eq!(coerce(&INT_RULES, Value::Float(-2.9)).value(), Ok(&Value::Int(-2)));
    }

    #[test]
    fn test_float_coercions() {
        assert_eq!(coerce(&FLOAT_RULES, Value::Bool(true)).value(), Ok(&Value::Float(1.0)));
        assert_eq!(coerce(&FLOAT_RULES, Value::from("2.5")).value(), Ok(&Value::Float(2.5)));
        assert_eq!(coerce(&FLOAT_RULES, Value::Int(7)).value(), Ok(&Value::Float(7.0)));
    }

    #[test]
    fn test_bool_coercions() {
        assert_eq!(coerce(&BOOL_RULES, Value::Int(0)).value(), Ok(&Value::Bool(false)));
        assert_eq!(coerce(&BOOL_RULES, Value::Int(-5)).value(), Ok(&Value::Bool(true)));
        assert_eq!(coerce(&BOOL_RULES, Value::Float(0.0)).value(), Ok(&Value::Bool(false)));
        assert_eq!(coerce(&BOOL_RULES, Value::from("")).value(), Ok(&Value::Bool(false)));
        assert_eq!(coerce(&BOOL_RULES, Value::from("0")).value(), Ok(&Value::Bool(true)));
    }

    #[test]
    fn test_correct_type_is_not_coerced() {
        let result = coerce(&STRING_RULES, Value::from("already"));
        assert_eq!(result.value(), Ok(&Value::from("already")));
        assert!(!result.has_errors());

        let result = coerce(&INT_RULES, Value::Null);
        assert_eq!(result.value(), Ok(&Value::Null));
    }

    #[test]
    fn test_failed_coercion_keeps_value() {
        let result = coerce(&INT_RULES, Value::from("forty-two"));
        assert_eq!(result.value(), Ok(&Value::from("forty-two")));
        assert_eq!(
            result.errors(),
            &[ErrorRecord::new(ErrorKind::CoercionFailure, "The value cannot be coerced to integer.")]
        );
    }

    #[test]
    fn test_no_coercions_falls_back_to_type_check() {
        let result = coerce(&OBJECT_RULES, Value::Int(1));
        assert_eq!(result.errors(), &[ErrorRecord::type_mismatch("The value is not an object.")]);
    }

    #[test]
    fn test_truncate_bounds() {
        assert_eq!(truncate(f64::NAN), None);
        assert_eq!(truncate(f64::INFINITY), None);
        assert_eq!(truncate(1e300), None);
        assert_eq!(truncate(-0.5), Some(0));
        assert_eq!(parse_int("abc"), None);
    }

    #[test]
    fn test_resolve_without_coercions() {
        let result = STRING_RULES.resolve(false, ValueContainer::with_value(Value::Bool(true)));
        assert!(result.has_errors());
        assert_eq!(result.value(), Ok(&Value::Bool(true)));
    }
}
