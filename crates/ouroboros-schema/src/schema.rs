//! Schemas and the validation pipeline
//!
//! A [`Schema`] is an immutable description of one logical value: its kind,
//! its policies for missing and null input, its coercion and transform
//! settings, and its constraints. Builders consume the schema and return the
//! updated copy; clone first to keep the original around.
//!
//! # Pipeline
//!
//! [`Schema::validate`] runs the same stages for every kind, in this order:
//!
//! 1. apply the default when no value was given
//! 2. required check
//! 3. stop if there is still no value
//! 4. nullable check (short-circuits)
//! 5. replace null with the default, when enabled
//! 6. type check, or coercion when allowed (short-circuits)
//! 7. user transforms, in registration order
//! 8. stop if the value is now null
//! 9. type resolution again, if any transform ran (short-circuits)
//!
//! followed by the allowed-values check, the kind's own constraints (ranges,
//! lengths, shape fields) and finally the custom checks.
//!
//! # Example
//!
//! ```rust
//! use ouroboros_schema::{Schema, Value};
//!
//! let schema = Schema::shape([
//!     ("name", Schema::string().required().max(8)),
//!     ("age", Schema::int().positive()),
//! ]);
//!
//! let input = Value::object([("name", Value::from("John")), ("age", Value::Int(-42))]);
//! let result = schema.validate(input);
//!
//! assert_eq!(result.error_count(), 1);
//! assert_eq!(result.errors()[0].path(), vec!["age"]);
//! ```

use crate::config::ExtraFields;
use crate::constraints::{AllowedValues, Bound, CheckMessage, CustomCheck, NumericConstraints, StringConstraints};
use crate::container::ValueContainer;
use crate::errors::{ErrorRecord, UsageError};
use crate::rules::{TypeRules, ANY_RULES, BOOL_RULES, FLOAT_RULES, INT_RULES, OBJECT_RULES, STRING_RULES};
use crate::shape::Shape;
use crate::types::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// User transform applied to a validated value
pub type TransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

// ============================================================================
// Schema Kind
// ============================================================================

/// What a schema validates, with the constraints specific to that kind
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// String with length constraints
    String(StringConstraints),
    /// Integer with range constraints
    Int(NumericConstraints),
    /// Float with range constraints
    Float(NumericConstraints),
    /// Boolean
    Bool,
    /// Any value; no type check
    Any,
    /// Object with declared fields
    Shape(Shape),
}

impl SchemaKind {
    /// Type check and coercions of this kind
    pub fn rules(&self) -> &'static TypeRules {
        match self {
            Self::String(_) => &STRING_RULES,
            Self::Int(_) => &INT_RULES,
            Self::Float(_) => &FLOAT_RULES,
            Self::Bool => &BOOL_RULES,
            Self::Any => &ANY_RULES,
            Self::Shape(_) => &OBJECT_RULES,
        }
    }

    /// Get human-readable kind name for error messages
    pub fn name(&self) -> &'static str {
        self.rules().kind
    }

    fn check_constraints(&self, container: ValueContainer) -> ValueContainer {
        match self {
            Self::String(constraints) => constraints.check(container),
            Self::Int(constraints) | Self::Float(constraints) => constraints.check(container),
            Self::Shape(shape) => shape.validate_fields(container),
            Self::Bool | Self::Any => container,
        }
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Immutable description of an expected value
#[derive(Clone)]
pub struct Schema {
    kind: SchemaKind,
    required: bool,
    nullable: bool,
    default: Option<Value>,
    replace_null_with_default: bool,
    allow_coercions: bool,
    transforms: Vec<TransformFn>,
    allowed_values: Option<AllowedValues>,
    checks: Vec<CustomCheck>,
}

impl Schema {
    /// Schema of the given kind with default configuration
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
            nullable: false,
            default: None,
            replace_null_with_default: false,
            allow_coercions: false,
            transforms: Vec::new(),
            allowed_values: None,
            checks: Vec::new(),
        }
    }

    /// String schema
    pub fn string() -> Self {
        Self::new(SchemaKind::String(StringConstraints::default()))
    }

    /// Integer schema
    pub fn int() -> Self {
        Self::new(SchemaKind::Int(NumericConstraints::default()))
    }

    /// Float schema
    pub fn float() -> Self {
        Self::new(SchemaKind::Float(NumericConstraints::default()))
    }

    /// Boolean schema
    pub fn bool() -> Self {
        Self::new(SchemaKind::Bool)
    }

    /// Schema accepting a value of any type
    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// Object schema; fields are validated in the order given here
    pub fn shape<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::new(SchemaKind::Shape(Shape::new(fields)))
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Kind of this schema
    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Whether a missing value is an error
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether null is accepted
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether coercions are attempted
    pub fn allows_coercions(&self) -> bool {
        self.allow_coercions
    }

    /// Default value, if any
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    // ------------------------------------------------------------------------
    // Common builders
    // ------------------------------------------------------------------------

    /// Reject missing values
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept null
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Use `value` when no value is given
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Use the result of `make` when no value is given; `make` runs once, here
    pub fn default_with(self, make: impl FnOnce() -> Value) -> Self {
        self.default(make())
    }

    /// Also use the default when the value is null
    pub fn replace_null_with_default(mut self) -> Self {
        self.replace_null_with_default = true;
        self
    }

    /// Try to convert values of other types instead of rejecting them
    pub fn allow_coercions(mut self) -> Self {
        self.allow_coercions = true;
        self
    }

    /// Append a transform; transforms run in registration order
    pub fn transform(mut self, transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    /// Accept only the given values (compared by type and content)
    ///
    /// # Panics
    ///
    /// Panics on shape schemas.
    pub fn one_of<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        if matches!(self.kind, SchemaKind::Shape(_)) {
            unsupported("one_of", self.kind.name());
        }
        self.allowed_values = Some(AllowedValues::new(values.into_iter().map(Into::into)));
        self
    }

    /// Append a named check that reports `message` when `check` returns false
    pub fn test(
        self,
        name: impl Into<String>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<CheckMessage>,
    ) -> Self {
        self.test_with(CustomCheck::new(name, check, message))
    }

    /// Append a prepared custom check
    pub fn test_with(mut self, check: CustomCheck) -> Self {
        self.checks.push(check);
        self
    }

    // ------------------------------------------------------------------------
    // Kind-specific builders
    // ------------------------------------------------------------------------

    /// Inclusive lower bound for numbers, minimum length for strings
    ///
    /// # Panics
    ///
    /// Panics on a negative or fractional string length, and on kinds other than string, int and float.
    pub fn min(mut self, min: impl Into<Number>) -> Self {
        let min = min.into();
        let kind = self.kind.name();
        match &mut self.kind {
            SchemaKind::String(constraints) => constraints.min_length = Some(length_arg(min)),
            SchemaKind::Int(constraints) | SchemaKind::Float(constraints) => {
                constraints.min = Some(Bound::inclusive(min));
            }
            _ => unsupported("min", kind),
        }
        self
    }

    /// Inclusive upper bound for numbers, maximum length for strings
    ///
    /// # Panics
    ///
    /// Panics on a negative or fractional string length, and on kinds other than string, int and float.
    pub fn max(mut self, max: impl Into<Number>) -> Self {
        let max = max.into();
        let kind = self.kind.name();
        match &mut self.kind {
            SchemaKind::String(constraints) => constraints.max_length = Some(length_arg(max)),
            SchemaKind::Int(constraints) | SchemaKind::Float(constraints) => {
                constraints.max = Some(Bound::inclusive(max));
            }
            _ => unsupported("max", kind),
        }
        self
    }

    /// Exact string length, in bytes
    ///
    /// # Panics
    ///
    /// Panics on a negative or fractional length, and on kinds other than string.
    pub fn length(mut self, length: impl Into<Number>) -> Self {
        let length = length.into();
        let kind = self.kind.name();
        match &mut self.kind {
            SchemaKind::String(constraints) => constraints.exact_length = Some(length_arg(length)),
            _ => unsupported("length", kind),
        }
        self
    }

    /// Exclusive lower bound
    ///
    /// # Panics
    ///
    /// Panics on kinds other than int and float.
    pub fn greater_than(mut self, min: impl Into<Number>) -> Self {
        let kind = self.kind.name();
        match &mut self.kind {
            SchemaKind::Int(constraints) | SchemaKind::Float(constraints) => {
                constraints.min = Some(Bound::exclusive(min.into()));
            }
            _ => unsupported("greater_than", kind),
        }
        self
    }

    /// Exclusive upper bound
    ///
    /// # Panics
    ///
    /// Panics on kinds other than int and float.
    pub fn smaller_than(mut self, max: impl Into<Number>) -> Self {
        let kind = self.kind.name();
        match &mut self.kind {
            SchemaKind::Int(constraints) | SchemaKind::Float(constraints) => {
                constraints.max = Some(Bound::exclusive(max.into()));
            }
            _ => unsupported("smaller_than", kind),
        }
        self
    }

    /// Same as `greater_than(0)`
    pub fn positive(self) -> Self {
        self.greater_than(0)
    }

    /// Same as `smaller_than(0)`
    pub fn negative(self) -> Self {
        self.smaller_than(0)
    }

    /// Set the handling of undeclared keys
    ///
    /// # Panics
    ///
    /// Panics on kinds other than shape.
    pub fn extra(mut self, extra: ExtraFields) -> Self {
        let kind = self.kind.name();
        match &mut self.kind {
            SchemaKind::Shape(shape) => shape.set_extra(extra),
            _ => unsupported("extra", kind),
        }
        self
    }

    /// Report undeclared keys as errors
    pub fn forbid_extra(self) -> Self {
        self.extra(ExtraFields::Forbid)
    }

    /// Drop undeclared keys from the output
    pub fn strip_extra(self) -> Self {
        self.extra(ExtraFields::Ignore)
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Validate a present value
    pub fn validate(&self, value: impl Into<Value>) -> ValueContainer {
        self.validate_input(Some(value.into()))
    }

    /// Validate the absence of a value (e.g., a missing key)
    pub fn validate_missing(&self) -> ValueContainer {
        self.validate_input(None)
    }

    /// Validate an optional input; `None` means the value is absent
    pub fn validate_input(&self, input: Option<Value>) -> ValueContainer {
        let container = match input {
            Some(value) => ValueContainer::with_value(value),
            None => ValueContainer::nothing(),
        };

        let result = self
            .run_pipeline(container)
            .next(|c| match &self.allowed_values {
                Some(allowed) => allowed.check(c),
                None => c,
            })
            .next(|c| self.kind.check_constraints(c))
            .next(|c| self.checks.iter().fold(c, |c, check| check.apply(c)));

        tracing::debug!(
            kind = self.kind.name(),
            errors = result.error_count(),
            has_value = result.has_value(),
            halted = result.is_halted(),
            "validated value"
        );
        result
    }

    /// Whether `value` validates with a value and no errors
    pub fn is_valid(&self, value: impl Into<Value>) -> bool {
        let result = self.validate(value);
        result.has_value() && !result.has_errors()
    }

    fn run_pipeline(&self, container: ValueContainer) -> ValueContainer {
        let rules = self.kind.rules();
        container
            .next(|c| self.apply_default(c))
            .short_circuit(|c| self.check_required(c))
            .stop_if_with(|c| !c.has_value())
            .short_circuit(|c| self.check_nullable(c))
            .next(|c| self.apply_replace_null(c))
            .short_circuit(|c| rules.resolve(self.allow_coercions, c))
            .map_values(self.transforms.iter().map(|transform| move |v: Value| transform(v)))
            .stop_if_value(Value::is_null)
            .next_if(!self.transforms.is_empty(), |c| {
                c.short_circuit(|c| rules.resolve(self.allow_coercions, c))
            })
    }

    fn apply_default(&self, container: ValueContainer) -> ValueContainer {
        match &self.default {
            Some(default) if !container.has_value() => container.set_value(default.clone()),
            _ => container,
        }
    }

    fn check_required(&self, container: ValueContainer) -> ValueContainer {
        container.push_error_if(|c| self.required && !c.has_value(), |_| ErrorRecord::required())
    }

    fn check_nullable(&self, container: ValueContainer) -> ValueContainer {
        if self.nullable {
            return container;
        }
        container.push_error_if_value(Value::is_null, |_| ErrorRecord::null_not_allowed())
    }

    fn apply_replace_null(&self, container: ValueContainer) -> ValueContainer {
        match &self.default {
            Some(default) if self.replace_null_with_default => {
                container.map_value_if(|_| default.clone(), Value::is_null)
            }
            _ => container,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .field("replace_null_with_default", &self.replace_null_with_default)
            .field("allow_coercions", &self.allow_coercions)
            .field("transforms", &self.transforms.len())
            .field("allowed_values", &self.allowed_values)
            .field("checks", &self.checks)
            .finish()
    }
}

fn unsupported(method: &'static str, kind: &'static str) -> ! {
    panic!("{}", UsageError::UnsupportedBuilder { method, kind })
}

/// Length argument of a string builder
fn length_arg(length: Number) -> usize {
    let whole = match length {
        Number::Int(i) => i,
        Number::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => f as i64,
        Number::Float(f) => panic!("{}", UsageError::FractionalLength(f)),
    };
    match usize::try_from(whole) {
        Ok(length) => length,
        Err(_) => panic!("{}", UsageError::NegativeLength(whole)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_fresh_schema_defaults() {
        let schema = Schema::string();
        assert!(!schema.is_required());
        assert!(!schema.is_nullable());
        assert!(!schema.allows_coercions());
        assert!(schema.default_value().is_none());
        assert_eq!(schema.kind().name(), "string");
    }

    #[test]
    fn test_builders_leave_clones_untouched() {
        let base = Schema::int();
        let required = base.clone().required();
        assert!(!base.is_required());
        assert!(required.is_required());
    }

    #[test]
    fn test_absent_not_required() {
        for schema in [Schema::string(), Schema::int(), Schema::float(), Schema::bool(), Schema::shape::<&str, _>([])] {
            let result = schema.validate_missing();
            assert!(!result.has_value());
            assert!(!result.has_errors());
        }
    }

    #[test]
    fn test_absent_required() {
        let result = Schema::int().required().validate_missing();
        assert!(!result.has_value());
        assert_eq!(result.errors(), &[ErrorRecord::required()]);
    }

    #[test]
    fn test_default_applies_to_absent() {
        let result = Schema::int().required().default(7).validate_missing();
        assert_eq!(result.value(), Ok(&Value::Int(7)));
        assert!(!result.has_errors());
    }

    #[test]
    fn test_default_with_runs_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = AtomicUsize::new(0);
        let schema = Schema::string().default_with(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Value::from("made")
        });

        schema.validate_missing();
        schema.validate_missing();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_null_rejected_unless_nullable() {
        let result = Schema::string().validate(Value::Null);
        assert_eq!(result.errors(), &[ErrorRecord::null_not_allowed()]);
        assert!(result.is_halted());

        let result = Schema::string().nullable().min(3).validate(Value::Null);
        assert!(!result.has_errors());
        assert_eq!(result.value(), Ok(&Value::Null));
    }

    #[test]
    fn test_replace_null_with_default() {
        let result = Schema::string()
            .nullable()
            .default("foo")
            .replace_null_with_default()
            .validate(Value::Null);
        assert_eq!(result.value(), Ok(&Value::from("foo")));
        assert!(!result.has_errors());
    }

    #[test]
    fn test_type_error_blocks_constraints() {
        let result = Schema::string().min(10).one_of(["a"]).validate(5);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors()[0].kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_transform_result_is_rechecked() {
        let result = Schema::string()
            .transform(|v| match v {
                Value::String(s) => Value::Int(s.len() as i64),
                other => other,
            })
            .validate("abc");
        assert_eq!(result.errors(), &[ErrorRecord::type_mismatch("The value is not a string.")]);

        let coerced = Schema::string()
            .allow_coercions()
            .transform(|v| match v {
                Value::String(s) => Value::Int(s.len() as i64),
                other => other,
            })
            .validate("abc");
        assert_eq!(coerced.value(), Ok(&Value::from("3")));
        assert!(!coerced.has_errors());
    }

    #[test]
    fn test_transform_to_null_stops() {
        let result = Schema::string().min(5).transform(|_| Value::Null).validate("abc");
        assert!(!result.has_errors());
        assert_eq!(result.value(), Ok(&Value::Null));
        assert!(result.is_halted());
    }

    #[test]
    fn test_custom_checks_run_last() {
        let result = Schema::int()
            .min(0)
            .test("even", |v| matches!(v, Value::Int(i) if i % 2 == 0), "Value must be even.")
            .validate(-3);

        let kinds: Vec<ErrorKind> = result.errors().iter().map(ErrorRecord::kind).collect();
        assert_eq!(kinds, vec![ErrorKind::RangeViolation, ErrorKind::CustomCheckFailure]);
    }

    #[test]
    fn test_any_accepts_everything() {
        assert!(Schema::any().is_valid(Value::object([("a", Value::Int(1))])));
        assert!(Schema::any().is_valid(3.5));
        assert!(!Schema::any().one_of([1, 2]).is_valid(3));
    }

    #[test]
    fn test_float_bounds_accept_int_literals() {
        let schema = Schema::float().negative().greater_than(-100);
        assert!(schema.is_valid(-0.25));
        assert!(!schema.is_valid(-100.0));
        assert!(!schema.is_valid(0.0));
    }

    #[test]
    #[should_panic(expected = "Required string length cannot be a negative number (got '-1').")]
    fn test_negative_length_panics() {
        let _ = Schema::string().min(-1);
    }

    #[test]
    #[should_panic(expected = "Required string length must be a whole number (got '2.5').")]
    fn test_fractional_length_panics() {
        let _ = Schema::string().min(2.5);
    }

    #[test]
    #[should_panic(expected = "Required string length must be a whole number (got 'NaN').")]
    fn test_nan_length_panics() {
        let _ = Schema::string().length(f64::NAN);
    }

    #[test]
    fn test_whole_float_length_is_accepted() {
        let schema = Schema::string().max(3.0);
        assert!(schema.is_valid("abc"));
        assert!(!schema.is_valid("abcd"));
    }

    #[test]
    #[should_panic(expected = "`length` is not supported by integer schemas.")]
    fn test_length_on_int_panics() {
        let _ = Schema::int().length(3);
    }

    #[test]
    #[should_panic(expected = "`greater_than` is not supported by string schemas.")]
    fn test_greater_than_on_string_panics() {
        let _ = Schema::string().greater_than(3);
    }

    #[test]
    #[should_panic(expected = "`one_of` is not supported by object schemas.")]
    fn test_one_of_on_shape_panics() {
        let _ = Schema::shape([("a", Schema::int())]).one_of([1]);
    }
}
