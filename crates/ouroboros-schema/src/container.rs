//! Immutable value-with-errors container
//!
//! [`ValueContainer`] carries an optional value, the ordered list of errors
//! collected so far, and a halt flag. Every pipeline stage is a function from
//! container to container, chained with the combinators below. Nothing is
//! short-circuited unless a stage asks for it, so independent checks all get
//! to report their errors.
//!
//! # Example
//!
//! ```rust
//! use ouroboros_schema::{ErrorKind, ErrorRecord, ValueContainer};
//!
//! let port = ValueContainer::with_value(70_000_i64)
//!     .push_error_if_value(
//!         |port| *port < 0,
//!         |_| ErrorRecord::new(ErrorKind::RangeViolation, "Expected a non negative int."),
//!     )
//!     .push_error_if_value(
//!         |port| *port > 65_535,
//!         |_| ErrorRecord::new(ErrorKind::RangeViolation, "Expected <= 65535."),
//!     );
//!
//! assert_eq!(port.error_count(), 1);
//! ```

use crate::errors::{ErrorRecord, UsageError, ValidationErrors, ValidationResult};
use crate::types::Value;

/// A pipeline stage that can be stored in a slice next to stages of other closure types
pub type Stage<'a, T = Value> = &'a dyn Fn(ValueContainer<T>) -> ValueContainer<T>;

// ============================================================================
// Value Container
// ============================================================================

/// Value-or-absent plus an ordered error list and a halt flag
///
/// All operations consume the receiver and return a container; none of them
/// mutate a container another stage still holds. Once halted, every
/// combinator returns the receiver unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueContainer<T = Value> {
    value: Option<T>,
    errors: Vec<ErrorRecord>,
    halted: bool,
}

impl<T> Default for ValueContainer<T> {
    fn default() -> Self {
        Self::nothing()
    }
}

impl<T> ValueContainer<T> {
    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Container holding a value and no errors
    pub fn with_value(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
            halted: false,
        }
    }

    /// Container holding errors and no value
    pub fn with_errors(errors: impl IntoIterator<Item = ErrorRecord>) -> Self {
        Self {
            value: None,
            errors: errors.into_iter().collect(),
            halted: false,
        }
    }

    /// The "absent input" container: no value, no errors
    pub fn nothing() -> Self {
        Self {
            value: None,
            errors: Vec::new(),
            halted: false,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Whether a value is present
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Whether any error was collected
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether further stages are ignored
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Collected errors, in order
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Number of collected errors
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// The value, or [`UsageError::EmptyValue`] if there is none
    pub fn value(&self) -> Result<&T, UsageError> {
        self.value.as_ref().ok_or(UsageError::EmptyValue)
    }

    /// Take the value, or [`UsageError::EmptyValue`] if there is none
    pub fn into_value(self) -> Result<T, UsageError> {
        self.value.ok_or(UsageError::EmptyValue)
    }

    /// The value together with the errors; fails if there is no value
    pub fn get(&self) -> Result<(&T, &[ErrorRecord]), UsageError> {
        Ok((self.value()?, &self.errors))
    }

    /// The value if any, together with the errors
    pub fn try_get(&self) -> (Option<&T>, &[ErrorRecord]) {
        (self.value.as_ref(), &self.errors)
    }

    /// Split into the optional value and the errors
    pub fn into_parts(self) -> (Option<T>, Vec<ErrorRecord>) {
        (self.value, self.errors)
    }

    /// `Ok` with the optional value when no error was collected
    pub fn into_result(self) -> ValidationResult<Option<T>> {
        if self.errors.is_empty() {
            Ok(self.value)
        } else {
            Err(ValidationErrors::from(self.errors))
        }
    }

    // ------------------------------------------------------------------------
    // Halting
    // ------------------------------------------------------------------------

    /// Halt unconditionally
    pub fn stop(mut self) -> Self {
        self.halted = true;
        self
    }

    /// Halt when the condition holds
    pub fn stop_if(self, condition: bool) -> Self {
        if self.halted || !condition {
            return self;
        }
        self.stop()
    }

    /// Halt when the predicate over the container holds
    pub fn stop_if_with(self, predicate: impl FnOnce(&Self) -> bool) -> Self {
        if self.halted {
            return self;
        }
        let condition = predicate(&self);
        self.stop_if(condition)
    }

    /// Halt when a value is present and satisfies the predicate
    pub fn stop_if_value(self, predicate: impl FnOnce(&T) -> bool) -> Self {
        if self.halted {
            return self;
        }
        let condition = self.value.as_ref().is_some_and(predicate);
        self.stop_if(condition)
    }

    // ------------------------------------------------------------------------
    // Stage combinators
    // ------------------------------------------------------------------------

    /// Apply a stage unless halted
    pub fn next(self, stage: impl FnOnce(Self) -> Self) -> Self {
        if self.halted {
            return self;
        }
        stage(self)
    }

    /// Apply stages left to right, each fed the previous result
    pub fn next_all<'a>(self, stages: impl IntoIterator<Item = Stage<'a, T>>) -> Self
    where
        T: 'a,
    {
        stages.into_iter().fold(self, |current, stage| current.next(stage))
    }

    /// Apply a stage only when the condition holds
    pub fn next_if(self, condition: bool, stage: impl FnOnce(Self) -> Self) -> Self {
        if self.halted || !condition {
            return self;
        }
        stage(self)
    }

    /// Apply a stage only when the predicate over the container holds
    pub fn next_if_with(
        self,
        predicate: impl FnOnce(&Self) -> bool,
        stage: impl FnOnce(Self) -> Self,
    ) -> Self {
        if self.halted {
            return self;
        }
        let condition = predicate(&self);
        self.next_if(condition, stage)
    }

    /// Apply a stage; halt if it added errors
    pub fn short_circuit(self, stage: impl FnOnce(Self) -> Self) -> Self {
        if self.halted {
            return self;
        }
        let before = self.errors.len();
        let next = stage(self);
        if next.errors.len() > before {
            tracing::trace!(
                new_errors = next.errors.len() - before,
                "stage added errors, halting"
            );
            return next.stop();
        }
        next
    }

    /// Evaluate every stage against the receiver and keep the result with the
    /// fewest errors; ties go to the first-listed stage.
    ///
    /// A winner with more errors than the receiver means no stage succeeded.
    pub fn choose_one_of(self, stages: &[Stage<'_, T>]) -> Self
    where
        T: Clone,
    {
        if self.halted || stages.is_empty() {
            return self;
        }
        let mut best: Option<Self> = None;
        for stage in stages {
            let candidate = stage(self.clone());
            let better = best
                .as_ref()
                .map_or(true, |b| candidate.errors.len() < b.errors.len());
            if better {
                best = Some(candidate);
            }
        }
        best.unwrap_or(self)
    }

    /// Like [`choose_one_of`](Self::choose_one_of), but keeps the receiver when
    /// every stage added errors.
    pub fn try_one_of(self, stages: &[Stage<'_, T>]) -> Self
    where
        T: Clone,
    {
        if self.halted || stages.is_empty() {
            return self;
        }
        let before = self.errors.len();
        let candidate = self.clone().choose_one_of(stages);
        if candidate.errors.len() > before {
            return self;
        }
        candidate
    }

    // ------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------

    /// Append an error
    pub fn push_error(self, error: ErrorRecord) -> Self {
        self.push_errors([error])
    }

    /// Append errors, keeping their order
    pub fn push_errors(mut self, errors: impl IntoIterator<Item = ErrorRecord>) -> Self {
        if self.halted {
            return self;
        }
        self.errors.extend(errors);
        self
    }

    /// Append an error built from the container when the predicate holds
    pub fn push_error_if(
        self,
        predicate: impl FnOnce(&Self) -> bool,
        error: impl FnOnce(&Self) -> ErrorRecord,
    ) -> Self {
        if self.halted || !predicate(&self) {
            return self;
        }
        let error = error(&self);
        self.push_error(error)
    }

    /// Append an error built from the value when a value is present and satisfies the predicate
    pub fn push_error_if_value(
        self,
        predicate: impl FnOnce(&T) -> bool,
        error: impl FnOnce(&T) -> ErrorRecord,
    ) -> Self {
        if self.halted {
            return self;
        }
        let Some(value) = self.value.as_ref() else {
            return self;
        };
        if !predicate(value) {
            return self;
        }
        let error = error(value);
        self.push_error(error)
    }

    /// Remove all errors
    pub fn drop_errors(mut self) -> Self {
        if self.halted {
            return self;
        }
        self.errors.clear();
        self
    }

    // ------------------------------------------------------------------------
    // Value
    // ------------------------------------------------------------------------

    /// Replace (or set) the value
    pub fn set_value(mut self, value: T) -> Self {
        if self.halted {
            return self;
        }
        self.value = Some(value);
        self
    }

    /// Transform the value, if present
    pub fn map_value(mut self, map: impl FnOnce(T) -> T) -> Self {
        if self.halted {
            return self;
        }
        self.value = self.value.map(map);
        self
    }

    /// Apply several transforms in order: `[f, g]` yields `g(f(v))`
    pub fn map_values<F>(self, maps: impl IntoIterator<Item = F>) -> Self
    where
        F: FnOnce(T) -> T,
    {
        maps.into_iter().fold(self, |current, map| current.map_value(map))
    }

    /// Transform the value when it satisfies the predicate; otherwise leave it alone
    pub fn map_value_if(self, map: impl FnOnce(T) -> T, predicate: impl FnOnce(&T) -> bool) -> Self {
        if self.halted {
            return self;
        }
        let matches = self.value.as_ref().is_some_and(predicate);
        if matches {
            return self.map_value(map);
        }
        self
    }

    /// Transform the value when it satisfies the predicate; otherwise push an error
    pub fn map_value_if_else(
        self,
        map: impl FnOnce(T) -> T,
        predicate: impl FnOnce(&T) -> bool,
        error: impl FnOnce(&T) -> ErrorRecord,
    ) -> Self {
        if self.halted {
            return self;
        }
        let Some(value) = self.value.as_ref() else {
            return self;
        };
        if predicate(value) {
            return self.map_value(map);
        }
        let error = error(value);
        self.push_error(error)
    }
}
