//! Field-by-field validation of object values
//!
//! A [`Shape`] maps field names to child schemas. Each declared field is
//! validated through its child schema, present or not, so defaults and
//! required checks apply to missing keys too. Child errors are attributed to
//! the field they came from.

use crate::config::ExtraFields;
use crate::container::ValueContainer;
use crate::errors::{ErrorKind, ErrorRecord};
use crate::schema::Schema;
use crate::types::{unique_keys, Value};

/// Declared fields of an object schema, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Shape {
    fields: Vec<(String, Schema)>,
    extra: ExtraFields,
}

impl Shape {
    /// Create a shape; fields are validated in the order given here
    pub fn new<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self {
            fields: fields.into_iter().map(|(k, s)| (k.into(), s)).collect(),
            extra: ExtraFields::default(),
        }
    }

    /// Declared fields
    pub fn fields(&self) -> &[(String, Schema)] {
        &self.fields
    }

    /// Child schema of a field
    pub fn field(&self, name: &str) -> Option<&Schema> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Handling of undeclared keys
    pub fn extra(&self) -> ExtraFields {
        self.extra
    }

    pub(crate) fn set_extra(&mut self, extra: ExtraFields) {
        self.extra = extra;
    }

    fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == key)
    }

    /// Validate every declared field of the container's object value and merge
    /// the results back into it.
    ///
    /// The container is expected to hold an object; anything else is returned unchanged.
    /// A key repeated in the input counts once, with its last value.
    pub fn validate_fields(&self, container: ValueContainer) -> ValueContainer {
        let input = match container.value() {
            Ok(Value::Object(pairs)) => unique_keys(pairs.iter().cloned()),
            _ => return container,
        };

        let start = if self.extra.keeps_extra() {
            input.clone()
        } else {
            input
                .iter()
                .filter(|(k, _)| self.declares(k))
                .cloned()
                .collect()
        };
        let mut output = container.set_value(Value::Object(start));

        for (name, schema) in &self.fields {
            let member = match input.iter().find(|(k, _)| k == name) {
                Some((_, value)) => schema.validate(value.clone()),
                None => schema.validate_missing(),
            };
            tracing::trace!(
                field = %name,
                errors = member.error_count(),
                has_value = member.has_value(),
                "validated field"
            );

            let (value, errors) = member.into_parts();
            output = output.push_errors(errors.into_iter().map(|e| e.in_field(name.clone())));
            if let Some(value) = value {
                output = output.map_value(|mut object| {
                    object.insert(name.clone(), value);
                    object
                });
            }
        }

        if self.extra == ExtraFields::Forbid {
            let unknown = input
                .iter()
                .filter(|(k, _)| !self.declares(k))
                .map(|(k, _)| {
                    ErrorRecord::new(ErrorKind::ExtraForbidden, "Unknown field is not allowed.")
                        .in_field(k.clone())
                });
            output = output.push_errors(unknown);
        }

        output
    }
}
