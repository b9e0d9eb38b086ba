//! Bridges `validator` reports into [`QueryError::Validation`].

use list_sync::QueryError;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// Collects per-field messages before a form is submitted.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    /// Starts from the derived rules of `form`.
    pub fn from_rules<T: Validate>(form: &T) -> Self {
        let mut errors = Self::default();
        if let Err(report) = form.validate() {
            errors.absorb(&report);
        }
        errors
    }

    /// Adds a cross-field or custom failure. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), QueryError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(QueryError::Validation {
                fields: self.fields,
            })
        }
    }

    fn absorb(&mut self, report: &ValidationErrors) {
        for (field, errors) in report.field_errors() {
            if let Some(first) = errors.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid {field}"));
                self.add(&field.to_string(), message);
            }
        }
    }
}
