//! Field-level validation errors for form submissions.
//!
//! Validators accumulate every violation before reporting, so a submission
//! with a bad date and a bad time shows both problems at once.

use std::collections::BTreeMap;

/// Non-field errors (e.g. "invalid credentials") are recorded under this key.
pub const FORM: &str = "form";

/// An ordered map of field name -> error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for a field (empty slice if the field is clean).
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.errors.iter().map(|(field, msgs)| (*field, msgs.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_multiple_errors_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("date", "unparseable");
        errors.add("date", "in the past");
        assert_eq!(errors.get("date").len(), 2);
    }

    #[test]
    fn test_empty_when_no_errors() {
        let errors = FieldErrors::new();
        assert!(errors.is_empty());
        assert!(!errors.has("date"));
        assert!(errors.get("date").is_empty());
    }

    #[test]
    fn test_iteration_is_field_ordered() {
        let mut errors = FieldErrors::new();
        errors.add("title", "required");
        errors.add("date", "unparseable");
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["date", "title"]);
    }
}
