use serde_json::Value;
use std::collections::HashSet;

use crate::domain::{ErrorState, FormSchema, FormValues};

/// Values, errors and touch tracking owned by one engine instance
#[derive(Debug, Clone, Default)]
pub struct FormState {
    values: FormValues,
    errors: ErrorState,
    touched: HashSet<String>,
}

impl FormState {
    /// Seed from field defaults, then overlay `initial`; existing data wins
    pub fn seeded(schema: &FormSchema, initial: FormValues) -> Self {
        let mut values: FormValues = schema
            .all_fields()
            .filter_map(|f| f.default_value.clone().map(|v| (f.id.clone(), v)))
            .collect();
        values.extend(initial);
        Self {
            values,
            ..Default::default()
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn errors(&self) -> &ErrorState {
        &self.errors
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    /// Store a value and drop any error recorded for that field
    pub fn set_value(&mut self, id: &str, value: Value) {
        self.values.insert(id.to_string(), value);
        self.errors.remove(id);
    }

    pub fn clear_value(&mut self, id: &str) {
        self.values.remove(id);
        self.errors.remove(id);
    }

    pub fn set_error(&mut self, id: &str, message: Option<String>) {
        match message {
            Some(message) => {
                self.errors.insert(id.to_string(), message);
            }
            None => {
                self.errors.remove(id);
            }
        }
    }

    pub fn replace_errors(&mut self, errors: ErrorState) {
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn touch(&mut self, id: &str) {
        self.touched.insert(id.to_string());
    }

    pub fn is_touched(&self, id: &str) -> bool {
        self.touched.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FormField, FormGroup};
    use serde_json::json;

    #[test]
    fn test_initial_data_wins_over_defaults() {
        let schema = FormSchema::single(
            "f",
            "F",
            vec![FormGroup::new(
                "g",
                vec![
                    FormField::new("country", "select", "Country").with_default(json!("US")),
                    FormField::new("newsletter", "switch", "Newsletter").with_default(json!(true)),
                    FormField::new("name", "text", "Name"),
                ],
            )],
        );
        let initial: FormValues = [("country".to_string(), json!("GB"))].into_iter().collect();
        let state = FormState::seeded(&schema, initial);
        assert_eq!(state.value("country"), Some(&json!("GB")));
        assert_eq!(state.value("newsletter"), Some(&json!(true)));
        assert_eq!(state.value("name"), None);
    }

    #[test]
    fn test_set_value_clears_only_that_error() {
        let mut state = FormState::default();
        state.set_error("a", Some("A is required".to_string()));
        state.set_error("b", Some("B is required".to_string()));
        state.set_value("a", json!("x"));
        assert!(state.error("a").is_none());
        assert_eq!(state.error("b"), Some("B is required"));
    }
}
