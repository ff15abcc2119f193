use std::collections::{HashMap, HashSet};

use crate::domain::{FormField, FormGroup, FormSchema, SchemaError};

use super::validation::ValidationEngine;
use super::visibility::find_dependency_cycle;

/// Structural checks run once before an engine is built
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(schema: &FormSchema) -> Result<(), Vec<SchemaError>> {
        Self::compile(schema).map(|_| ())
    }

    /// Run every structural check and hand back the field validator built
    /// along the way, so patterns are compiled once per engine
    pub fn compile(schema: &FormSchema) -> Result<ValidationEngine, Vec<SchemaError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_identity(schema) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_layout(schema) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_fields(schema) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_dependencies(schema) {
            errors.extend(e);
        }

        let validator = match ValidationEngine::new(schema) {
            Ok(validator) => Some(validator),
            Err(e) => {
                errors.extend(e);
                None
            }
        };

        match validator {
            Some(validator) if errors.is_empty() => Ok(validator),
            _ => Err(errors),
        }
    }

    fn validate_identity(schema: &FormSchema) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();

        if schema.form_id.trim().is_empty() {
            errors.push(SchemaError::MissingField("formId".to_string()));
        }

        if schema.form_title.trim().is_empty() {
            errors.push(SchemaError::MissingField("formTitle".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_layout(schema: &FormSchema) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();
        let has_field = |groups: &[FormGroup]| groups.iter().any(|g| !g.fields.is_empty());

        if schema.multi_step {
            if schema.steps.is_empty() {
                errors.push(SchemaError::NoSteps);
            }
            for (index, step) in schema.steps.iter().enumerate() {
                if !has_field(&step.groups) {
                    errors.push(SchemaError::EmptyStep {
                        index,
                        title: step.title.clone(),
                    });
                }
            }
        } else if schema.groups.is_empty() {
            errors.push(SchemaError::NoGroups);
        } else if !has_field(&schema.groups) {
            errors.push(SchemaError::NoFields);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_fields(schema: &FormSchema) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for group in schema.all_groups() {
            for field in &group.fields {
                if field.id.trim().is_empty() {
                    errors.push(SchemaError::EmptyFieldId {
                        group: group.title.clone(),
                        label: field.label.clone(),
                    });
                    continue;
                }

                if !seen.insert(field.id.as_str()) {
                    errors.push(SchemaError::DuplicateFieldId(field.id.clone()));
                }

                errors.extend(Self::validate_ranges(field));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_ranges(field: &FormField) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let Some(rules) = &field.validation else {
            return errors;
        };

        if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
            if min > max {
                errors.push(SchemaError::InvalidRange {
                    field: field.id.clone(),
                    reason: format!("minLength {} is greater than maxLength {}", min, max),
                });
            }
        }

        if let (Some(min), Some(max)) = (rules.min, rules.max) {
            if min > max {
                errors.push(SchemaError::InvalidRange {
                    field: field.id.clone(),
                    reason: format!("min {} is greater than max {}", min, max),
                });
            }
        }

        errors
    }

    fn validate_dependencies(schema: &FormSchema) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();
        let ids: HashMap<&str, &FormField> = schema.all_fields().map(|f| (f.id.as_str(), f)).collect();

        for field in schema.all_fields() {
            let Some(logic) = &field.conditional_logic else {
                continue;
            };
            if logic.depends_on == field.id {
                errors.push(SchemaError::SelfDependency(field.id.clone()));
            } else if !ids.contains_key(logic.depends_on.as_str()) {
                errors.push(SchemaError::UnknownDependency {
                    field: field.id.clone(),
                    depends_on: logic.depends_on.clone(),
                });
            }
        }

        // Self-loops are already reported above
        if errors.is_empty() {
            if let Some(cycle) = find_dependency_cycle(schema) {
                errors.push(SchemaError::CircularDependency(cycle));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
