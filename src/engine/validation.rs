//! Per-field constraint checks.
//!
//! Checks run in a fixed order and the first failure wins:
//! required, (stop if empty), pattern, length, number format, numeric
//! range, built-in email/tel format, file constraints.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::values::{is_empty_value, value_as_number, value_as_text};
use crate::domain::{FieldType, FieldValidation, FileHandle, FormField, FormSchema, SchemaError};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;
const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Compiled validation rules for one schema
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    patterns: HashMap<String, Regex>,
    email: Regex,
}

impl ValidationEngine {
    /// Compile every field pattern in the schema
    pub fn new(schema: &FormSchema) -> Result<Self, Vec<SchemaError>> {
        let mut patterns = HashMap::new();
        let mut errors = Vec::new();

        for field in schema.all_fields() {
            let Some(pattern) = field.validation.as_ref().and_then(|v| v.pattern.as_deref()) else {
                continue;
            };
            match Regex::new(pattern) {
                Ok(re) => {
                    patterns.insert(field.id.clone(), re);
                }
                Err(e) => errors.push(SchemaError::InvalidPattern {
                    field: field.id.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        let email = Regex::new(EMAIL_PATTERN).map_err(|e| {
            vec![SchemaError::InvalidPattern {
                field: "email".to_string(),
                reason: e.to_string(),
            }]
        })?;

        if errors.is_empty() {
            Ok(Self { patterns, email })
        } else {
            Err(errors)
        }
    }

    /// First constraint `value` violates, as a display message
    pub fn validate_field(&self, field: &FormField, value: Option<&Value>) -> Option<String> {
        let label = field.display_label();
        let empty = is_empty_value(value);

        if field.required && empty {
            return Some(format!("{} is required", label));
        }
        let value = match value {
            Some(v) if !empty => v,
            _ => return None,
        };

        let rules = field.validation.as_ref();
        let custom = |fallback: String| -> String {
            rules
                .and_then(|r| r.message.clone())
                .unwrap_or(fallback)
        };

        if let Some(re) = self.patterns.get(&field.id) {
            if !re.is_match(&value_as_text(value)) {
                return Some(custom(format!("{} format is invalid", label)));
            }
        }

        if let Some(rules) = rules {
            if let Some(message) = check_length(label, rules, value) {
                return Some(custom(message));
            }
        }

        if field.field_type.is_numeric() && value_as_number(value).is_none() {
            return Some(custom(format!("{} must be a number", label)));
        }

        if let Some(rules) = rules {
            if let Some(message) = check_range(label, rules, value) {
                return Some(custom(message));
            }
        }

        match field.field_type {
            FieldType::Email if !self.email.is_match(value_as_text(value).trim()) => {
                return Some(custom("Please enter a valid email address".to_string()));
            }
            FieldType::Tel if !is_valid_phone(&value_as_text(value)) => {
                return Some(custom("Please enter a valid phone number".to_string()));
            }
            _ => {}
        }

        if field.field_type.is_file() {
            if let Some(message) = check_files(label, &field.field_type, rules, value) {
                return Some(custom(message));
            }
        }

        None
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        other => value_as_text(other).chars().count(),
    }
}

fn check_length(label: &str, rules: &FieldValidation, value: &Value) -> Option<String> {
    let len = length_of(value);
    if let Some(min) = rules.min_length {
        if len < min {
            return Some(format!("{} must be at least {} characters", label, min));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            return Some(format!("{} must be no more than {} characters", label, max));
        }
    }
    None
}

fn check_range(label: &str, rules: &FieldValidation, value: &Value) -> Option<String> {
    let number = value_as_number(value)?;
    if let Some(min) = rules.min {
        if number < min {
            return Some(format!("{} must be at least {}", label, min));
        }
    }
    if let Some(max) = rules.max {
        if number > max {
            return Some(format!("{} must be no more than {}", label, max));
        }
    }
    None
}

/// Ten to fifteen digits, optional leading `+`, ignoring common separators
pub fn is_valid_phone(raw: &str) -> bool {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    let digits = stripped.strip_prefix('+').unwrap_or(&stripped);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
}

fn check_files(
    label: &str,
    field_type: &FieldType,
    rules: Option<&FieldValidation>,
    value: &Value,
) -> Option<String> {
    for file in FileHandle::all_from_value(value) {
        if *field_type == FieldType::ImageUpload {
            if let Some(mime) = &file.mime_type {
                if !mime.starts_with("image/") {
                    return Some(format!("{} must be an image", label));
                }
            }
        }

        let Some(rules) = rules else { continue };

        if !rules.file_types.is_empty() && !accepts(&rules.file_types, &file) {
            return Some(format!(
                "{}: {} is not an accepted file type ({})",
                label,
                file.name,
                rules.file_types.join(", ")
            ));
        }

        if let Some(max_mb) = rules.max_file_size {
            if file.size as f64 > max_mb * BYTES_PER_MEGABYTE {
                return Some(format!("{}: {} exceeds the {} MB limit", label, file.name, max_mb));
            }
        }
    }
    None
}

fn accepts(file_types: &[String], file: &FileHandle) -> bool {
    let extension = file.extension();
    let mime = file.mime_type.as_deref().map(str::to_ascii_lowercase);

    file_types.iter().any(|accepted| {
        let accepted = accepted.trim().to_ascii_lowercase();
        if accepted.starts_with('.') {
            extension.as_deref() == Some(accepted.as_str())
        } else if let Some(prefix) = accepted.strip_suffix("/*") {
            mime.as_deref()
                .map(|m| m.split('/').next() == Some(prefix))
                .unwrap_or(false)
        } else if accepted.contains('/') {
            mime.as_deref() == Some(accepted.as_str())
        } else {
            extension.as_deref() == Some(format!(".{}", accepted).as_str())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FormGroup;
    use serde_json::json;

    fn engine_for(fields: Vec<FormField>) -> (ValidationEngine, Vec<FormField>) {
        let schema = FormSchema::single("f", "F", vec![FormGroup::new("g", fields.clone())]);
        (ValidationEngine::new(&schema).unwrap(), fields)
    }

    fn rules() -> FieldValidation {
        FieldValidation::default()
    }

    #[test]
    fn test_required_message_uses_label() {
        let (engine, fields) = engine_for(vec![FormField::new("name", "text", "Full name").required()]);
        assert_eq!(
            engine.validate_field(&fields[0], None).as_deref(),
            Some("Full name is required")
        );
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!([]))).as_deref(),
            Some("Full name is required")
        );
        assert!(engine.validate_field(&fields[0], Some(&json!("Ada"))).is_none());
    }

    #[test]
    fn test_empty_optional_field_skips_other_checks() {
        let (engine, fields) = engine_for(vec![FormField::new("code", "text", "Code").with_validation(
            FieldValidation {
                pattern: Some("^[A-Z]{3}$".to_string()),
                min_length: Some(3),
                ..rules()
            },
        )]);
        assert!(engine.validate_field(&fields[0], None).is_none());
        assert!(engine.validate_field(&fields[0], Some(&json!(""))).is_none());
    }

    #[test]
    fn test_pattern_runs_before_length() {
        let (engine, fields) = engine_for(vec![FormField::new("code", "text", "Code").with_validation(
            FieldValidation {
                pattern: Some("^[A-Z]+$".to_string()),
                min_length: Some(3),
                ..rules()
            },
        )]);
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("ab"))).as_deref(),
            Some("Code format is invalid")
        );
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("AB"))).as_deref(),
            Some("Code must be at least 3 characters")
        );
        assert!(engine.validate_field(&fields[0], Some(&json!("ABC"))).is_none());
    }

    #[test]
    fn test_custom_message_overrides_built_in() {
        let (engine, fields) = engine_for(vec![FormField::new("zip", "text", "ZIP").with_validation(
            FieldValidation {
                pattern: Some(r"^\d{5}$".to_string()),
                message: Some("Enter a 5 digit ZIP".to_string()),
                ..rules()
            },
        )]);
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("123"))).as_deref(),
            Some("Enter a 5 digit ZIP")
        );
    }

    #[test]
    fn test_numeric_range() {
        let (engine, fields) = engine_for(vec![FormField::new("age", "number", "Age").with_validation(
            FieldValidation {
                min: Some(18.0),
                max: Some(120.0),
                ..rules()
            },
        )]);
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!(12))).as_deref(),
            Some("Age must be at least 18")
        );
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("130"))).as_deref(),
            Some("Age must be no more than 120")
        );
        assert!(engine.validate_field(&fields[0], Some(&json!(40))).is_none());
    }

    #[test]
    fn test_numeric_fields_reject_unparsable_text() {
        let (engine, fields) = engine_for(vec![FormField::new("amount", "currency", "Amount")]);
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("1.2.3"))).as_deref(),
            Some("Amount must be a number")
        );
        assert!(engine.validate_field(&fields[0], Some(&json!(12.5))).is_none());
        assert!(engine.validate_field(&fields[0], Some(&json!("12.5"))).is_none());
    }

    #[test]
    fn test_built_in_email_check() {
        let (engine, fields) = engine_for(vec![FormField::new("email", "email", "Email")]);
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("ada@"))).as_deref(),
            Some("Please enter a valid email address")
        );
        assert!(engine.validate_field(&fields[0], Some(&json!("ada@example.com"))).is_none());
    }

    #[test]
    fn test_email_check_applies_even_with_custom_pattern() {
        let (engine, fields) = engine_for(vec![FormField::new("email", "email", "Email").with_validation(
            FieldValidation {
                pattern: Some("example".to_string()),
                ..rules()
            },
        )]);
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("example"))).as_deref(),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn test_phone_heuristic() {
        assert!(is_valid_phone("+1 (555) 010-9999"));
        assert!(is_valid_phone("020 7946 0958"));
        assert!(!is_valid_phone("555-0199"));
        assert!(!is_valid_phone("call me maybe"));
        assert!(!is_valid_phone("+"));

        let (engine, fields) = engine_for(vec![FormField::new("phone", "tel", "Phone")]);
        assert_eq!(
            engine.validate_field(&fields[0], Some(&json!("12345"))).as_deref(),
            Some("Please enter a valid phone number")
        );
    }

    #[test]
    fn test_file_constraints() {
        let (engine, fields) = engine_for(vec![FormField::new("cv", "file", "CV").with_validation(
            FieldValidation {
                file_types: vec![".pdf".to_string(), "application/msword".to_string()],
                max_file_size: Some(1.0),
                ..rules()
            },
        )]);
        let ok = FileHandle::new("cv.pdf", 1000, Some("application/pdf")).to_value();
        let wrong_type = FileHandle::new("cv.exe", 1000, None).to_value();
        let too_big = FileHandle::new("cv.pdf", 2 * 1024 * 1024, None).to_value();

        assert!(engine.validate_field(&fields[0], Some(&ok)).is_none());
        assert!(engine
            .validate_field(&fields[0], Some(&wrong_type))
            .unwrap()
            .contains("not an accepted file type"));
        assert!(engine
            .validate_field(&fields[0], Some(&too_big))
            .unwrap()
            .contains("exceeds the 1 MB limit"));
    }

    #[test]
    fn test_image_upload_requires_image_mime() {
        let (engine, fields) = engine_for(vec![FormField::new("logo", "image-upload", "Logo")]);
        let pdf = FileHandle::new("logo.pdf", 10, Some("application/pdf")).to_value();
        let png = FileHandle::new("logo.png", 10, Some("image/png")).to_value();
        assert_eq!(
            engine.validate_field(&fields[0], Some(&pdf)).as_deref(),
            Some("Logo must be an image")
        );
        assert!(engine.validate_field(&fields[0], Some(&png)).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_a_schema_error() {
        let schema = FormSchema::single(
            "f",
            "F",
            vec![FormGroup::new(
                "g",
                vec![FormField::new("x", "text", "X").with_validation(FieldValidation {
                    pattern: Some("([a-z".to_string()),
                    ..rules()
                })],
            )],
        );
        let errors = ValidationEngine::new(&schema).unwrap_err();
        assert!(matches!(&errors[0], SchemaError::InvalidPattern { field, .. } if field == "x"));
    }
}
