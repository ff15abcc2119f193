//! Field registry: maps each declared field type to the control that edits it
//! and to the shape of the value it stores.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::values::{value_as_number, value_as_text};
use crate::domain::{FieldOption, FieldType, FormField};
use crate::options::OptionSetProvider;

// ============================================================================
// Controls
// ============================================================================

/// Variant of a date-like picker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    Date,
    DateRange,
    Time,
    DateTime,
}

/// Password strength feedback (score 0-4)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: &'static str,
}

/// Interactive control a field renders as
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    TextInput {
        input_type: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    TextArea {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Select {
        options: Vec<FieldOption>,
        multiple: bool,
    },
    Radio {
        options: Vec<FieldOption>,
    },
    CheckboxGroup {
        options: Vec<FieldOption>,
    },
    Checkbox,
    Switch,
    Consent {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    DatePicker {
        mode: DateMode,
    },
    FileUpload {
        multiple: bool,
        images_only: bool,
        accept: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_file_size_mb: Option<f64>,
    },
    NumberInput {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Password {
        #[serde(skip_serializing_if = "Option::is_none")]
        strength: Option<PasswordStrength>,
    },
    Address,
    Currency {
        code: String,
        formatted: String,
    },
    Slider {
        min: f64,
        max: f64,
        step: f64,
    },
    Rating {
        max: u32,
    },
    Stepper {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        step: f64,
    },
    Lookup {
        #[serde(skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },
    Autocomplete {
        options: Vec<FieldOption>,
        #[serde(skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },
    Tags,
    Signature,
    /// Visible notice for a type this engine cannot render
    Unsupported {
        type_name: String,
    },
}

// ============================================================================
// Registry
// ============================================================================

/// Resolves controls, options and input coercion for fields
#[derive(Clone)]
pub struct FieldRegistry {
    option_sets: Arc<dyn OptionSetProvider>,
}

impl FieldRegistry {
    pub fn new(option_sets: Arc<dyn OptionSetProvider>) -> Self {
        Self { option_sets }
    }

    /// Options for a selection field. A named set wins over literal options;
    /// an unknown set name yields an empty list.
    pub fn resolve_options(&self, field: &FormField) -> Vec<FieldOption> {
        match &field.global_option_set {
            Some(key) => self.option_sets.resolve(key).unwrap_or_else(|| {
                tracing::warn!("Unknown option set '{}' for field '{}'", key, field.id);
                Vec::new()
            }),
            None => field.options.clone(),
        }
    }

    /// Control descriptor for a field holding `value`
    pub fn control_for(&self, field: &FormField, value: Option<&Value>) -> Control {
        let rules = field.validation.clone().unwrap_or_default();

        match &field.field_type {
            FieldType::Text => Control::TextInput {
                input_type: "text",
                max_length: rules.max_length,
            },
            FieldType::Email => Control::TextInput {
                input_type: "email",
                max_length: rules.max_length,
            },
            FieldType::Tel => Control::TextInput {
                input_type: "tel",
                max_length: rules.max_length,
            },
            FieldType::Textarea => Control::TextArea {
                max_length: rules.max_length,
            },
            FieldType::Select => Control::Select {
                options: self.resolve_options(field),
                multiple: false,
            },
            FieldType::MultiSelect => Control::Select {
                options: self.resolve_options(field),
                multiple: true,
            },
            FieldType::Radio => Control::Radio {
                options: self.resolve_options(field),
            },
            FieldType::CheckboxGroup => Control::CheckboxGroup {
                options: self.resolve_options(field),
            },
            FieldType::Checkbox => Control::Checkbox,
            FieldType::Switch => Control::Switch,
            FieldType::Consent => Control::Consent {
                text: field.helper_text.clone(),
            },
            FieldType::Date => Control::DatePicker { mode: DateMode::Date },
            FieldType::DateRange => Control::DatePicker {
                mode: DateMode::DateRange,
            },
            FieldType::Time => Control::DatePicker { mode: DateMode::Time },
            FieldType::DateTime => Control::DatePicker {
                mode: DateMode::DateTime,
            },
            FieldType::File | FieldType::MultiFile | FieldType::ImageUpload => Control::FileUpload {
                multiple: field.field_type == FieldType::MultiFile,
                images_only: field.field_type == FieldType::ImageUpload,
                accept: rules.file_types.clone(),
                max_file_size_mb: rules.max_file_size,
            },
            FieldType::Number => Control::NumberInput {
                min: rules.min,
                max: rules.max,
                step: rules.step,
            },
            FieldType::Password => Control::Password {
                strength: (rules.strength != Some(false))
                    .then(|| password_strength(&value.map(value_as_text).unwrap_or_default())),
            },
            FieldType::Address => Control::Address,
            FieldType::Currency => Control::Currency {
                code: field.currency.clone().unwrap_or_else(|| "USD".to_string()),
                formatted: value
                    .and_then(value_as_number)
                    .map(format_currency)
                    .unwrap_or_default(),
            },
            FieldType::Slider => Control::Slider {
                min: rules.min.unwrap_or(0.0),
                max: rules.max.unwrap_or(100.0),
                step: rules.step.unwrap_or(1.0),
            },
            FieldType::Rating => Control::Rating {
                max: rules.max.map(|m| m.max(1.0) as u32).unwrap_or(5),
            },
            FieldType::Stepper => Control::Stepper {
                min: rules.min,
                max: rules.max,
                step: rules.step.unwrap_or(1.0),
            },
            FieldType::Lookup => Control::Lookup {
                endpoint: field.search_endpoint.clone(),
            },
            FieldType::Autocomplete => Control::Autocomplete {
                options: self.resolve_options(field),
                endpoint: field.search_endpoint.clone(),
            },
            FieldType::Tags => Control::Tags,
            FieldType::Signature => Control::Signature,
            FieldType::Unsupported(name) => Control::Unsupported {
                type_name: name.clone(),
            },
        }
    }

    /// Coerce raw UI text into the value stored for this field type
    pub fn coerce_text(&self, field: &FormField, raw: &str) -> Value {
        let trimmed = raw.trim();
        match &field.field_type {
            FieldType::Currency => {
                if trimmed.is_empty() {
                    Value::Null
                } else {
                    parse_currency(raw)
                        .map(|n| json!(n))
                        .unwrap_or_else(|| Value::String(raw.to_string()))
                }
            }
            FieldType::Number | FieldType::Slider | FieldType::Rating | FieldType::Stepper => {
                if trimmed.is_empty() {
                    Value::Null
                } else {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .map(number_value)
                        .unwrap_or_else(|| Value::String(raw.to_string()))
                }
            }
            FieldType::Checkbox | FieldType::Switch | FieldType::Consent => {
                Value::Bool(matches!(
                    trimmed.to_ascii_lowercase().as_str(),
                    "true" | "yes" | "on" | "1" | "checked"
                ))
            }
            FieldType::Tags | FieldType::MultiSelect | FieldType::CheckboxGroup => Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            ),
            _ => Value::String(raw.to_string()),
        }
    }

    /// Text shown in the control, where it differs from the stored value
    pub fn display_value(&self, field: &FormField, value: Option<&Value>) -> Option<String> {
        let value = value?;
        match &field.field_type {
            FieldType::Currency => value_as_number(value).map(format_currency),
            FieldType::Select | FieldType::Radio | FieldType::Autocomplete => {
                let selected = value_as_text(value);
                self.resolve_options(field)
                    .into_iter()
                    .find(|o| o.value == selected)
                    .map(|o| o.label)
            }
            _ => None,
        }
    }
}

/// Integers stay integers so that stored values read naturally
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

// ============================================================================
// Presentation Helpers
// ============================================================================

/// Score one point per satisfied rule: length >= 8, uppercase, digit, symbol
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
    ];
    let score = checks.iter().filter(|ok| **ok).count() as u8;
    let label = match score {
        0 | 1 => "Weak",
        2 => "Fair",
        3 => "Good",
        _ => "Strong",
    };
    PasswordStrength { score, label }
}

/// Grouped amount with cents shown only when present: 1234.5 -> "1,234.50"
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    if fraction == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, fraction)
    }
}

/// Inverse of [`format_currency`]; ignores grouping and currency symbols
pub fn parse_currency(display: &str) -> Option<f64> {
    let cleaned: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
