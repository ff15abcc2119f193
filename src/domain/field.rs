//! Field-level schema types: the atomic unit of a form.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Field Type
// ============================================================================

/// Declared control type of a field.
///
/// The set is closed; anything the engine does not recognise is kept as
/// [`FieldType::Unsupported`] so that the rest of the schema still renders.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    MultiSelect,
    Checkbox,
    CheckboxGroup,
    Radio,
    Switch,
    Date,
    DateRange,
    Time,
    DateTime,
    File,
    MultiFile,
    ImageUpload,
    Number,
    Email,
    Tel,
    Password,
    Address,
    Currency,
    Slider,
    Rating,
    Stepper,
    Lookup,
    Autocomplete,
    Tags,
    Signature,
    Consent,
    /// A type name this engine does not know how to render
    Unsupported(String),
}

impl FieldType {
    /// Wire name used in schema documents
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multiselect",
            FieldType::Checkbox => "checkbox",
            FieldType::CheckboxGroup => "checkbox-group",
            FieldType::Radio => "radio",
            FieldType::Switch => "switch",
            FieldType::Date => "date",
            FieldType::DateRange => "daterange",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::File => "file",
            FieldType::MultiFile => "multi-file",
            FieldType::ImageUpload => "image-upload",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Password => "password",
            FieldType::Address => "address",
            FieldType::Currency => "currency",
            FieldType::Slider => "slider",
            FieldType::Rating => "rating",
            FieldType::Stepper => "stepper",
            FieldType::Lookup => "lookup",
            FieldType::Autocomplete => "autocomplete",
            FieldType::Tags => "tags",
            FieldType::Signature => "signature",
            FieldType::Consent => "consent",
            FieldType::Unsupported(name) => name.as_str(),
        }
    }

    /// Fields whose value is an opaque file handle
    pub fn is_file(&self) -> bool {
        matches!(
            self,
            FieldType::File | FieldType::MultiFile | FieldType::ImageUpload
        )
    }

    /// Fields that get success styling once touched and valid
    pub fn has_success_affordance(&self) -> bool {
        matches!(self, FieldType::Email | FieldType::Tel | FieldType::Password) || self.is_file()
    }

    /// Fields whose stored value is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Number
                | FieldType::Currency
                | FieldType::Slider
                | FieldType::Rating
                | FieldType::Stepper
        )
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "select" => FieldType::Select,
            "multiselect" => FieldType::MultiSelect,
            "checkbox" => FieldType::Checkbox,
            "checkbox-group" => FieldType::CheckboxGroup,
            "radio" => FieldType::Radio,
            "switch" => FieldType::Switch,
            "date" => FieldType::Date,
            "daterange" => FieldType::DateRange,
            "time" => FieldType::Time,
            "datetime" => FieldType::DateTime,
            "file" => FieldType::File,
            "multi-file" => FieldType::MultiFile,
            "image-upload" => FieldType::ImageUpload,
            "number" => FieldType::Number,
            "email" => FieldType::Email,
            "tel" => FieldType::Tel,
            "password" => FieldType::Password,
            "address" => FieldType::Address,
            "currency" => FieldType::Currency,
            "slider" => FieldType::Slider,
            "rating" => FieldType::Rating,
            "stepper" => FieldType::Stepper,
            "lookup" => FieldType::Lookup,
            "autocomplete" => FieldType::Autocomplete,
            "tags" => FieldType::Tags,
            "signature" => FieldType::Signature,
            "consent" => FieldType::Consent,
            _ => FieldType::Unsupported(name),
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::from(name.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Options, Validation, Conditional Logic
// ============================================================================

/// One entry of a selection list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Constraint bag attached to a field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// Regular expression the value must match (unanchored search)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Replaces the built-in message of every non-required check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Accepted extensions (".pdf") or MIME types ("image/*")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_types: Vec<String>,
    /// Maximum file size in megabytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<f64>,
    /// Show the password strength meter (defaults to on)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<bool>,
}

/// Value(s) of the dependency field that make a conditional field visible
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ShowWhen {
    AnyOf(Vec<Value>),
    Equals(Value),
}

/// Visibility rule: show this field only when `depends_on` holds `show_when`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    pub depends_on: String,
    pub show_when: ShowWhen,
}

// ============================================================================
// Form Field
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Unique across the whole schema; key into the form state
    pub id: String,
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Key into the injected option-set registry; takes precedence over `options`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_option_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
    /// ISO currency code for `currency` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Search endpoint for `lookup` and `autocomplete` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_endpoint: Option<String>,
}

impl FormField {
    pub fn new(id: impl Into<String>, field_type: impl Into<FieldType>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type: field_type.into(),
            label: label.into(),
            required: false,
            placeholder: None,
            helper_text: None,
            default_value: None,
            validation: None,
            options: Vec::new(),
            global_option_set: None,
            conditional_logic: None,
            currency: None,
            search_endpoint: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn show_when(mut self, depends_on: impl Into<String>, show_when: ShowWhen) -> Self {
        self.conditional_logic = Some(ConditionalLogic {
            depends_on: depends_on.into(),
            show_when,
        });
        self
    }

    /// Label used in messages, falling back to the id
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}
