//! Root schema types: form, steps and groups.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::error::{FormError, SchemaError};
use super::field::FormField;

/// Titled cluster of fields rendered as one section
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cosmetic hint for narrow layouts; never affects state
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormGroup {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            fields,
            ..Default::default()
        }
    }
}

/// One page of a multi-step form
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub groups: Vec<FormGroup>,
}

impl FormStep {
    pub fn new(title: impl Into<String>, groups: Vec<FormGroup>) -> Self {
        Self {
            title: title.into(),
            groups,
            ..Default::default()
        }
    }
}

/// Declarative description of a whole form
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    #[serde(default)]
    pub form_id: String,
    #[serde(default)]
    pub form_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_description: Option<String>,
    #[serde(default)]
    pub multi_step: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<FormStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<FormGroup>,
    #[serde(default)]
    pub allow_save_and_continue: bool,
    /// Auto-save period in milliseconds, surfaced to the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_endpoint: Option<String>,
}

impl FormSchema {
    /// Single-step schema over a flat list of groups
    pub fn single(form_id: impl Into<String>, form_title: impl Into<String>, groups: Vec<FormGroup>) -> Self {
        Self {
            form_id: form_id.into(),
            form_title: form_title.into(),
            groups,
            ..Default::default()
        }
    }

    /// Multi-step schema over an ordered list of steps
    pub fn multi(form_id: impl Into<String>, form_title: impl Into<String>, steps: Vec<FormStep>) -> Self {
        Self {
            form_id: form_id.into(),
            form_title: form_title.into(),
            multi_step: true,
            steps,
            ..Default::default()
        }
    }

    /// Parse a schema document; `null` means no schema was supplied
    pub fn from_value(value: Value) -> Result<Self, FormError> {
        if value.is_null() {
            return Err(FormError::InvalidSchema(vec![SchemaError::MissingSchema]));
        }
        serde_json::from_value(value).map_err(|e| FormError::Parse(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, FormError> {
        if content.trim().is_empty() {
            return Err(FormError::InvalidSchema(vec![SchemaError::MissingSchema]));
        }
        let value: Value = serde_json::from_str(content).map_err(|e| FormError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, FormError> {
        if content.trim().is_empty() {
            return Err(FormError::InvalidSchema(vec![SchemaError::MissingSchema]));
        }
        let value: Value = serde_yaml::from_str(content).map_err(|e| FormError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Number of steps; a single-step form is one implicit step
    pub fn step_count(&self) -> usize {
        if self.multi_step {
            self.steps.len()
        } else {
            1
        }
    }

    /// Groups belonging to a step index
    pub fn step_groups(&self, index: usize) -> &[FormGroup] {
        if self.multi_step {
            self.steps.get(index).map(|s| s.groups.as_slice()).unwrap_or(&[])
        } else if index == 0 {
            &self.groups
        } else {
            &[]
        }
    }

    pub fn step_title(&self, index: usize) -> &str {
        if self.multi_step {
            self.steps.get(index).map(|s| s.title.as_str()).unwrap_or("")
        } else {
            &self.form_title
        }
    }

    pub fn step_description(&self, index: usize) -> Option<&str> {
        if self.multi_step {
            self.steps.get(index).and_then(|s| s.description.as_deref())
        } else {
            self.form_description.as_deref()
        }
    }

    /// Every group in schema order, across all steps
    pub fn all_groups(&self) -> impl Iterator<Item = &FormGroup> {
        let (steps, flat): (&[FormStep], &[FormGroup]) = if self.multi_step {
            (self.steps.as_slice(), &[])
        } else {
            (&[], self.groups.as_slice())
        };
        steps.iter().flat_map(|s| s.groups.iter()).chain(flat.iter())
    }

    /// Every field in schema order, across all steps
    pub fn all_fields(&self) -> impl Iterator<Item = &FormField> {
        self.all_groups().flat_map(|g| g.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.all_fields().find(|f| f.id == id)
    }

    /// Index of the step containing a field
    pub fn step_of(&self, id: &str) -> Option<usize> {
        (0..self.step_count()).find(|&i| {
            self.step_groups(i)
                .iter()
                .any(|g| g.fields.iter().any(|f| f.id == id))
        })
    }

    pub fn auto_save_interval(&self) -> Option<Duration> {
        self.auto_save_interval.map(Duration::from_millis)
    }
}
