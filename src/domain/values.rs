//! Form state value types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Field id -> current value. Unset fields are absent.
pub type FormValues = HashMap<String, Value>;

/// Field id -> human-readable validation message
pub type ErrorState = HashMap<String, String>;

/// Opaque reference to a file picked by the user.
///
/// The engine never reads or uploads the file; it only checks the declared
/// name, size and MIME type against the field constraints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub name: String,
    /// Size in bytes
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, mime_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.map(String::from),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Read one handle or a list of handles out of a stored value
    pub fn all_from_value(value: &Value) -> Vec<FileHandle> {
        match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect(),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map(|h| vec![h])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Lower-cased extension including the dot, e.g. ".pdf"
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
            .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// Falsy per UI semantics: absent, null, false, "", 0, or an empty list
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f == 0.0 || f.is_nan()).unwrap_or(false),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(_)) => false,
    }
}

/// Text rendering of a value used by pattern and length checks
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Numeric reading of a value; numeric strings are accepted
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
