//! Headless view model produced by [`FormEngine::render`](super::FormEngine::render).
//!
//! The host UI turns these structures into widgets; nothing here carries
//! styling beyond the cosmetic flags the engine tracks.

use serde::Serialize;
use serde_json::Value;

use super::navigator::StepStatus;
use super::registry::Control;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum FormView {
    Form(FormPage),
    Success(SuccessView),
}

/// Confirmation shown in place of the form after a successful submit
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SuccessView {
    pub form_id: String,
    pub title: String,
    pub reference_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormPage {
    pub form_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub multi_step: bool,
    pub steps: Vec<StepIndicator>,
    pub current_step: usize,
    pub total_steps: usize,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_description: Option<String>,
    pub groups: Vec<GroupView>,
    pub error_summary: Vec<ErrorSummaryItem>,
    pub actions: ActionBar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save_interval_ms: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepIndicator {
    pub index: usize,
    pub title: String,
    pub status: StepStatus,
    /// Whether a click on the indicator navigates
    pub clickable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub collapsed: bool,
    pub fields: Vec<FieldView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldView {
    pub id: String,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    pub control: Control,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub touched: bool,
    /// Cosmetic "looks good" affordance
    pub show_success: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorSummaryItem {
    pub field_id: String,
    pub label: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionBar {
    pub can_go_back: bool,
    pub can_go_next: bool,
    pub can_submit: bool,
    pub can_save: bool,
    /// A submit or save is awaiting its handler
    pub busy: bool,
}

impl FormView {
    pub fn as_page(&self) -> Option<&FormPage> {
        match self {
            FormView::Form(page) => Some(page),
            FormView::Success(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FormView::Success(_))
    }
}

impl FormPage {
    pub fn field(&self, id: &str) -> Option<&FieldView> {
        self.groups
            .iter()
            .flat_map(|g| g.fields.iter())
            .find(|f| f.id == id)
    }
}
