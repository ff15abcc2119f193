//! Form engine: interprets a [`FormSchema`] and owns the live state of one
//! form instance.
//!
//! The engine is driven by UI events:
//! - `set_value` / `set_text` on change (clears that field's error)
//! - `blur` on focus loss (advisory validation of non-empty values)
//! - `next` / `back` / `jump_to` for step navigation
//! - `submit` / `save` to hand the values to the caller's handlers
//!
//! `render` produces a headless view model of whatever should be on screen.
//!
//! ## Example
//!
//! ```rust,no_run
//! use formflow::domain::{FormSchema, FormValues};
//! use formflow::engine::{FormEngine, HandlerError, SubmitOutcome};
//! use serde_json::json;
//!
//! # async fn run(schema: FormSchema) -> anyhow::Result<()> {
//! let mut engine = FormEngine::builder(schema)
//!     .user_id("user-42")
//!     .on_submit(|values: FormValues| async move {
//!         println!("received {} values", values.len());
//!         Ok::<(), HandlerError>(())
//!     })
//!     .build()?;
//!
//! engine.set_value("name", json!("Ada"))?;
//! if let SubmitOutcome::Submitted(receipt) = engine.submit().await {
//!     println!("reference {}", receipt.reference_id);
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::domain::values::is_empty_value;
use crate::domain::{ErrorState, FormError, FormField, FormResult, FormSchema, FormValues};
use crate::options::{InMemoryOptionSets, OptionSetProvider};

pub mod navigator;
pub mod registry;
pub mod schema_validator;
pub mod state;
pub mod submission;
pub mod validation;
pub mod view;
pub mod visibility;

pub use navigator::{StepNavigator, StepStatus};
pub use registry::{Control, FieldRegistry, PasswordStrength};
pub use schema_validator::SchemaValidator;
pub use submission::{
    HandlerError, SaveOutcome, SubmissionKind, SubmissionReceipt, SubmissionTicket, SubmitOutcome,
    ValuesHandler,
};
pub use validation::ValidationEngine;
pub use view::{ActionBar, ErrorSummaryItem, FieldView, FormPage, FormView, GroupView, StepIndicator, SuccessView};

use state::FormState;
use submission::{generate_reference_id, InFlight};

// ============================================================================
// Builder
// ============================================================================

/// Construction contract of a [`FormEngine`]
pub struct FormEngineBuilder {
    schema: FormSchema,
    initial_data: FormValues,
    user_id: Option<String>,
    option_sets: Option<Arc<dyn OptionSetProvider>>,
    on_submit: Option<Arc<dyn ValuesHandler>>,
    on_save: Option<Arc<dyn ValuesHandler>>,
}

impl FormEngineBuilder {
    /// Values that take precedence over field defaults
    pub fn initial_data(mut self, values: FormValues) -> Self {
        self.initial_data = values;
        self
    }

    /// Identifier recorded on receipts and in diagnostics
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Registry used to resolve `globalOptionSet` keys
    pub fn option_sets(mut self, option_sets: Arc<dyn OptionSetProvider>) -> Self {
        self.option_sets = Some(option_sets);
        self
    }

    pub fn on_submit<H: ValuesHandler + 'static>(mut self, handler: H) -> Self {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    pub fn on_save<H: ValuesHandler + 'static>(mut self, handler: H) -> Self {
        self.on_save = Some(Arc::new(handler));
        self
    }

    /// Validate the schema and create the engine
    pub fn build(self) -> FormResult<FormEngine> {
        let validator = SchemaValidator::compile(&self.schema).map_err(FormError::InvalidSchema)?;

        let option_sets = self
            .option_sets
            .unwrap_or_else(|| Arc::new(InMemoryOptionSets::with_builtin()));
        let navigator = StepNavigator::new(self.schema.step_count());
        let state = FormState::seeded(&self.schema, self.initial_data);

        debug!(
            "Form '{}' ready with {} step(s) and {} field(s)",
            self.schema.form_id,
            navigator.total(),
            self.schema.all_fields().count()
        );

        Ok(FormEngine {
            schema: self.schema,
            validator,
            registry: FieldRegistry::new(option_sets),
            state,
            navigator,
            in_flight: InFlight::default(),
            on_submit: self.on_submit,
            on_save: self.on_save,
            user_id: self.user_id,
            receipt: None,
            last_saved_at: None,
            last_failure: None,
        })
    }
}

// ============================================================================
// Engine
// ============================================================================

/// One mounted form: schema, state, navigation and submission
pub struct FormEngine {
    schema: FormSchema,
    validator: ValidationEngine,
    registry: FieldRegistry,
    state: FormState,
    navigator: StepNavigator,
    in_flight: InFlight,
    on_submit: Option<Arc<dyn ValuesHandler>>,
    on_save: Option<Arc<dyn ValuesHandler>>,
    user_id: Option<String>,
    receipt: Option<SubmissionReceipt>,
    last_saved_at: Option<DateTime<Utc>>,
    last_failure: Option<String>,
}

impl FormEngine {
    pub fn builder(schema: FormSchema) -> FormEngineBuilder {
        FormEngineBuilder {
            schema,
            initial_data: FormValues::new(),
            user_id: None,
            option_sets: None,
            on_submit: None,
            on_save: None,
        }
    }

    /// Engine without handlers, initial data or custom option sets
    pub fn new(schema: FormSchema) -> FormResult<Self> {
        Self::builder(schema).build()
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    // ------------------------------------------------------------------------
    // Form state
    // ------------------------------------------------------------------------

    pub fn values(&self) -> &FormValues {
        self.state.values()
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.state.value(id)
    }

    pub fn errors(&self) -> &ErrorState {
        self.state.errors()
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.state.error(id)
    }

    pub fn is_touched(&self, id: &str) -> bool {
        self.state.is_touched(id)
    }

    fn field(&self, id: &str) -> FormResult<&FormField> {
        self.schema
            .field(id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))
    }

    /// Change handler: store the value and clear that field's error only
    pub fn set_value(&mut self, id: &str, value: Value) -> FormResult<()> {
        self.field(id)?;
        self.state.set_value(id, value);
        Ok(())
    }

    /// Change handler for raw control text, coerced by field type
    pub fn set_text(&mut self, id: &str, raw: &str) -> FormResult<()> {
        let value = self.registry.coerce_text(self.field(id)?, raw);
        self.state.set_value(id, value);
        Ok(())
    }

    pub fn clear_value(&mut self, id: &str) -> FormResult<()> {
        self.field(id)?;
        self.state.clear_value(id);
        Ok(())
    }

    /// Blur handler. Marks the field touched and validates it only when it
    /// already holds a value, so tabbing through untouched required fields
    /// does not flag them.
    pub fn blur(&mut self, id: &str) -> FormResult<Option<String>> {
        let field = self.field(id)?;
        let value = self.state.value(id);
        let filled = !is_empty_value(value);
        let message = if filled {
            self.validator.validate_field(field, value)
        } else {
            None
        };

        self.state.touch(id);
        if filled {
            self.state.set_error(id, message);
        }
        Ok(self.state.error(id).map(String::from))
    }

    // ------------------------------------------------------------------------
    // Visibility and validation
    // ------------------------------------------------------------------------

    pub fn is_visible(&self, id: &str) -> bool {
        self.schema
            .field(id)
            .map(|f| visibility::is_visible(f, self.state.values()))
            .unwrap_or(false)
    }

    /// Fields of a step that are currently shown
    pub fn visible_fields(&self, step: usize) -> Vec<&FormField> {
        self.schema
            .step_groups(step)
            .iter()
            .flat_map(|g| g.fields.iter())
            .filter(|f| visibility::is_visible(f, self.state.values()))
            .collect()
    }

    /// Validate every visible field of `step` (or of the whole form for
    /// `None`) and replace the error state with exactly what was found.
    pub fn validate_step(&mut self, step: Option<usize>) -> bool {
        let values = self.state.values();
        let mut errors = ErrorState::new();

        let fields: Vec<&FormField> = match step {
            Some(index) => self.visible_fields(index),
            None => self
                .schema
                .all_fields()
                .filter(|f| visibility::is_visible(f, values))
                .collect(),
        };

        for field in fields {
            if let Some(message) = self.validator.validate_field(field, values.get(&field.id)) {
                errors.insert(field.id.clone(), message);
            }
        }

        let valid = errors.is_empty();
        if !valid {
            debug!("Step {:?} of '{}' has {} error(s)", step, self.schema.form_id, errors.len());
        }
        self.state.replace_errors(errors);
        valid
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn current_step(&self) -> usize {
        self.navigator.current()
    }

    pub fn step_count(&self) -> usize {
        self.navigator.total()
    }

    pub fn completed_steps(&self) -> &BTreeSet<usize> {
        self.navigator.completed()
    }

    /// (1-based current step, total steps)
    pub fn progress(&self) -> (usize, usize) {
        (self.navigator.current() + 1, self.navigator.total())
    }

    /// Navigation is frozen in the success state and while a submit or
    /// save awaits its handler
    fn navigation_locked(&self, action: &str) -> bool {
        if self.receipt.is_some() {
            return true;
        }
        if self.in_flight.is_active() {
            warn!(
                "{} on '{}' ignored while a submission is in flight",
                action, self.schema.form_id
            );
            return true;
        }
        false
    }

    /// Validate the current step and move forward if it passes
    pub fn next(&mut self) -> bool {
        if self.navigation_locked("Next") || self.navigator.is_last() {
            return false;
        }
        let current = self.navigator.current();
        if !self.validate_step(Some(current)) {
            return false;
        }
        let moved = self.navigator.advance();
        debug!("Form '{}' advanced to step {}", self.schema.form_id, self.navigator.current());
        moved
    }

    /// Move back one step; never validates, never clears completion
    pub fn back(&mut self) -> bool {
        if self.navigation_locked("Back") {
            return false;
        }
        let moved = self.navigator.back();
        if moved {
            debug!("Form '{}' went back to step {}", self.schema.form_id, self.navigator.current());
        }
        moved
    }

    /// Jump to a completed step; a no-op for any other index
    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.navigation_locked("Jump") {
            return false;
        }
        let moved = self.navigator.jump_to(index);
        if moved {
            debug!("Form '{}' jumped to step {}", self.schema.form_id, index);
        } else {
            warn!("Form '{}' refused jump to locked step {}", self.schema.form_id, index);
        }
        moved
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Whether a submit or save is awaiting its handler
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_active()
    }

    /// Receipt of the accepted submission, once in the success state
    pub fn success(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// Time of the last successful save, for a transient confirmation
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Message of the last failed submit/save handler call
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn auto_save_interval(&self) -> Option<Duration> {
        self.schema.auto_save_interval()
    }

    /// Validate and claim the in-flight gate for a submit.
    ///
    /// The returned ticket carries the value snapshot to hand to the submit
    /// handler; pass it back to [`complete_submit`](Self::complete_submit).
    pub fn begin_submit(&mut self) -> Result<SubmissionTicket, SubmitOutcome> {
        if self.receipt.is_some() {
            return Err(SubmitOutcome::AlreadySubmitted);
        }
        if !self.navigator.is_last() {
            return Err(SubmitOutcome::NotOnFinalStep);
        }
        if self.in_flight.is_active() {
            warn!("Submit of '{}' ignored while another submission is in flight", self.schema.form_id);
            return Err(SubmitOutcome::Busy);
        }

        let step = self.schema.multi_step.then(|| self.navigator.current());
        if !self.validate_step(step) {
            return Err(SubmitOutcome::Invalid {
                error_count: self.state.errors().len(),
            });
        }

        let guard = self.in_flight.try_acquire().ok_or(SubmitOutcome::Busy)?;
        Ok(SubmissionTicket::new(
            SubmissionKind::Submit,
            self.state.values().clone(),
            guard,
        ))
    }

    /// Apply the submit handler's result; success enters the terminal state
    pub fn complete_submit(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<(), HandlerError>,
    ) -> SubmitOutcome {
        debug_assert_eq!(ticket.kind(), SubmissionKind::Submit);

        match result {
            Ok(()) => {
                let submitted_at = Utc::now();
                let receipt = SubmissionReceipt {
                    reference_id: generate_reference_id(submitted_at),
                    submitted_at,
                    user_id: self.user_id.clone(),
                };
                info!(
                    "Form '{}' submitted with reference {} after {} ms",
                    self.schema.form_id,
                    receipt.reference_id,
                    (submitted_at - ticket.started_at()).num_milliseconds()
                );
                self.navigator.mark_final_completed();
                self.state.clear_errors();
                self.last_failure = None;
                self.receipt = Some(receipt.clone());
                SubmitOutcome::Submitted(receipt)
            }
            Err(e) => {
                error!(
                    user_id = self.user_id.as_deref().unwrap_or("anonymous"),
                    "Form '{}' submission failed: {}",
                    self.schema.form_id,
                    e
                );
                let message = e.to_string();
                self.last_failure = Some(message.clone());
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Submit action: validate, call the submit handler, record the outcome
    pub async fn submit(&mut self) -> SubmitOutcome {
        let ticket = match self.begin_submit() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let result = match self.on_submit.clone() {
            Some(handler) => handler.handle(ticket.values().clone()).await,
            None => Ok(()),
        };

        self.complete_submit(ticket, result)
    }

    /// Claim the in-flight gate for a save; never validates
    pub fn begin_save(&mut self) -> Result<SubmissionTicket, SaveOutcome> {
        if !self.schema.allow_save_and_continue {
            return Err(SaveOutcome::Disabled);
        }
        let guard = self.in_flight.try_acquire().ok_or_else(|| {
            warn!("Save of '{}' ignored while another submission is in flight", self.schema.form_id);
            SaveOutcome::Busy
        })?;
        Ok(SubmissionTicket::new(
            SubmissionKind::Save,
            self.state.values().clone(),
            guard,
        ))
    }

    pub fn complete_save(&mut self, ticket: SubmissionTicket, result: Result<(), HandlerError>) -> SaveOutcome {
        debug_assert_eq!(ticket.kind(), SubmissionKind::Save);

        match result {
            Ok(()) => {
                let saved_at = Utc::now();
                info!("Form '{}' progress saved", self.schema.form_id);
                self.last_saved_at = Some(saved_at);
                self.last_failure = None;
                SaveOutcome::Saved { saved_at }
            }
            Err(e) => {
                error!(
                    user_id = self.user_id.as_deref().unwrap_or("anonymous"),
                    "Form '{}' save failed: {}",
                    self.schema.form_id,
                    e
                );
                let message = e.to_string();
                self.last_failure = Some(message.clone());
                SaveOutcome::Failed { message }
            }
        }
    }

    /// Save-and-close action: hand the possibly incomplete values to the
    /// save handler without validating or moving
    pub async fn save(&mut self) -> SaveOutcome {
        let ticket = match self.begin_save() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let result = match self.on_save.clone() {
            Some(handler) => handler.handle(ticket.values().clone()).await,
            None => Ok(()),
        };

        self.complete_save(ticket, result)
    }

    /// Leave the success view: back to the first step with no completed
    /// steps. Form state is kept.
    pub fn close_success(&mut self) {
        if self.receipt.take().is_some() {
            self.navigator.reset();
            self.state.clear_errors();
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// View model for the current state
    pub fn render(&self) -> FormView {
        if let Some(receipt) = &self.receipt {
            return FormView::Success(SuccessView {
                form_id: self.schema.form_id.clone(),
                title: self.schema.form_title.clone(),
                reference_id: receipt.reference_id.clone(),
            });
        }

        let values = self.state.values();
        let current = self.navigator.current();
        let busy = self.in_flight.is_active();

        let steps = (0..self.navigator.total())
            .map(|index| {
                let status = self.navigator.status(index);
                StepIndicator {
                    index,
                    title: self.schema.step_title(index).to_string(),
                    status,
                    clickable: status == StepStatus::Completed,
                }
            })
            .collect();

        let groups = self
            .schema
            .step_groups(current)
            .iter()
            .filter_map(|group| {
                let fields: Vec<FieldView> = group
                    .fields
                    .iter()
                    .filter(|f| visibility::is_visible(f, values))
                    .map(|f| self.field_view(f))
                    .collect();
                (!fields.is_empty()).then(|| GroupView {
                    id: group.id.clone(),
                    title: group.title.clone(),
                    description: group.description.clone(),
                    collapsed: group.collapsed,
                    fields,
                })
            })
            .collect();

        let error_summary = self
            .schema
            .all_fields()
            .filter(|f| visibility::is_visible(f, values))
            .filter_map(|f| {
                self.state.error(&f.id).map(|message| ErrorSummaryItem {
                    field_id: f.id.clone(),
                    label: f.display_label().to_string(),
                    message: message.to_string(),
                })
            })
            .collect();

        FormView::Form(FormPage {
            form_id: self.schema.form_id.clone(),
            title: self.schema.form_title.clone(),
            description: self.schema.form_description.clone(),
            multi_step: self.schema.multi_step,
            steps,
            current_step: current,
            total_steps: self.navigator.total(),
            progress_percent: self.navigator.progress_percent(),
            step_description: self
                .schema
                .multi_step
                .then(|| self.schema.step_description(current).map(String::from))
                .flatten(),
            groups,
            error_summary,
            actions: ActionBar {
                can_go_back: !busy && !self.navigator.is_first(),
                can_go_next: !busy && !self.navigator.is_last(),
                can_submit: !busy && self.navigator.is_last(),
                can_save: !busy && self.schema.allow_save_and_continue,
                busy,
            },
            auto_save_interval_ms: self.schema.auto_save_interval,
        })
    }

    fn field_view(&self, field: &FormField) -> FieldView {
        let value = self.state.value(&field.id);
        let error = self.state.error(&field.id).map(String::from);
        let touched = self.state.is_touched(&field.id);
        let show_success = field.field_type.has_success_affordance()
            && touched
            && !is_empty_value(value)
            && error.is_none();

        FieldView {
            id: field.id.clone(),
            label: field.display_label().to_string(),
            required: field.required,
            placeholder: field.placeholder.clone(),
            helper_text: field.helper_text.clone(),
            control: self.registry.control_for(field, value),
            value: value.cloned().unwrap_or(Value::Null),
            display_value: self.registry.display_value(field, value),
            error,
            touched,
            show_success,
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
