//! # Formflow - Schema-driven Multi-step Forms
//!
//! Formflow interprets a declarative form description (steps, groups,
//! fields, validation rules, conditional visibility) and drives a form
//! instance through its lifecycle: value entry, per-field validation,
//! step navigation, submission and save-and-continue.
//!
//! ## Features
//!
//! - **29 field types**: text inputs, choices, dates, files, numbers, address, currency, signature
//! - **Validation**: required, pattern, length, range, email, phone and file checks
//! - **Conditional fields**: `showWhen` equality or membership on another field
//! - **Wizard navigation**: completed-step tracking with jump-back
//! - **Headless rendering**: a serializable view model for any UI
//! - **Option sets**: shared option lists injected at construction
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formflow::domain::FormSchema;
//! use formflow::engine::FormEngine;
//!
//! fn main() -> anyhow::Result<()> {
//!     let schema = FormSchema::from_json_str(r#"{
//!         "formId": "contact",
//!         "formTitle": "Contact us",
//!         "groups": [{ "title": "You", "fields": [
//!             { "id": "email", "type": "email", "label": "Email", "required": true }
//!         ]}]
//!     }"#)?;
//!
//!     let mut engine = FormEngine::new(schema)?;
//!     assert!(!engine.validate_step(None));
//!     assert_eq!(engine.error("email"), Some("Email is required"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema data model and form values
//! - **Engine**: schema validator, visibility, validation, navigation, submission, rendering
//! - **Options**: option-set registry
//! - **Adapters**: file-backed submission sink
//! - **Config**: settings and schema/option-set file loading

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod engine;
pub mod options;

pub use domain::{FormError, FormResult, FormSchema, FormValues, SchemaError};
pub use engine::{FormEngine, FormView, SaveOutcome, SubmitOutcome};
