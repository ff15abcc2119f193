use super::*;
use crate::domain::{FieldOption, FieldValidation, FormGroup, FormStep, SchemaError, ShowWhen};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Handler recording every snapshot it receives
#[derive(Clone, Default)]
struct RecordingHandler {
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<FormValues>>>,
    fail: bool,
}

impl RecordingHandler {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ValuesHandler for RecordingHandler {
    async fn handle(&self, values: FormValues) -> Result<(), HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(values);
        if self.fail {
            return Err(HandlerError::Unavailable("backend offline".to_string()));
        }
        Ok(())
    }
}

fn wizard() -> FormSchema {
    let account = FormStep::new(
        "Account",
        vec![FormGroup::new(
            "Who are you",
            vec![
                FormField::new("name", "text", "Name")
                    .required()
                    .with_validation(FieldValidation {
                        min_length: Some(2),
                        ..Default::default()
                    }),
                FormField::new("email", "email", "Email").required(),
                FormField::new("contact_method", "radio", "Contact method").with_options(vec![
                    FieldOption::new("email", "Email"),
                    FieldOption::new("phone", "Phone"),
                ]),
                FormField::new("phone", "tel", "Phone")
                    .required()
                    .show_when("contact_method", ShowWhen::Equals(json!("phone"))),
            ],
        )],
    );
    let preferences = FormStep::new(
        "Preferences",
        vec![FormGroup::new(
            "Extras",
            vec![
                FormField::new("newsletter", "switch", "Newsletter").with_default(json!(false)),
                FormField::new("age", "number", "Age").with_validation(FieldValidation {
                    min: Some(18.0),
                    max: Some(120.0),
                    ..Default::default()
                }),
            ],
        )],
    );
    FormSchema::multi("signup", "Sign up", vec![account, preferences])
}

fn fill_account(engine: &mut FormEngine) {
    engine.set_value("name", json!("Ada")).unwrap();
    engine.set_value("email", json!("ada@example.com")).unwrap();
}

#[test]
fn test_build_rejects_invalid_schema() {
    let schema = FormSchema::multi("w", "Wizard", vec![]);
    match FormEngine::new(schema) {
        Err(FormError::InvalidSchema(errors)) => assert_eq!(errors, vec![SchemaError::NoSteps]),
        other => panic!("expected invalid schema, got {:?}", other.err()),
    }
}

#[test]
fn test_defaults_seed_state() {
    let engine = FormEngine::new(wizard()).unwrap();
    assert_eq!(engine.value("newsletter"), Some(&json!(false)));
    assert_eq!(engine.progress(), (1, 2));
    assert_eq!(engine.step_count(), 2);
}

#[test]
fn test_unknown_field_is_rejected() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    assert!(matches!(
        engine.set_value("ghost", json!(1)),
        Err(FormError::UnknownField(id)) if id == "ghost"
    ));
}

#[test]
fn test_next_blocks_on_invalid_step() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    assert!(!engine.next());
    assert_eq!(engine.current_step(), 0);
    assert_eq!(engine.error("name"), Some("Name is required"));
    assert_eq!(engine.error("email"), Some("Email is required"));
    // hidden required field is not validated
    assert!(engine.error("phone").is_none());
    assert!(engine.completed_steps().is_empty());
}

#[test]
fn test_set_value_clears_only_its_error() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    engine.next();
    engine.set_value("name", json!("A")).unwrap();
    assert!(engine.error("name").is_none());
    assert_eq!(engine.error("email"), Some("Email is required"));
}

#[test]
fn test_blur_validates_only_filled_fields() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    assert_eq!(engine.blur("name").unwrap(), None);
    assert!(engine.is_touched("name"));

    engine.set_value("email", json!("not-an-email")).unwrap();
    assert_eq!(
        engine.blur("email").unwrap().as_deref(),
        Some("Please enter a valid email address")
    );

    engine.set_value("email", json!("ada@example.com")).unwrap();
    assert_eq!(engine.blur("email").unwrap(), None);
}

#[test]
fn test_conditional_field_gates_validation() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    fill_account(&mut engine);
    engine.set_value("contact_method", json!("phone")).unwrap();
    assert!(engine.is_visible("phone"));
    assert!(!engine.next());
    assert_eq!(engine.error("phone"), Some("Phone is required"));

    engine.set_value("contact_method", json!("email")).unwrap();
    assert!(!engine.is_visible("phone"));
    assert!(engine.next());
    assert_eq!(engine.current_step(), 1);
}

#[test]
fn test_hidden_field_keeps_its_value() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    engine.set_value("contact_method", json!("phone")).unwrap();
    engine.set_value("phone", json!("kept")).unwrap();

    engine.set_value("contact_method", json!("email")).unwrap();
    assert!(!engine.is_visible("phone"));
    assert_eq!(engine.value("phone"), Some(&json!("kept")));

    engine.set_value("contact_method", json!("phone")).unwrap();
    assert!(engine.is_visible("phone"));
    assert_eq!(engine.value("phone"), Some(&json!("kept")));
    let view = engine.render();
    assert_eq!(view.as_page().unwrap().field("phone").unwrap().value, json!("kept"));
}

#[test]
fn test_navigation_tracks_completed_steps() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    fill_account(&mut engine);
    assert!(engine.next());
    assert!(engine.completed_steps().contains(&0));
    assert!(!engine.next());

    assert!(engine.back());
    assert_eq!(engine.current_step(), 0);
    assert!(!engine.back());
    assert!(engine.completed_steps().contains(&0));

    // step 1 was never completed
    assert!(!engine.jump_to(1));
    assert_eq!(engine.current_step(), 0);

    assert!(engine.next());
    assert!(engine.jump_to(0));
    assert_eq!(engine.current_step(), 0);
}

#[tokio::test]
async fn test_submit_requires_final_step() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    assert_eq!(engine.submit().await, SubmitOutcome::NotOnFinalStep);
}

#[tokio::test]
async fn test_submit_validates_final_step() {
    let handler = RecordingHandler::default();
    let mut engine = FormEngine::builder(wizard())
        .on_submit(handler.clone())
        .build()
        .unwrap();
    fill_account(&mut engine);
    engine.next();
    engine.set_value("age", json!(17)).unwrap();

    assert_eq!(engine.submit().await, SubmitOutcome::Invalid { error_count: 1 });
    assert_eq!(engine.error("age"), Some("Age must be at least 18"));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_successful_submit_and_close() {
    let handler = RecordingHandler::default();
    let mut engine = FormEngine::builder(wizard())
        .user_id("user-7")
        .on_submit(handler.clone())
        .build()
        .unwrap();
    fill_account(&mut engine);
    engine.next();
    engine.set_value("age", json!(30)).unwrap();

    let receipt = match engine.submit().await {
        SubmitOutcome::Submitted(receipt) => receipt,
        other => panic!("expected submission, got {:?}", other),
    };
    assert!(receipt.reference_id.starts_with("REF-"));
    assert_eq!(receipt.user_id.as_deref(), Some("user-7"));
    assert_eq!(handler.received.lock().unwrap()[0].get("age"), Some(&json!(30)));
    assert!(!engine.is_submitting());

    let view = engine.render();
    assert!(view.is_success());
    assert_eq!(engine.submit().await, SubmitOutcome::AlreadySubmitted);
    assert!(!engine.next());
    assert!(!engine.back());

    engine.close_success();
    assert!(engine.success().is_none());
    assert_eq!(engine.current_step(), 0);
    assert!(engine.completed_steps().is_empty());
    assert_eq!(engine.value("name"), Some(&json!("Ada")));
}

#[tokio::test]
async fn test_failed_submit_stays_on_step() {
    let handler = RecordingHandler::failing();
    let mut engine = FormEngine::builder(wizard())
        .on_submit(handler.clone())
        .build()
        .unwrap();
    fill_account(&mut engine);
    engine.next();

    match engine.submit().await {
        SubmitOutcome::Failed { message } => assert!(message.contains("backend offline")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(engine.current_step(), 1);
    assert!(engine.success().is_none());
    assert!(!engine.is_submitting());
    assert!(engine.last_failure().is_some());
    assert!(!engine.render().is_success());
}

#[test]
fn test_in_flight_submission_blocks_second_submit() {
    let schema = FormSchema::single(
        "c",
        "Contact",
        vec![FormGroup::new("g", vec![FormField::new("msg", "textarea", "Message")])],
    );
    let mut engine = FormEngine::new(schema).unwrap();

    let ticket = engine.begin_submit().unwrap();
    assert!(engine.is_submitting());
    assert!(matches!(engine.begin_submit(), Err(SubmitOutcome::Busy)));
    let page = engine.render();
    assert!(page.as_page().unwrap().actions.busy);
    assert!(!page.as_page().unwrap().actions.can_submit);

    // a torn-down submission releases the gate without touching state
    drop(ticket);
    assert!(!engine.is_submitting());
    assert!(engine.success().is_none());

    let ticket = engine.begin_submit().unwrap();
    assert_eq!(ticket.kind(), SubmissionKind::Submit);
    assert!(matches!(engine.complete_submit(ticket, Ok(())), SubmitOutcome::Submitted(_)));
}

#[test]
fn test_navigation_frozen_while_submitting() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    fill_account(&mut engine);
    assert!(engine.next());

    let ticket = engine.begin_submit().unwrap();
    assert!(!engine.render().as_page().unwrap().actions.can_go_back);
    assert!(!engine.back());
    assert!(!engine.jump_to(0));
    assert_eq!(engine.current_step(), 1);

    assert!(matches!(engine.complete_submit(ticket, Ok(())), SubmitOutcome::Submitted(_)));
    assert!(engine.completed_steps().contains(&0));
    assert!(engine.completed_steps().contains(&1));
}

#[tokio::test]
async fn test_save_skips_validation() {
    let handler = RecordingHandler::default();
    let mut schema = wizard();
    schema.allow_save_and_continue = true;
    let mut engine = FormEngine::builder(schema)
        .on_save(handler.clone())
        .build()
        .unwrap();
    engine.set_value("name", json!("A")).unwrap();

    assert!(matches!(engine.save().await, SaveOutcome::Saved { .. }));
    assert!(engine.last_saved_at().is_some());
    assert!(engine.errors().is_empty());
    assert_eq!(engine.current_step(), 0);
    assert_eq!(handler.received.lock().unwrap()[0].get("name"), Some(&json!("A")));
}

#[tokio::test]
async fn test_save_disabled_by_schema() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    assert_eq!(engine.save().await, SaveOutcome::Disabled);
    assert!(engine.last_saved_at().is_none());
}

#[test]
fn test_set_text_coerces_by_type() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    engine.set_text("age", "42").unwrap();
    assert_eq!(engine.value("age"), Some(&json!(42)));
    engine.set_text("newsletter", "on").unwrap();
    assert_eq!(engine.value("newsletter"), Some(&json!(true)));
}

#[test]
fn test_render_current_step() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    engine.next();
    engine.set_value("email", json!("ada@example.com")).unwrap();
    engine.blur("email").unwrap();

    let view = engine.render();
    let page = view.as_page().unwrap();
    assert_eq!(page.current_step, 0);
    assert_eq!(page.progress_percent, 50);
    assert_eq!(page.steps.len(), 2);
    assert_eq!(page.steps[0].status, StepStatus::Current);
    assert_eq!(page.steps[1].status, StepStatus::Locked);
    assert!(!page.steps[1].clickable);

    // phone is hidden until "phone" is picked
    assert!(page.field("phone").is_none());
    assert!(page.field("email").unwrap().show_success);
    assert!(!page.field("name").unwrap().show_success);

    assert_eq!(page.error_summary.len(), 1);
    assert_eq!(page.error_summary[0].field_id, "name");
    assert_eq!(page.error_summary[0].message, "Name is required");

    assert!(!page.actions.can_go_back);
    assert!(page.actions.can_go_next);
    assert!(!page.actions.can_submit);
    assert!(!page.actions.can_save);
}

#[test]
fn test_render_display_value_for_choices() {
    let mut engine = FormEngine::new(wizard()).unwrap();
    engine.set_value("contact_method", json!("phone")).unwrap();
    let view = engine.render();
    let field = view.as_page().unwrap().field("contact_method").unwrap();
    assert_eq!(field.display_value.as_deref(), Some("Phone"));
    assert!(matches!(&field.control, Control::Radio { options } if options.len() == 2));
}
