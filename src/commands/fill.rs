use std::path::Path;

use super::{engine_builder, print_errors, read_values};
use crate::adapters::{load_draft, remove_draft, FileSink};
use crate::config::{load_form_schema, Settings};
use crate::engine::{FormEngine, SaveOutcome, SubmitOutcome};

pub async fn handle(
    settings: &Settings,
    schema_path: &Path,
    data_path: &Path,
    user_id: Option<String>,
    draft: bool,
) -> anyhow::Result<()> {
    let schema = load_form_schema(schema_path)?;
    let form_id = schema.form_id.clone();
    let out = settings.submissions_path();

    // A saved draft is resumed; the values file wins over it
    let mut initial = load_draft(&out, &form_id, user_id.as_deref())
        .await?
        .unwrap_or_default();
    initial.extend(read_values(data_path)?);

    let mut builder = engine_builder(settings, schema)
        .initial_data(initial)
        .on_submit(FileSink::submissions(&out, &form_id).with_user(user_id.clone()))
        .on_save(FileSink::drafts(&out, &form_id).with_user(user_id.clone()));
    if let Some(user_id) = user_id {
        builder = builder.user_id(user_id);
    }
    let mut engine = builder.build()?;

    if draft {
        return save_draft(&mut engine).await;
    }

    while engine.current_step() + 1 < engine.step_count() {
        if !engine.next() {
            let step = engine.current_step();
            eprintln!("Step {} '{}' is incomplete:", step + 1, engine.schema().step_title(step));
            print_errors(&engine);
            anyhow::bail!("Form '{}' failed validation", form_id);
        }
    }

    match engine.submit().await {
        SubmitOutcome::Submitted(receipt) => {
            remove_draft(&out, &form_id, engine.user_id()).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        SubmitOutcome::Invalid { error_count } => {
            print_errors(&engine);
            anyhow::bail!("Form '{}' has {} invalid field(s)", form_id, error_count)
        }
        SubmitOutcome::Failed { message } => anyhow::bail!("Submission failed: {}", message),
        other => anyhow::bail!("Submission did not complete: {:?}", other),
    }
}

async fn save_draft(engine: &mut FormEngine) -> anyhow::Result<()> {
    match engine.save().await {
        SaveOutcome::Saved { saved_at } => {
            println!("Draft of '{}' saved at {}", engine.schema().form_id, saved_at.to_rfc3339());
            Ok(())
        }
        SaveOutcome::Disabled => {
            anyhow::bail!("Form '{}' does not allow save and continue", engine.schema().form_id)
        }
        SaveOutcome::Failed { message } => anyhow::bail!("Save failed: {}", message),
        SaveOutcome::Busy => anyhow::bail!("Another save is in progress"),
    }
}
