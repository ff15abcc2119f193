//! Subcommands of the `formflow` binary

pub mod check;
pub mod describe;
pub mod fill;
pub mod json_schema;

use std::path::Path;
use std::sync::Arc;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::domain::{FormSchema, FormValues};
use crate::engine::{FormEngine, FormEngineBuilder};

pub async fn run(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    match &cli.command {
        Command::Check { schemas } => check::handle(settings, schemas),
        Command::Describe { schema, data } => describe::handle(settings, schema, data.as_deref()),
        Command::Fill {
            schema,
            data,
            user_id,
            draft,
        } => fill::handle(settings, schema, data, user_id.clone(), *draft).await,
        Command::JsonSchema => json_schema::handle(),
    }
}

/// Engine builder wired to the configured option sets
fn engine_builder(settings: &Settings, schema: FormSchema) -> FormEngineBuilder {
    FormEngine::builder(schema).option_sets(Arc::new(settings.option_set_registry()))
}

/// Read a JSON object of field id to value
fn read_values(path: &Path) -> anyhow::Result<FormValues> {
    let content = std::fs::read_to_string(path)?;
    let values: FormValues = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{} is not a JSON object of values: {}", path.display(), e))?;
    Ok(values)
}

/// Print the error summary of the engine's current page
fn print_errors(engine: &FormEngine) {
    if let Some(page) = engine.render().as_page() {
        for item in &page.error_summary {
            eprintln!("  - {}: {}", item.label, item.message);
        }
    }
}
