use std::path::Path;

use super::{engine_builder, read_values};
use crate::config::{load_form_schema, Settings};

pub fn handle(settings: &Settings, schema_path: &Path, data: Option<&Path>) -> anyhow::Result<()> {
    let schema = load_form_schema(schema_path)?;
    let mut builder = engine_builder(settings, schema);
    if let Some(path) = data {
        builder = builder.initial_data(read_values(path)?);
    }
    let engine = builder.build()?;

    println!("{}", serde_json::to_string_pretty(&engine.render())?);
    Ok(())
}
