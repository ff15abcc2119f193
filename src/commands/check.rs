use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::{load_form_schema, schema_files_in_dir, Settings};
use crate::domain::FormSchema;
use crate::engine::SchemaValidator;
use crate::options::OptionSetProvider;

pub fn handle(settings: &Settings, schemas: &[PathBuf]) -> anyhow::Result<()> {
    let targets = if schemas.is_empty() {
        let dir = settings.schemas_path();
        tracing::info!("Checking schemas in {}", dir.display());
        schema_files_in_dir(&dir)?
    } else {
        schemas.to_vec()
    };

    if targets.is_empty() {
        anyhow::bail!("No schema files to check");
    }

    let registry = settings.option_set_registry();
    let known: BTreeSet<String> = registry.names().into_iter().collect();
    let mut failed = 0;

    for path in &targets {
        if !check_one(path, &known) {
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} schema(s) failed validation", failed, targets.len());
    }
    println!("{} schema(s) OK", targets.len());
    Ok(())
}

fn check_one(path: &Path, known_sets: &BTreeSet<String>) -> bool {
    let schema = match load_form_schema(path) {
        Ok(schema) => schema,
        Err(e) => {
            println!("FAIL {}: {:#}", path.display(), e);
            return false;
        }
    };

    let result = SchemaValidator::validate(&schema);
    match &result {
        Ok(()) => println!("ok   {} ({})", path.display(), schema.form_id),
        Err(errors) => {
            println!("FAIL {} ({})", path.display(), schema.form_id);
            for error in errors {
                println!("  - {}", error);
            }
        }
    }

    for (field, key) in unknown_option_sets(&schema, known_sets) {
        println!("  warning: field '{}' uses unknown option set '{}'", field, key);
    }

    result.is_ok()
}

/// Fields whose `globalOptionSet` is not registered; they render with no options
fn unknown_option_sets(schema: &FormSchema, known_sets: &BTreeSet<String>) -> Vec<(String, String)> {
    schema
        .all_fields()
        .filter_map(|f| {
            f.global_option_set
                .as_ref()
                .filter(|key| !known_sets.contains(*key))
                .map(|key| (f.id.clone(), key.clone()))
        })
        .collect()
}
