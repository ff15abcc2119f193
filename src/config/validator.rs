use std::collections::HashSet;
use thiserror::Error;

use crate::config::{EngineSettings, LoggingSettings, OutputSettings, Settings};
use crate::options::OptionSetConfig;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct SettingsValidator;

impl SettingsValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_engine(&settings.engine) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_output(&settings.output) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_logging(&settings.logging) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_option_sets(&settings.option_sets) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_engine(engine: &EngineSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if engine.option_sets_dir.trim().is_empty() {
            errors.push(ValidationError::MissingField("engine.option_sets_dir".to_string()));
        }

        if engine.schemas_dir.trim().is_empty() {
            errors.push(ValidationError::MissingField("engine.schemas_dir".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_output(output: &OutputSettings) -> Result<(), Vec<ValidationError>> {
        if output.submissions_dir.trim().is_empty() {
            return Err(vec![ValidationError::MissingField(
                "output.submissions_dir".to_string(),
            )]);
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingSettings) -> Result<(), Vec<ValidationError>> {
        // Full filter directives such as "formflow=debug" are accepted too
        let level = logging.level.trim().to_ascii_lowercase();
        if level.is_empty() || (!LOG_LEVELS.contains(&level.as_str()) && !level.contains('=')) {
            return Err(vec![ValidationError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Unknown log level '{}'", logging.level),
            }]);
        }
        Ok(())
    }

    fn validate_option_sets(sets: &[OptionSetConfig]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for (index, set) in sets.iter().enumerate() {
            if set.name.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!("option_sets[{}].name", index)));
                continue;
            }

            if !names.insert(set.name.as_str()) {
                errors.push(ValidationError::Duplicate(format!(
                    "Option set name '{}'",
                    set.name
                )));
            }

            let mut values = HashSet::new();
            for option in &set.options {
                if option.value.is_empty() {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("option_sets.{}", set.name),
                        reason: format!("Option '{}' has an empty value", option.label),
                    });
                } else if !values.insert(option.value.as_str()) {
                    errors.push(ValidationError::Duplicate(format!(
                        "Option value '{}' in set '{}'",
                        option.value, set.name
                    )));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
