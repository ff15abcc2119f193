use anyhow::Context;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;
use crate::domain::FormSchema;
use crate::options::{InMemoryOptionSets, OptionSetConfig};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub engine: EngineSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
    /// Option sets read from `engine.option_sets_dir`
    #[serde(default, skip_serializing)]
    pub option_sets: Vec<OptionSetConfig>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Directory of option-set files (`*.json`, `*.yaml`, `*.yml`)
    pub option_sets_dir: String,
    /// Directory of form schema files
    pub schemas_dir: String,
    /// Register the built-in option sets before the file-based ones
    pub builtin_option_sets: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Where the file sink writes submissions and drafts
    pub submissions_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file, then CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let config_path = &cli.config;
        let root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let s = Self::builder(config_path.clone())?;
        let mut settings: Settings = s.try_deserialize()?;
        settings.root = root;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.load_external_configs()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("formflow");
        let s = Self::builder(config_path)?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.root = PathBuf::from(root);

        settings.load_external_configs()?;
        settings.validate()?;

        Ok(settings)
    }

    fn builder(config_path: PathBuf) -> Result<Config, anyhow::Error> {
        Ok(Config::builder()
            .add_source(File::from(config_path).required(false))
            .set_default("engine.option_sets_dir", "option_sets")?
            .set_default("engine.schemas_dir", "forms")?
            .set_default("engine.builtin_option_sets", true)?
            .set_default("output.submissions_dir", "submissions")?
            .set_default("logging.level", "info")?
            .build()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.option_sets_dir {
            self.engine.option_sets_dir = dir.clone();
        }
        if let Some(dir) = &cli.schemas_dir {
            self.engine.schemas_dir = dir.clone();
        }
        if let Some(dir) = &cli.submissions_dir {
            self.output.submissions_dir = dir.clone();
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::SettingsValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Configuration validation failed:\n{}", error_messages.join("\n"))
        })
    }

    fn load_external_configs(&mut self) -> Result<(), anyhow::Error> {
        let dir = self.option_sets_path();
        self.load_option_sets_from_dir(&dir)
    }

    fn load_option_sets_from_dir(&mut self, dir: &Path) -> Result<(), anyhow::Error> {
        let pattern = format!("{}/*", dir.display());
        let mut entries: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Failed to read glob entry: {}", e);
                    None
                }
            })
            .collect();
        entries.sort();

        for path in entries {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if matches!(ext, "json" | "yaml" | "yml") {
                    let content = std::fs::read_to_string(&path)?;
                    let set: OptionSetConfig = if ext == "json" {
                        serde_json::from_str(&content)
                            .with_context(|| format!("Invalid option set {}", path.display()))?
                    } else {
                        serde_yaml::from_str(&content)
                            .with_context(|| format!("Invalid option set {}", path.display()))?
                    };
                    tracing::debug!("Loaded option set '{}' from {}", set.name, path.display());
                    self.option_sets.push(set);
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, dir: &str) -> PathBuf {
        let path = Path::new(dir);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn option_sets_path(&self) -> PathBuf {
        self.resolve(&self.engine.option_sets_dir)
    }

    pub fn schemas_path(&self) -> PathBuf {
        self.resolve(&self.engine.schemas_dir)
    }

    pub fn submissions_path(&self) -> PathBuf {
        self.resolve(&self.output.submissions_dir)
    }

    /// Registry to hand to the engine: built-ins (if enabled) overlaid with
    /// the file-based sets
    pub fn option_set_registry(&self) -> InMemoryOptionSets {
        let mut registry = if self.engine.builtin_option_sets {
            InMemoryOptionSets::with_builtin()
        } else {
            InMemoryOptionSets::new()
        };
        for set in &self.option_sets {
            registry.insert(set.clone());
        }
        registry
    }
}

/// Load a form schema, picking the decoder from the file extension
pub fn load_form_schema(path: &Path) -> Result<FormSchema, anyhow::Error> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    let schema = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => FormSchema::from_yaml_str(&content),
        _ => FormSchema::from_json_str(&content),
    };
    schema.with_context(|| format!("Failed to load schema {}", path.display()))
}

/// Schema files (`*.json`, `*.yaml`, `*.yml`) in `dir`, in path order
pub fn schema_files_in_dir(dir: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
    let pattern = format!("{}/*", dir.display());
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => {
                if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                    if matches!(ext, "json" | "yaml" | "yml") {
                        files.push(path);
                    }
                }
            }
            Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

/// Every schema file in `dir`, in path order
pub fn load_schemas_from_dir(dir: &Path) -> Result<Vec<(PathBuf, FormSchema)>, anyhow::Error> {
    schema_files_in_dir(dir)?
        .into_iter()
        .map(|path| {
            let schema = load_form_schema(&path)?;
            Ok((path, schema))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crate::options::OptionSetProvider;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_str().unwrap_or(".");
        let settings = Settings::from_root(root)?;

        assert_eq!(settings.engine.option_sets_dir, "option_sets");
        assert_eq!(settings.engine.schemas_dir, "forms");
        assert!(settings.engine.builtin_option_sets);
        assert_eq!(settings.output.submissions_dir, "submissions");
        assert_eq!(settings.logging.level, "info");
        assert!(settings.option_sets.is_empty());
        assert_eq!(settings.submissions_path(), temp_dir.path().join("submissions"));
        Ok(())
    }

    #[test]
    fn test_cli_overrides_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("formflow.toml");
        fs::write(
            &config_path,
            r#"
[output]
submissions_dir = "from-file"

[logging]
level = "debug"
"#,
        )?;

        let cli = Cli::parse_from([
            "formflow",
            "--config",
            config_path.to_str().unwrap_or_default(),
            "--submissions-dir",
            "from-cli",
            "check",
            "form.json",
        ]);
        let settings = Settings::new_with_cli(&cli)?;
        assert_eq!(settings.output.submissions_dir, "from-cli");
        assert_eq!(settings.logging.level, "debug");
        Ok(())
    }

    #[test]
    fn test_file_option_sets_override_builtin() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let dir = temp_dir.path().join("option_sets");
        fs::create_dir_all(&dir)?;
        fs::write(
            dir.join("yes_no.yaml"),
            "name: yes_no\noptions:\n  - value: Y\n    label: Yep\n",
        )?;

        let settings = Settings::from_root(temp_dir.path().to_str().unwrap_or("."))?;
        let registry = settings.option_set_registry();
        let options = registry.resolve("yes_no").unwrap_or_default();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "Yep");
        assert!(registry.resolve("countries").is_some());
        Ok(())
    }

    #[test]
    fn test_load_form_schema_by_extension() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let yaml = temp_dir.path().join("contact.yaml");
        fs::write(
            &yaml,
            r#"
formId: contact
formTitle: Contact
groups:
  - title: Main
    fields:
      - id: name
        type: text
        label: Name
        required: true
"#,
        )?;
        fs::write(temp_dir.path().join("notes.txt"), "ignored")?;

        let schema = load_form_schema(&yaml)?;
        assert_eq!(schema.form_id, "contact");
        assert!(schema.field("name").is_some_and(|f| f.required));

        let all = load_schemas_from_dir(temp_dir.path())?;
        assert_eq!(all.len(), 1);
        Ok(())
    }
}
