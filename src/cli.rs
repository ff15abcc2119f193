use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Formflow - schema-driven multi-step forms, headless
#[derive(Parser, Debug, Clone)]
#[command(name = "formflow", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "FORMFLOW_CONFIG", default_value = "formflow.toml")]
    pub config: PathBuf,

    /// Log level or filter directive (e.g. "debug", "formflow=trace")
    #[arg(long, env = "FORMFLOW_LOG")]
    pub log_level: Option<String>,

    /// Directory of option-set files
    #[arg(long, env = "FORMFLOW_OPTION_SETS_DIR")]
    pub option_sets_dir: Option<String>,

    /// Directory of form schemas used when `check` is given no files
    #[arg(long, env = "FORMFLOW_SCHEMAS_DIR")]
    pub schemas_dir: Option<String>,

    /// Directory the file sink writes submissions and drafts to
    #[arg(long, env = "FORMFLOW_SUBMISSIONS_DIR")]
    pub submissions_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate form schemas and report every defect
    Check {
        /// Schema files (JSON or YAML); defaults to every file in the schemas directory
        schemas: Vec<PathBuf>,
    },

    /// Print the initial view model of a form as JSON
    Describe {
        schema: PathBuf,

        /// Values to seed the form with
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Fill a form from a JSON values file, step by step, and submit it
    Fill {
        schema: PathBuf,

        /// JSON object of field id to value
        #[arg(short, long)]
        data: PathBuf,

        /// User id recorded on the submission receipt
        #[arg(long, env = "FORMFLOW_USER_ID")]
        user_id: Option<String>,

        /// Save a draft instead of submitting
        #[arg(long)]
        draft: bool,
    },

    /// Print the JSON Schema of the form schema format
    JsonSchema,
}

impl Cli {
    /// Filter directive for the tracing subscriber, when given on the command line
    pub fn log_filter(&self) -> Option<&str> {
        self.log_level.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["formflow", "json-schema"]);
        assert_eq!(cli.config, PathBuf::from("formflow.toml"));
        assert!(cli.log_level.is_none());
        assert!(cli.option_sets_dir.is_none());
        assert!(cli.submissions_dir.is_none());
        assert!(matches!(cli.command, Command::JsonSchema));
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "formflow",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "--option-sets-dir",
            "sets",
            "--submissions-dir",
            "out",
            "fill",
            "signup.yaml",
            "--data",
            "values.json",
            "--user-id",
            "u-1",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.log_filter(), Some("debug"));
        assert_eq!(cli.option_sets_dir, Some("sets".to_string()));
        assert_eq!(cli.submissions_dir, Some("out".to_string()));
        match cli.command {
            Command::Fill {
                schema,
                data,
                user_id,
                draft,
            } => {
                assert_eq!(schema, PathBuf::from("signup.yaml"));
                assert_eq!(data, PathBuf::from("values.json"));
                assert_eq!(user_id, Some("u-1".to_string()));
                assert!(!draft);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_check_accepts_many_schemas() {
        let cli = Cli::parse_from(["formflow", "check", "a.json", "b.yaml"]);
        match cli.command {
            Command::Check { schemas } => assert_eq!(schemas.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["formflow", "check"]);
        assert!(matches!(cli.command, Command::Check { schemas } if schemas.is_empty()));
    }
}
