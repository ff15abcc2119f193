use clap::Parser;
use formflow::cli::Cli;
use formflow::commands;
use formflow::config::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;

    // Initialize tracing: --log-level, then RUST_LOG, then the config file
    let filter = match cli.log_filter() {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.logging.level))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Loaded {} option set file(s)", settings.option_sets.len());

    commands::run(&cli, &settings).await
}
