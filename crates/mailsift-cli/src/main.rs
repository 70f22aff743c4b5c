//! MailSift CLI - Command-line interface for inbox prioritization.

use clap::Parser;
use mailsift_cli::commands;
use mailsift_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> mailsift_cli::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let mut config = Config::load(config_path)?;

    let format = cli.format.map(Into::into).unwrap_or(config.output.format);
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);
    let api_key = cli.api_key.as_deref();

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, &config, api_key, &formatter).await?;
        }
        Command::Score(args) => {
            commands::execute_score(args, &config, &formatter).await?;
        }
        Command::Summarize(args) => {
            commands::execute_summarize(args, &config, api_key, &formatter).await?;
        }
        Command::Providers => {
            commands::execute_providers(&formatter)?;
        }
        Command::Keywords(args) => {
            commands::execute_keywords(args, &mut config, config_path, &formatter)?;
        }
        Command::Consent(args) => {
            commands::execute_consent(args, &mut config, config_path, format, &formatter)?;
        }
    }

    Ok(())
}
