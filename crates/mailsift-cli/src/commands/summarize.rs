//! Summarize command implementation.

use crate::cli::SummarizeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use mailsift_domain::ConsentGate;
use mailsift_summarizer::SummarizationClient;

/// Execute the summarize command.
pub async fn execute_summarize(
    args: SummarizeArgs,
    config: &Config,
    api_key: Option<&str>,
    formatter: &Formatter,
) -> Result<()> {
    let consent = ConsentGate::new(config.consent.given || args.yes);
    let client = SummarizationClient::new(config.provider(api_key)?, consent);

    let mut options = client.config().default_options.clone();
    if let Some(max_length) = args.max_length {
        if max_length == 0 {
            return Err(CliError::InvalidInput(
                "max-length must be greater than 0".to_string(),
            ));
        }
        options.max_length = max_length;
    }
    if let Some(style) = args.style {
        options.style = style;
    }

    let outcome = client.summarize_detailed(&args.text, Some(options)).await?;
    println!("{}", formatter.format_summary(&outcome)?);
    Ok(())
}
