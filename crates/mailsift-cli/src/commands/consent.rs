//! Consent command implementation.

use crate::cli::{ConsentAction, ConsentArgs};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use chrono::{SecondsFormat, Utc};
use std::path::Path;

/// Execute the consent command.
pub fn execute_consent(
    args: ConsentArgs,
    config: &mut Config,
    path: Option<&Path>,
    format: OutputFormat,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConsentAction::Grant => {
            config.grant_consent(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
            config.save(path)?;
            println!("{}", formatter.success("Summarization consent granted"));
        }
        ConsentAction::Decline => {
            config.decline_consent();
            config.save(path)?;
            println!(
                "{}",
                formatter.success("Summarization consent declined; summaries are off")
            );
        }
        ConsentAction::Show => match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "consent_given": config.consent.given,
                        "granted_at": config.consent.granted_at,
                        "summarization_enabled": config.features.summarization_enabled,
                    }))?
                );
            }
            OutputFormat::Table => {
                let state = if config.consent.given { "granted" } else { "not granted" };
                println!("Consent: {}", state);
                if let Some(granted_at) = &config.consent.granted_at {
                    println!("Granted at: {}", granted_at);
                }
                println!(
                    "Summarization: {}",
                    if config.features.summarization_enabled { "on" } else { "off" }
                );
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_then_decline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut config = Config::default();

        let grant = ConsentArgs {
            action: ConsentAction::Grant,
        };
        execute_consent(grant, &mut config, Some(&path), OutputFormat::Table, &formatter).unwrap();
        let saved = Config::load(Some(&path)).unwrap();
        assert!(saved.consent.given);
        assert!(saved.consent.granted_at.is_some());

        let decline = ConsentArgs {
            action: ConsentAction::Decline,
        };
        execute_consent(decline, &mut config, Some(&path), OutputFormat::Table, &formatter).unwrap();
        let saved = Config::load(Some(&path)).unwrap();
        assert!(!saved.consent.given);
        assert!(!saved.features.summarization_enabled);
    }
}
