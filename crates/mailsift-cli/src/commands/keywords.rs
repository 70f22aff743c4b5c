//! Keywords command implementation.

use crate::cli::{KeywordsAction, KeywordsArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use mailsift_domain::KeywordSet;
use std::path::Path;

/// Execute the keywords command.
pub fn execute_keywords(
    args: KeywordsArgs,
    config: &mut Config,
    path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        KeywordsAction::List => {
            println!("{}", formatter.format_keywords(&config.keywords)?);
            return Ok(());
        }
        KeywordsAction::Add { keyword } => {
            let (mut set, _) = config.keyword_set();
            set.try_insert(&keyword)
                .map_err(|e| CliError::InvalidInput(format!("'{}': {}", keyword, e)))?;
            config.keywords = set.to_vec();
            config.save(path)?;
            println!("{}", formatter.success(&format!("Added keyword '{}'", keyword.trim())));
        }
        KeywordsAction::Remove { keyword } => {
            let (mut set, _) = config.keyword_set();
            if !set.remove(&keyword) {
                return Err(CliError::InvalidInput(format!(
                    "Keyword '{}' not found",
                    keyword
                )));
            }
            config.keywords = set.to_vec();
            config.save(path)?;
            println!("{}", formatter.success(&format!("Removed keyword '{}'", keyword)));
        }
        KeywordsAction::Reset => {
            config.keywords = KeywordSet::defaults().to_vec();
            config.save(path)?;
            println!("{}", formatter.success("Restored default keywords"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_add_and_remove_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut config = Config::default();

        let add = KeywordsArgs {
            action: KeywordsAction::Add {
                keyword: " Invoice ".to_string(),
            },
        };
        execute_keywords(add, &mut config, Some(&path), &formatter).unwrap();
        assert!(Config::load(Some(&path)).unwrap().keywords.contains(&"Invoice".to_string()));

        let remove = KeywordsArgs {
            action: KeywordsAction::Remove {
                keyword: "URGENT".to_string(),
            },
        };
        execute_keywords(remove, &mut config, Some(&path), &formatter).unwrap();
        let saved = Config::load(Some(&path)).unwrap();
        assert!(!saved.keywords.iter().any(|k| k == "urgent"));
        assert_eq!(saved.keywords.len(), 4);
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut config = Config::default();

        let add = KeywordsArgs {
            action: KeywordsAction::Add {
                keyword: "Meeting".to_string(),
            },
        };
        let result = execute_keywords(add, &mut config, Some(&path), &formatter);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
        assert!(!path.exists());
    }
}
