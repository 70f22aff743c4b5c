//! Command implementations.

pub mod consent;
pub mod keywords;
pub mod providers;
pub mod run;
pub mod score;
pub mod summarize;

pub use self::consent::execute_consent;
pub use self::keywords::execute_keywords;
pub use self::providers::execute_providers;
pub use self::run::execute_run;
pub use self::score::execute_score;
pub use self::summarize::execute_summarize;

use crate::error::Result;
use mailsift_extractor::SnapshotTree;
use std::fs;
use std::path::Path;

/// Read a JSON inbox snapshot.
pub fn load_snapshot(path: &Path) -> Result<SnapshotTree> {
    let contents = fs::read_to_string(path)?;
    Ok(SnapshotTree::from_json(&contents)?)
}
