//! Providers command implementation.

use crate::error::Result;
use crate::output::Formatter;

/// Execute the providers command.
pub fn execute_providers(formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_providers()?);
    Ok(())
}
