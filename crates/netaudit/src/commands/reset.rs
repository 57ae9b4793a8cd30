//! `netaudit reset`: clear the audit service's state.

use netaudit_core::Monitor;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    monitor.reset().await?;
    if !global.quiet {
        eprintln!("Audit service state reset");
    }
    Ok(())
}
