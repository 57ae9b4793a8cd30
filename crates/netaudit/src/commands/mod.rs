//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod devices;
pub mod reset;
pub mod status;
pub mod watch;

use netaudit_core::Monitor;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(monitor, global).await,
        Command::Devices(args) => devices::handle(monitor, args, global).await,
        Command::Watch(args) => watch::handle(monitor, args, global).await,
        Command::Reset => reset::handle(monitor, global).await,
        Command::Config(_) | Command::Completions(_) => unreachable!("handled before connecting"),
    }
}
