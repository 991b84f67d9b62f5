//! Command dispatch: bridges CLI args -> monitor operations -> output formatting.

pub mod config_cmd;
pub mod interfaces;
pub mod watch;

use std::time::Duration;

use ifwatch_core::{Interface, Monitor};

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Interfaces(args) => interfaces::handle(session, args, global).await,
        Command::Watch(args) => watch::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not need a device session".into(),
        }),
    }
}

/// Connect with polling disabled, select the session device and load it once.
///
/// On load failure the monitor is shut down before the error is returned.
pub(crate) async fn open(session: Session) -> Result<Monitor, CliError> {
    let mut config = session.monitor;
    config.poll_interval = Duration::ZERO;

    let monitor = Monitor::connect(config)?;
    monitor.select_device(Some(session.device)).await;
    if let Err(e) = monitor.refresh().await {
        monitor.shutdown().await;
        return Err(e.into());
    }
    Ok(monitor)
}

/// Find an interface by id, falling back to its name.
pub(crate) fn resolve_interface(
    interfaces: &[std::sync::Arc<Interface>],
    identifier: &str,
) -> Result<std::sync::Arc<Interface>, CliError> {
    interfaces
        .iter()
        .find(|i| i.id().as_str() == identifier)
        .or_else(|| interfaces.iter().find(|i| i.name() == identifier))
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "interface".into(),
            identifier: identifier.into(),
            list_command: "interfaces list".into(),
        })
}
