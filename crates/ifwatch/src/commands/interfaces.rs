//! Interface command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use ifwatch_core::{InterfaceRow, LoadOutcome, Monitor};

use crate::cli::{GlobalOpts, InterfacesArgs, InterfacesCommand, ToggleArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct InterfaceTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl InterfaceTableRow {
    pub(crate) fn new(row: &InterfaceRow, color: bool) -> Self {
        let status = if row.disabled {
            format!("{} (disabled)", output::paint_status(row.status, color))
        } else {
            output::paint_status(row.status, color)
        };
        Self {
            id: row.id.clone(),
            name: row.name.clone(),
            kind: row.kind.clone(),
            status,
            speed: row.speed.clone().unwrap_or_else(|| "-".into()),
            mac: row.mac_address.clone().unwrap_or_else(|| "-".into()),
            rx: row.rx.clone(),
            tx: row.tx.clone(),
            comment: row.comment.clone().unwrap_or_default(),
        }
    }
}

fn detail(r: &InterfaceRow) -> String {
    [
        format!("ID:       {}", r.id),
        format!("Name:     {}", r.name),
        format!("Type:     {}", r.kind),
        format!("Status:   {}", r.status),
        format!("Enabled:  {}", if r.disabled { "no" } else { "yes" }),
        format!("Speed:    {}", r.speed.as_deref().unwrap_or("-")),
        format!("MAC:      {}", r.mac_address.as_deref().unwrap_or("-")),
        format!("RX:       {} ({} bytes)", r.rx, r.rx_bytes),
        format!("TX:       {} ({} bytes)", r.tx, r.tx_bytes),
        format!("Comment:  {}", r.comment.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: Session,
    args: InterfacesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let monitor = super::open(session).await?;
    let result = run(&monitor, args, global).await;
    monitor.shutdown().await;
    result
}

async fn run(monitor: &Monitor, args: InterfacesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        InterfacesCommand::List => {
            let rows = monitor.rows();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| InterfaceTableRow::new(r, color),
                |r| r.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Get { interface } => {
            let found = super::resolve_interface(&monitor.interfaces(), &interface)?;
            let row = InterfaceRow::from(&found);
            let out = output::render_single(&global.output, &row, detail, |r| r.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Enable(toggle_args) => toggle(monitor, &toggle_args, true, global).await,
        InterfacesCommand::Disable(toggle_args) => {
            toggle(monitor, &toggle_args, false, global).await
        }
    }
}

async fn toggle(
    monitor: &Monitor,
    args: &ToggleArgs,
    enable: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = super::resolve_interface(&monitor.interfaces(), &args.interface)?;
    let id = target.id().clone();

    let outcome = monitor.toggle(&id, enable).await?;
    if !global.quiet {
        eprintln!("{}", outcome.message);
    }
    if args.no_wait {
        outcome.detach();
        return Ok(());
    }

    let spinner = settle_spinner(target.name(), global.quiet);
    let reconciled = outcome.reconciled().await;
    spinner.finish_and_clear();

    if let LoadOutcome::Discarded = reconciled? {
        tracing::debug!(interface = %id, "reload after toggle was discarded");
    }

    let current = monitor.interface(&id).ok_or_else(|| CliError::NotFound {
        resource_type: "interface".into(),
        identifier: id.to_string(),
        list_command: "interfaces list".into(),
    })?;
    let row = InterfaceRow::from(&current);
    let out = output::render_single(&global.output, &row, detail, |r| r.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Spinner on stderr while the device settles. Hidden when not interactive.
fn settle_spinner(name: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Re-reading {name}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use ifwatch_core::LinkStatus;

    use super::*;

    fn row(disabled: bool) -> InterfaceRow {
        InterfaceRow {
            id: "1".into(),
            name: "ether1".into(),
            kind: "Physical".into(),
            status: LinkStatus::Down,
            mac_address: None,
            speed: None,
            rx_bytes: 0,
            tx_bytes: 0,
            comment: None,
            disabled,
            rx: "0 B".into(),
            tx: "0 B".into(),
        }
    }

    #[test]
    fn table_row_placeholders() {
        let r = InterfaceTableRow::new(&row(false), false);
        assert_eq!(r.status, "down");
        assert_eq!(r.speed, "-");
        assert_eq!(r.mac, "-");
        assert_eq!(r.rx, "0 B");
        assert_eq!(r.comment, "");
    }

    #[test]
    fn disabled_interfaces_are_marked() {
        let r = InterfaceTableRow::new(&row(true), false);
        assert_eq!(r.status, "down (disabled)");
    }

    #[test]
    fn detail_lists_formatted_counters() {
        let text = detail(&row(false));
        assert!(text.contains("Status:   down"));
        assert!(text.contains("RX:       0 B (0 bytes)"));
        assert!(text.contains("Enabled:  yes"));
    }
}
