//! Live view: redraw the interface table on every store change.

use std::io::IsTerminal;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use ifwatch_core::{InterfaceRow, Monitor, Notice, StoreState};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::interfaces::InterfaceTableRow;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub async fn handle(session: Session, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = session.monitor;
    if let Some(interval) = args.interval {
        config.poll_interval = interval;
    }
    if config.poll_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "watch needs a poll interval greater than zero".into(),
        });
    }

    let monitor = Monitor::connect(config)?;
    let result = watch(&monitor, session.device, global).await;
    monitor.shutdown().await;
    result
}

async fn watch(
    monitor: &Monitor,
    device: ifwatch_core::DeviceId,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut stream = monitor.subscribe();
    let mut notices = monitor.notices();
    monitor.select_device(Some(device)).await;

    let view = View::new(global);
    let mut last_notice: Option<Notice> = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = stream.changed() => {
                if changed.is_none() {
                    break;
                }
                let state = stream.state();
                view.draw(&state, last_notice.as_ref())?;
            }
            notice = notices.recv() => match notice {
                Ok(notice) => {
                    last_notice = Some(notice);
                    view.draw(&stream.state(), last_notice.as_ref())?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "notice receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}

struct View<'a> {
    global: &'a GlobalOpts,
    color: bool,
    redraw: bool,
}

impl<'a> View<'a> {
    fn new(global: &'a GlobalOpts) -> Self {
        let interactive = std::io::stdout().is_terminal();
        Self {
            global,
            color: output::should_color(&global.color),
            redraw: interactive && matches!(global.output, OutputFormat::Table),
        }
    }

    fn draw(&self, state: &StoreState, notice: Option<&Notice>) -> Result<(), CliError> {
        if self.global.quiet {
            return Ok(());
        }
        // Selection was cleared or not yet loaded
        if state.device.is_none() || (state.last_refresh.is_none() && notice.is_none()) {
            return Ok(());
        }

        let rows: Vec<InterfaceRow> = state.interfaces.iter().map(InterfaceRow::from).collect();
        let table = output::render_list(
            &self.global.output,
            &rows,
            |r| InterfaceTableRow::new(r, self.color),
            |r| r.id.clone(),
        )?;

        if !self.redraw {
            // Streaming formats: one document per change, notices on stderr
            if let Some(n) = notice {
                eprintln!("{}", output::paint_notice(n, false));
            }
            output::print_output(&table, false);
            return Ok(());
        }

        let mut screen = String::from(CLEAR_SCREEN);
        screen.push_str(&header(state));
        screen.push('\n');
        screen.push_str(&table);
        if let Some(n) = notice {
            screen.push('\n');
            screen.push_str(&output::paint_notice(n, self.color));
        }
        screen.push_str("\nPress Ctrl-C to quit.");
        output::print_output(&screen, false);
        Ok(())
    }
}

fn header(state: &StoreState) -> String {
    let device = state
        .device
        .as_ref()
        .map_or_else(|| "-".into(), ToString::to_string);
    let age = state.last_refresh.map_or_else(
        || "never".into(),
        |at| {
            let secs = u64::try_from((chrono::Utc::now() - at).num_seconds()).unwrap_or(0);
            format!("{} ago", humantime::format_duration(Duration::from_secs(secs)))
        },
    );
    let stale = if state.stale { " (stale)" } else { "" };
    format!(
        "Device {device}: {} interfaces, updated {age}{stale}",
        state.interfaces.len()
    )
}

#[cfg(test)]
mod tests {
    use ifwatch_core::DeviceId;

    use super::*;

    #[test]
    fn header_without_refresh() {
        let mut state = StoreState::default();
        state.device = Some(DeviceId::from("7"));
        assert_eq!(header(&state), "Device 7: 0 interfaces, updated never");
    }

    #[test]
    fn header_marks_stale_data() {
        let mut state = StoreState::default();
        state.device = Some(DeviceId::from("7"));
        state.stale = true;
        state.last_refresh = Some(chrono::Utc::now());
        let text = header(&state);
        assert!(text.ends_with("(stale)"), "{text}");
        assert!(text.contains("ago"), "{text}");
    }
}
