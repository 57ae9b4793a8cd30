//! `netaudit watch`: run the poller and stream audit log entries.

use chrono::Local;
use netaudit_core::{DashboardState, DetailView, LogEntry, Monitor, PollerState};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::devices;

/// Per-session bookkeeping of what has already been printed.
struct WatchView {
    seen: u64,
    indicator: Option<String>,
    detail: Option<DetailView>,
    waiting_noted: bool,
    color: bool,
}

impl WatchView {
    fn render_entry(&self, entry: &LogEntry, format: &OutputFormat) -> String {
        let rendered = output::render_single(
            format,
            entry,
            |e| {
                let stamp = e.timestamp.with_timezone(&Local).format("%H:%M:%S");
                let line = format!("{stamp} [{:<8}] {}", e.severity, e.message);
                output::paint_severity(e.severity, &line, self.color)
            },
            |e| e.message.clone(),
        );
        // One YAML document per entry keeps the stream parseable.
        match format {
            OutputFormat::Yaml => format!("---\n{}", rendered.trim_end()),
            _ => rendered,
        }
    }

    fn render_detail(&self, view: &DetailView) -> String {
        let header = match view.stale_since() {
            Some(since) => format!(
                "── {} (stale: not reported since {}) ──",
                view.ip(),
                since.with_timezone(&Local).format("%H:%M:%S")
            ),
            None => format!("── {} ──", view.ip()),
        };
        format!("{header}\n{}", devices::detail(view.device(), self.color))
    }

    /// Lines for everything in `state` not printed yet.
    fn update(&mut self, state: &DashboardState, global: &GlobalOpts) -> Vec<String> {
        let mut lines: Vec<String> = state
            .log()
            .since(self.seen)
            .map(|e| self.render_entry(e, &global.output))
            .collect();
        self.seen = state.log().total_appended();

        if matches!(global.output, OutputFormat::Table) {
            let indicator = state.indicator();
            if self.indicator.as_deref() != Some(indicator.label.as_str()) {
                lines.push(format!(
                    "System: {}",
                    output::paint_indicator(indicator.level, &indicator.label, self.color)
                ));
                self.indicator = Some(indicator.label);
            }

            if let Some(view) = state.detail() {
                if self.detail.as_ref() != Some(view) {
                    lines.push(self.render_detail(view));
                    self.detail = Some(view.clone());
                }
            }
        }
        lines
    }
}

pub async fn handle(monitor: &Monitor, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut rx = monitor.subscribe();
    let mut view = WatchView {
        seen: rx.borrow().log().total_appended(),
        indicator: None,
        detail: None,
        waiting_noted: false,
        color: output::should_color(&global.color),
    };

    monitor.start().await;
    if !global.quiet {
        eprintln!(
            "Watching {} every {} ms (Ctrl-C to stop)",
            monitor.config().url,
            monitor.config().poll_interval.as_millis()
        );
    }

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            changed = rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = rx.borrow_and_update().clone();

                if let Some(ip) = args.follow {
                    if state.detail().is_none() {
                        match state.snapshot() {
                            Some(snap) if snap.contains(ip) => {
                                if let Err(e) = monitor.open_detail(ip) {
                                    tracing::debug!(error = %e, "could not open detail view");
                                }
                            }
                            Some(_) if !view.waiting_noted && !global.quiet => {
                                eprintln!("Device {ip} is not reported yet; waiting for it to appear");
                                view.waiting_noted = true;
                            }
                            _ => {}
                        }
                    }
                }

                for line in view.update(&state, global) {
                    output::print_output(&line, global.quiet);
                }

                if let PollerState::Disconnected { reason } = state.poller() {
                    break Err(CliError::Disconnected { reason: reason.clone() });
                }
            }
        }
    };

    monitor.stop().await;
    monitor.close_detail();
    result
}
