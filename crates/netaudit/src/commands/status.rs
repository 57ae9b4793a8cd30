//! `netaudit status`: one fetch, summarized.

use netaudit_core::{Device, Monitor, SystemIndicator, aggregate};
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::devices::DeviceRow;

#[derive(Serialize)]
struct StatusReport {
    indicator: SystemIndicator,
    attack_mode: bool,
    attacker_ip: Option<String>,
    simulating: bool,
    blocked: usize,
    devices: Vec<Device>,
}

fn summary(report: &StatusReport, color: bool) -> String {
    let mut lines = vec![
        format!(
            "Status:    {}",
            output::paint_indicator(report.indicator.level, &report.indicator.label, color)
        ),
        format!("Devices:   {} ({} blocked)", report.devices.len(), report.blocked),
    ];
    if report.attack_mode {
        lines.push(format!(
            "Attack:    engaged by {}",
            report.attacker_ip.as_deref().unwrap_or("unknown")
        ));
    }
    if !report.devices.is_empty() {
        let rows: Vec<DeviceRow> = report.devices.iter().map(|d| DeviceRow::new(d, color)).collect();
        lines.push(String::new());
        lines.push(
            tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string(),
        );
    }
    lines.join("\n")
}

pub async fn handle(monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = monitor.fetch_snapshot().await?;

    // No poller here: the service's own capture-loop flag stands in for "running".
    let indicator = aggregate(snapshot.service_running.unwrap_or(true), Some(&snapshot));
    let report = StatusReport {
        indicator,
        attack_mode: snapshot.attack_mode,
        attacker_ip: snapshot.attacker_ip.clone(),
        simulating: snapshot.simulating,
        blocked: snapshot.blocked_count(),
        devices: snapshot.devices,
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| summary(r, color),
        |r| r.indicator.label.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
