//! Device command handlers.

use netaudit_core::{Device, DeviceAction, DeviceStatus, Monitor};
use tabled::Tabled;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Name")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Rate")]
    rate: u64,
    #[tabled(rename = "Limit")]
    limit: u64,
    #[tabled(rename = "Packets")]
    packets: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Port")]
    port: String,
}

impl DeviceRow {
    pub(crate) fn new(d: &Device, color: bool) -> Self {
        Self {
            ip: d.ip.to_string(),
            id: d.id.clone(),
            status: output::paint_status(d.status, color),
            rate: d.current_rate(),
            limit: d.packet_limit,
            packets: d.packet_count.map_or_else(|| "N/A".into(), |n| n.to_string()),
            protocol: d.protocol_label().to_owned(),
            port: d
                .identity
                .last_port
                .map_or_else(|| "N/A".into(), |p| p.to_string()),
        }
    }
}

pub(crate) fn detail(d: &Device, color: bool) -> String {
    let na = |v: Option<&str>| v.unwrap_or("N/A").to_owned();
    let history = d
        .recent_packet_history
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    [
        format!("Name:         {}", d.id),
        format!("IP:           {}", d.ip),
        format!("Status:       {}", output::paint_status(d.status, color)),
        format!("Rate:         {} packets in window", d.current_rate()),
        format!("Window:       [{history}]"),
        format!("Limit:        {}", d.packet_limit),
        format!(
            "Packets:      {}",
            d.packet_count.map_or_else(|| "N/A".into(), |n| n.to_string())
        ),
        format!("Protocol:     {}", d.protocol_label()),
        format!(
            "Port:         {}",
            d.identity
                .last_port
                .map_or_else(|| "N/A".into(), |p| p.to_string())
        ),
        format!("Local:        {}", if d.identity.is_local { "yes" } else { "no" }),
        format!("MAC:          {}", na(d.identity.mac_address.as_deref())),
        format!("Manufacturer: {}", na(d.identity.manufacturer.as_deref())),
        format!("Type:         {}", na(d.identity.device_type.as_deref())),
        format!("OS:           {}", na(d.identity.os_fingerprint.as_deref())),
        format!("Last domain:  {}", na(d.identity.last_visited_domain.as_deref())),
    ]
    .join("\n")
}

fn parse_status_filter(raw: &str) -> Result<DeviceStatus, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "status".into(),
        reason: format!("expected connected, alert, blocked or unknown, got '{raw}'"),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(monitor: &Monitor, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DevicesCommand::List { status } => {
            let filter = status.as_deref().map(parse_status_filter).transpose()?;
            let snapshot = monitor.fetch_snapshot().await?;
            let devices: Vec<Device> = snapshot
                .devices
                .into_iter()
                .filter(|d| filter.is_none_or(|s| d.status == s))
                .collect();

            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.ip.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { ip } => {
            let snapshot = monitor.fetch_snapshot().await?;
            let device = snapshot.device(ip).ok_or_else(|| CliError::NotFound {
                resource_type: "device".into(),
                identifier: ip.to_string(),
                list_command: "devices list".into(),
            })?;
            let out = output::render_single(
                &global.output,
                device,
                |d| detail(d, color),
                |d| d.ip.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Block { ip } => {
            monitor.dispatch(ip, DeviceAction::Block).await?;
            if !global.quiet {
                eprintln!("Device {ip} blocked");
            }
            Ok(())
        }

        DevicesCommand::Unblock { ip } => {
            monitor.dispatch(ip, DeviceAction::Unblock).await?;
            if !global.quiet {
                eprintln!("Device {ip} unblocked");
            }
            Ok(())
        }

        DevicesCommand::Limit { ip, limit } => {
            let patch = monitor.dispatch(ip, DeviceAction::Limit(limit)).await?;
            if !global.quiet {
                let applied = patch.packet_limit.unwrap_or(limit);
                eprintln!("Packet limit for {ip} set to {applied}");
            }
            Ok(())
        }
    }
}
