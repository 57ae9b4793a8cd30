// ── Snapshot reconciliation ──
//
// Diffs two consecutive snapshots and reports each security-relevant
// transition exactly once. Pure: the output depends only on the two
// snapshots and the supplied timestamp.

use chrono::{DateTime, Utc};

use crate::model::{Device, DeviceStatus, LogEntry, Snapshot};

/// Compare `previous` (if any) against `next` and return the log entries
/// for every edge-triggered transition, in a stable order: per-device
/// transitions in `next` order, then disappearances in `previous` order,
/// then service-wide flag changes.
///
/// A device that stays in the same status produces nothing, however many
/// polls it spans. With no `previous` (first poll, or after a reset) only
/// devices that are already blocked are reported.
pub fn reconcile(previous: Option<&Snapshot>, next: &Snapshot, at: DateTime<Utc>) -> Vec<LogEntry> {
    let mut entries = Vec::new();

    for device in &next.devices {
        let prior = previous.and_then(|p| p.device(device.ip));

        if prior.is_none() && previous.is_some() && !device.is_blocked() {
            entries.push(LogEntry::normal(
                format!("New device {} ({}) detected", device.id, device.ip),
                at,
            ));
        }

        if previous.is_none() && !device.is_blocked() {
            continue;
        }

        let prior_status = prior.map(|d| d.status);
        if let Some(entry) = status_transition(prior_status, device, at) {
            entries.push(entry);
        }
    }

    if let Some(prev) = previous {
        for gone in prev.devices.iter().filter(|d| !next.contains(d.ip)) {
            entries.push(LogEntry::normal(
                format!("{} ({}) is no longer reported", gone.id, gone.ip),
                at,
            ));
        }
    }

    entries.extend(service_transitions(previous, next, at));
    entries
}

/// The single entry (if any) for a status edge on one device.
fn status_transition(prior: Option<DeviceStatus>, device: &Device, at: DateTime<Utc>) -> Option<LogEntry> {
    if prior == Some(device.status) {
        return None;
    }

    match (prior, device.status) {
        (_, DeviceStatus::Blocked) => Some(LogEntry::critical(
            format!(
                "BLOCKED {} ({}): rate {} packets in window, limit {}, protocol {}",
                device.id,
                device.ip,
                device.current_rate(),
                device.packet_limit,
                device.protocol_label(),
            ),
            at,
        )),
        (_, DeviceStatus::Alert) => Some(LogEntry::warning(
            format!(
                "ALERT {} ({}): rate {} packets in window against limit {}",
                device.id,
                device.ip,
                device.current_rate(),
                device.packet_limit,
            ),
            at,
        )),
        (Some(DeviceStatus::Blocked), status) => Some(LogEntry::normal(
            format!("{} ({}) is no longer blocked ({status})", device.id, device.ip),
            at,
        )),
        (Some(DeviceStatus::Alert), DeviceStatus::Connected) => Some(LogEntry::normal(
            format!("{} ({}) traffic back to normal", device.id, device.ip),
            at,
        )),
        _ => None,
    }
}

/// Entries for changes of the service-wide attack and simulation flags.
/// Nothing without a `previous` to compare against.
fn service_transitions(previous: Option<&Snapshot>, next: &Snapshot, at: DateTime<Utc>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    let Some(previous) = previous else {
        return entries;
    };
    let (was_attack, was_simulating) = (previous.attack_mode, previous.simulating);

    match (was_attack, next.attack_mode) {
        (false, true) => entries.push(LogEntry::warning(
            format!(
                "Attack mode engaged, attacker {}",
                next.attacker_ip.as_deref().unwrap_or("unknown")
            ),
            at,
        )),
        (true, false) => entries.push(LogEntry::normal("Attack mode cleared", at)),
        _ => {}
    }

    match (was_simulating, next.simulating) {
        (false, true) => entries.push(LogEntry::warning(
            "Audit service fell back to simulation mode",
            at,
        )),
        (true, false) => entries.push(LogEntry::normal("Audit service resumed real capture", at)),
        _ => {}
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_PACKET_LIMIT, DeviceIdentity, Severity};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).single().unwrap_or_default()
    }

    fn device(ip: &str, status: DeviceStatus) -> Device {
        Device {
            id: format!("HOST-{}", ip.rsplit('.').next().unwrap_or_default()),
            ip: ip.parse().unwrap_or(std::net::IpAddr::from([0, 0, 0, 0])),
            status,
            packet_count: Some(50),
            packet_limit: DEFAULT_PACKET_LIMIT,
            recent_packet_history: Vec::new(),
            recent_bandwidth_rate: Vec::new(),
            identity: DeviceIdentity::default(),
        }
    }

    fn snapshot(devices: Vec<Device>) -> Snapshot {
        Snapshot {
            devices,
            ..Snapshot::default()
        }
    }

    #[test]
    fn connected_to_blocked_emits_one_critical_entry() {
        let prev = snapshot(vec![device("10.0.0.5", DeviceStatus::Connected)]);
        let mut blocked = device("10.0.0.5", DeviceStatus::Blocked);
        blocked.recent_packet_history = vec![300, 400, 500, 600, 700];
        blocked.identity.last_protocol = Some("UDP".into());
        let next = snapshot(vec![blocked]);

        let entries = reconcile(Some(&prev), &next, at());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Critical);
        assert_eq!(
            entries[0].message,
            "BLOCKED HOST-5 (10.0.0.5): rate 2500 packets in window, limit 1500, protocol UDP"
        );
    }

    #[test]
    fn continuously_blocked_device_is_silent() {
        let prev = snapshot(vec![device("10.0.0.5", DeviceStatus::Blocked)]);
        let next = prev.clone();
        assert!(reconcile(Some(&prev), &next, at()).is_empty());
    }

    #[test]
    fn blocked_on_first_snapshot_is_reported() {
        let next = snapshot(vec![
            device("10.0.0.5", DeviceStatus::Blocked),
            device("10.0.0.6", DeviceStatus::Connected),
        ]);
        let entries = reconcile(None, &next, at());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Critical);
        assert!(entries[0].message.contains("10.0.0.5"));
    }

    #[test]
    fn first_snapshot_of_connected_devices_is_silent() {
        let next = snapshot(vec![device("10.0.0.5", DeviceStatus::Connected)]);
        assert!(reconcile(None, &next, at()).is_empty());
    }

    #[test]
    fn first_snapshot_reports_nothing_but_blocked_devices() {
        let next = Snapshot {
            devices: vec![device("10.0.0.5", DeviceStatus::Alert)],
            attack_mode: true,
            attacker_ip: Some("10.0.0.66".into()),
            simulating: true,
            ..Snapshot::default()
        };
        assert!(reconcile(None, &next, at()).is_empty());

        let with_blocked = Snapshot {
            devices: vec![
                device("10.0.0.5", DeviceStatus::Alert),
                device("10.0.0.6", DeviceStatus::Blocked),
            ],
            ..next
        };
        let entries = reconcile(None, &with_blocked, at());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Critical);
        assert!(entries[0].message.contains("10.0.0.6"));
    }

    #[test]
    fn newly_seen_blocked_device_gets_only_the_critical_entry() {
        let prev = snapshot(vec![]);
        let next = snapshot(vec![device("10.0.0.9", DeviceStatus::Blocked)]);
        let entries = reconcile(Some(&prev), &next, at());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Critical);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let prev = snapshot(vec![device("10.0.0.5", DeviceStatus::Connected)]);
        let next = snapshot(vec![
            device("10.0.0.5", DeviceStatus::Alert),
            device("10.0.0.7", DeviceStatus::Connected),
        ]);
        let first = reconcile(Some(&prev), &next, at());
        let second = reconcile(Some(&prev), &next, at());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn alert_edges_are_lower_severity() {
        let connected = snapshot(vec![device("10.0.0.5", DeviceStatus::Connected)]);
        let alert = snapshot(vec![device("10.0.0.5", DeviceStatus::Alert)]);

        let entering = reconcile(Some(&connected), &alert, at());
        assert_eq!(entering.len(), 1);
        assert_eq!(entering[0].severity, Severity::Warning);

        let leaving = reconcile(Some(&alert), &connected, at());
        assert_eq!(leaving.len(), 1);
        assert_eq!(leaving[0].severity, Severity::Normal);

        assert!(reconcile(Some(&alert), &alert, at()).is_empty());
    }

    #[test]
    fn unblock_and_disappearance_are_normal_entries() {
        let prev = snapshot(vec![
            device("10.0.0.5", DeviceStatus::Blocked),
            device("10.0.0.6", DeviceStatus::Connected),
        ]);
        let next = snapshot(vec![device("10.0.0.5", DeviceStatus::Connected)]);

        let entries = reconcile(Some(&prev), &next, at());
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "HOST-5 (10.0.0.5) is no longer blocked (Connected)",
                "HOST-6 (10.0.0.6) is no longer reported",
            ]
        );
        assert!(entries.iter().all(|e| e.severity == Severity::Normal));
    }

    #[test]
    fn attack_mode_and_simulation_flags_are_edge_triggered() {
        let calm = snapshot(vec![]);
        let attacked = Snapshot {
            attack_mode: true,
            attacker_ip: Some("10.0.0.66".into()),
            simulating: true,
            ..Snapshot::default()
        };

        let entries = reconcile(Some(&calm), &attacked, at());
        assert_eq!(entries.len(), 2);
        assert!(entries[0].message.contains("10.0.0.66"));
        assert!(entries.iter().all(|e| e.severity == Severity::Warning));

        assert!(reconcile(Some(&attacked), &attacked, at()).is_empty());
        assert_eq!(reconcile(Some(&attacked), &calm, at()).len(), 2);
    }
}
