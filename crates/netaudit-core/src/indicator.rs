// ── System-wide status indicator ──

use serde::Serialize;

use crate::model::Snapshot;

/// Coarse level of the system indicator, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IndicatorLevel {
    Inactive,
    Normal,
    Warning,
    Critical,
}

/// One-line summary of the whole monitored network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemIndicator {
    pub label: String,
    pub level: IndicatorLevel,
}

/// Derive the indicator from the poller state and the latest snapshot.
///
/// Precedence, highest first: poller not running, any device blocked,
/// service in simulation mode, real audit. A running poller that has not
/// received a snapshot yet reads as an empty real audit.
pub fn aggregate(running: bool, snapshot: Option<&Snapshot>) -> SystemIndicator {
    if !running {
        return SystemIndicator {
            label: "Inactive".into(),
            level: IndicatorLevel::Inactive,
        };
    }

    let blocked = snapshot.map_or(0, Snapshot::blocked_count);
    if blocked > 0 {
        return SystemIndicator {
            label: format!("Threat contained ({blocked} blocked)"),
            level: IndicatorLevel::Critical,
        };
    }

    if snapshot.is_some_and(|s| s.simulating) {
        return SystemIndicator {
            label: "Auditing in fallback/simulation mode".into(),
            level: IndicatorLevel::Warning,
        };
    }

    SystemIndicator {
        label: "Real audit active".into(),
        level: IndicatorLevel::Normal,
    }
}
