//! CLI-side configuration: profile selection and flag overrides on top of
//! the shared `netaudit-config` crate.
//!
//! Core never sees these types -- it receives a pre-built `MonitorConfig`.

use std::path::PathBuf;

use netaudit_config::{Config, Profile, profile_to_monitor_config};
use netaudit_core::MonitorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Where the config file lives for this invocation.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(netaudit_config::config_path)
}

/// Load the config file named by `--config`, or the platform default.
///
/// An explicit `--config` must parse; the implicit one falls back to
/// defaults when unreadable.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    match global.config {
        Some(ref path) => Ok(netaudit_config::load_config_from(path)?),
        None => Ok(netaudit_config::load_config_or_default()),
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build a `MonitorConfig` from the config file, profile, and CLI overrides.
///
/// Precedence: flag / env var > profile > `[defaults]`.
pub fn build_monitor_config(global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let cfg = load(global)?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match (cfg.profiles.get(&profile_name), &global.url) {
        (Some(profile), _) => profile.clone(),
        // No profile: a bare --url is enough, unless a profile was asked for by name.
        (None, Some(url)) if global.profile.is_none() => Profile::new(url.clone()),
        (None, _) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        (None, _) => {
            return Err(CliError::NoConfig {
                path: config_path(global).display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(interval) = global.interval_ms {
        profile.poll_interval_ms = Some(interval);
    }
    if let Some(style) = global.command_style {
        profile.command_style = style.into();
    }

    tracing::debug!(profile = %profile_name, url = %profile.url, "resolved profile");
    Ok(profile_to_monitor_config(&profile, &cfg.defaults)?)
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
