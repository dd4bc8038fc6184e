use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 8;

/// Portal settings read from Rocket's figment, so every key can be set in
/// `Rocket.toml` or as a `ROCKET_`-prefixed environment variable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub session_ttl_hours: i64,
    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
        }
    }
}

impl PortalConfig {
    /// Both halves of the bootstrap admin, or nothing.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (
            self.bootstrap_admin_username.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        }
    }
}

pub fn env_files(profile: &str) -> Vec<&'static str> {
    if profile == "production" {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    }
}

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    let profile = dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string());

    for env_file in env_files(&profile) {
        load_env_file(env_file)?;
    }

    Ok(())
}

pub fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Warning: Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}
