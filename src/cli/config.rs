use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::session::SessionContext;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub url: String,
    pub added_at: DateTime<Utc>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Persistent CLI selections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub current_server: Option<ServerInfo>,
}

impl ServerInfo {
    pub fn new(url: String) -> Self {
        Self {
            url,
            added_at: Utc::now(),
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }

    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerStatus::Up => f.write_str("up"),
            ServerStatus::Down => f.write_str("down"),
            ServerStatus::Unknown => f.write_str("unknown"),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("RISK_CONSOLE_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("risk-console")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_console_config() -> anyhow::Result<ConsoleConfig> {
    let config_file = get_config_dir()?.join("config.json");

    if !config_file.exists() {
        return Ok(ConsoleConfig::default());
    }

    let content = fs::read_to_string(config_file)?;
    let config: ConsoleConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_console_config(config: &ConsoleConfig) -> anyhow::Result<()> {
    let config_file = get_config_dir()?.join("config.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_file, content)?;
    Ok(())
}

/// The session left behind by the previous invocation
pub fn load_session() -> anyhow::Result<SessionContext> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(SessionContext::default());
    }

    let content = fs::read_to_string(session_file)?;
    match serde_json::from_str(&content) {
        Ok(ctx) => Ok(ctx),
        Err(e) => {
            tracing::warn!("Ignoring unreadable session file: {}", e);
            Ok(SessionContext::default())
        }
    }
}

/// Persist the session; an empty session removes the file
pub fn save_session(ctx: &SessionContext) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    if *ctx == SessionContext::default() {
        if session_file.exists() {
            fs::remove_file(session_file)?;
        }
        return Ok(());
    }

    let content = serde_json::to_string_pretty(ctx)?;
    fs::write(session_file, content)?;
    Ok(())
}

/// Reachability check: any HTTP answer counts as up
pub async fn ping_server(url: &str) -> ServerStatus {
    let client = reqwest::Client::new();

    match client.get(url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) => {
            tracing::debug!("Ping {} answered {}", url, response.status());
            ServerStatus::Up
        }
        Err(e) => {
            tracing::debug!("Ping {} failed: {}", url, e);
            ServerStatus::Down
        }
    }
}
