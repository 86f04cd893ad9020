// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
const ENV_WEBHOOK: &str = "DISCORD_WEBHOOK_URL";
const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";

fn default_poll_interval_secs() -> u64 {
    60
}
fn default_message_delay_secs() -> u64 {
    2
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_state_path() -> PathBuf {
    PathBuf::from("state/seen_posts.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    /// Category label attached to every post from this source; also the key
    /// into the role map for the cycle's mention.
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// "ENV" means: read from DISCORD_WEBHOOK_URL.
    pub webhook_url: String,
    /// Category label -> Discord role id to mention.
    #[serde(default)]
    pub roles: HashMap<String, u64>,
    pub sources: Vec<SourceConfig>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_message_delay_secs")]
    pub message_delay_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

impl MonitorConfig {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: MonitorConfig = toml::from_str(&data)
            .with_context(|| format!("parsing config from {}", path.display()))?;

        // Resolve webhook if "ENV"
        if cfg.webhook_url.trim().eq_ignore_ascii_case("env") {
            cfg.webhook_url = env::var(ENV_WEBHOOK)
                .map_err(|_| anyhow!("Missing {ENV_WEBHOOK} env var"))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load using env var + fallback:
    /// 1) $MONITOR_CONFIG_PATH
    /// 2) config/monitor.toml
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    fn validate(&self) -> Result<()> {
        if self.webhook_url.trim().is_empty() {
            return Err(anyhow!("webhook_url must not be empty"));
        }
        if self.sources.is_empty() {
            return Err(anyhow!("at least one source must be configured"));
        }
        if self.poll_interval_secs == 0 {
            return Err(anyhow!("poll_interval_secs must be at least 1"));
        }
        for s in &self.sources {
            if s.url.trim().is_empty() {
                return Err(anyhow!("source {} has an empty url", s.name));
            }
            if !self.roles.contains_key(&s.category) {
                // not fatal: posts from this source just never carry a mention
                tracing::warn!(source = %s.name, category = %s.category, "no role configured for category");
            }
        }
        Ok(())
    }
}
