use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::ConfigError;

const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3000/api/chat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Role-play gateway endpoint (chat-completion proxy).
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// When false, replies come from the local simulation only.
    #[serde(default)]
    pub use_live_gateway: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub simulator: SimulatorConfig,

    #[serde(default)]
    pub debug: bool,
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.into()
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".viking-roleplay".into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            gateway_url: default_gateway_url(),
            use_live_gateway: false,
            request_timeout_secs: default_request_timeout_secs(),
            simulator: SimulatorConfig::default(),
            debug: false,
        }
    }
}

/// Tuning for the local fallback simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Artificial reply latency range, emulating gateway round trips.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Chance of injecting a scenario trigger line instead of a canned reply.
    #[serde(default = "default_trigger_probability")]
    pub trigger_probability: f64,

    /// Trigger lines are only injected while the session holds fewer total
    /// messages than this.
    #[serde(default = "default_trigger_message_ceiling")]
    pub trigger_message_ceiling: usize,
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_trigger_probability() -> f64 {
    0.6
}

fn default_trigger_message_ceiling() -> usize {
    8
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            trigger_probability: default_trigger_probability(),
            trigger_message_ceiling: default_trigger_message_ceiling(),
        }
    }
}

impl SimulatorConfig {
    /// Zero-latency variant for tests and scripted runs.
    pub fn immediate() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
            ..Self::default()
        }
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig::default();
    config.working_dir = wd.clone();

    // Try loading global config
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("viking-roleplay").join("config.json");
        if global_path.exists() {
            let content = std::fs::read_to_string(&global_path)
                .map_err(|e| ConfigError::File(e.to_string()))?;
            let file_config: AppConfig = serde_json::from_str(&content)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            merge_config(&mut config, file_config);
        }
    }

    // Try loading local project config
    let local_path = wd.join("viking-roleplay.json");
    if local_path.exists() {
        let content = std::fs::read_to_string(&local_path)
            .map_err(|e| ConfigError::File(e.to_string()))?;
        let file_config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        merge_config(&mut config, file_config);
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.gateway_url != default_gateway_url() {
        base.gateway_url = overlay.gateway_url;
    }
    if overlay.use_live_gateway {
        base.use_live_gateway = true;
    }
    if overlay.request_timeout_secs != default_request_timeout_secs() {
        base.request_timeout_secs = overlay.request_timeout_secs;
    }
    if overlay.data_dir != default_data_dir() {
        base.data_dir = overlay.data_dir;
    }
    if overlay.debug {
        base.debug = true;
    }
    base.simulator = overlay.simulator;
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = std::env::var("VIKING_GATEWAY_URL") {
        if !url.is_empty() {
            config.gateway_url = url;
        }
    }
    if let Ok(live) = std::env::var("VIKING_LIVE_GATEWAY") {
        config.use_live_gateway = matches!(live.as_str(), "1" | "true" | "yes");
    }
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }

    /// Location of the token ledger cache (the only persisted state).
    pub fn ledger_cache_path(&self) -> PathBuf {
        self.data_path().join("ledger.json")
    }
}
