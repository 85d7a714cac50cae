use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub fallback: FallbackSettings,
    #[serde(default = "default_catalog")]
    pub catalog: Vec<EndpointSettings>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8787 }

/// Outbound HTTP behaviour shared by resource fetches, invocations and probes
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_invoke_timeout")]
    pub invoke_timeout_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl UpstreamSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_secs(self.invoke_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            invoke_timeout_secs: default_invoke_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_user_agent() -> String { "Mozilla/5.0 (compatible; VTONProxy/1.0)".to_string() }
fn default_connect_timeout() -> u64 { 10 }
fn default_fetch_timeout() -> u64 { 30 }
fn default_invoke_timeout() -> u64 { 120 }
fn default_probe_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LimitSettings {
    #[serde(default = "default_max_field_bytes")]
    pub max_field_bytes: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_field_bytes: default_max_field_bytes(),
        }
    }
}

fn default_max_field_bytes() -> usize { 20 * 1024 * 1024 }

/// What the gateway answers with once every candidate has failed
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSettings {
    #[serde(default = "default_placeholder_url")]
    pub placeholder_url: String,
    #[serde(default = "default_warning")]
    pub warning: String,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            placeholder_url: default_placeholder_url(),
            warning: default_warning(),
        }
    }
}

fn default_placeholder_url() -> String {
    "https://via.placeholder.com/512x768/FF69B4/FFFFFF?text=VTON+Result".to_string()
}
fn default_warning() -> String { "Using dummy result - HF Spaces unavailable".to_string() }

/// One upstream inference space and the paths to try under it
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EndpointSettings {
    #[validate(length(min = 1))]
    pub label: String,
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1))]
    pub paths: Vec<String>,
}

fn default_catalog() -> Vec<EndpointSettings> {
    vec![
        EndpointSettings {
            label: "yisol-idm-vton".to_string(),
            base_url: "https://yisol-idm-vton.hf.space".to_string(),
            paths: vec!["/api/predict".to_string(), "/run/predict".to_string()],
        },
        EndpointSettings {
            label: "alternate-space".to_string(),
            base_url: "https://huggingface.co/spaces/yisol/IDM-VTON".to_string(),
            paths: vec!["/api/predict".to_string()],
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local override file (config/local.toml)
    /// 4. Environment variables (prefixed with VTON__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VTON__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("VTON")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
