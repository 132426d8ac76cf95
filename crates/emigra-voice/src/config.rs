//! Voice configuration loading from file and environment variables.

use serde::Deserialize;
use thiserror::Error;

/// Configuration for the voice session orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// Endpoint that issues short-lived session credentials.
    #[serde(default = "default_credential_endpoint")]
    pub credential_endpoint: String,

    /// Provider-side agent configuration id sessions connect to.
    #[serde(default)]
    pub agent_id: String,

    /// Free sessions granted to an anonymous caller.
    #[serde(default = "default_max_free_uses")]
    pub max_free_uses: u32,

    /// Entries retained by the diagnostic trace.
    #[serde(default = "default_trace_capacity")]
    pub trace_capacity: usize,
}

fn default_credential_endpoint() -> String {
    "/api/voice/credential".to_string()
}

fn default_max_free_uses() -> u32 {
    3
}

fn default_trace_capacity() -> usize {
    20
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            credential_endpoint: default_credential_endpoint(),
            agent_id: String::new(),
            max_free_uses: default_max_free_uses(),
            trace_capacity: default_trace_capacity(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `EMIGRA_VOICE_CREDENTIAL_ENDPOINT` overrides `credential_endpoint`
/// - `EMIGRA_VOICE_AGENT_ID` overrides `agent_id`
/// - `EMIGRA_VOICE_MAX_FREE_USES` overrides `max_free_uses`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<VoiceConfig, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                VoiceConfig::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => VoiceConfig::default(),
    };

    // Environment variable overrides
    if let Ok(endpoint) = std::env::var("EMIGRA_VOICE_CREDENTIAL_ENDPOINT") {
        config.credential_endpoint = endpoint;
    }
    if let Ok(agent_id) = std::env::var("EMIGRA_VOICE_AGENT_ID") {
        config.agent_id = agent_id;
    }
    if let Ok(max) = std::env::var("EMIGRA_VOICE_MAX_FREE_USES") {
        if let Ok(parsed) = max.parse() {
            config.max_free_uses = parsed;
        }
    }

    Ok(config)
}
