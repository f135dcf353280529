//! Configuration for the channel core

use serde::{Deserialize, Serialize};

/// Orderer-wide settings the channel core reads.
///
/// Channel-level settings (consensus type, batch sizes) are not here: they
/// live in each channel's config blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultichannelConfig {
    /// Name of the system channel, if this orderer runs one
    #[serde(default)]
    pub system_channel: Option<String>,

    /// Capabilities this orderer supports
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Capability names a channel config may require.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    /// Channel-level capabilities
    #[serde(default = "default_channel_capabilities")]
    pub channel: Vec<String>,

    /// Orderer-level capabilities
    #[serde(default = "default_orderer_capabilities")]
    pub orderer: Vec<String>,
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            channel: default_channel_capabilities(),
            orderer: default_orderer_capabilities(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_channel_capabilities() -> Vec<String> {
    vec!["V1_4_3".to_string(), "V2_0".to_string()]
}

fn default_orderer_capabilities() -> Vec<String> {
    vec!["V1_4_2".to_string(), "V2_0".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl MultichannelConfig {
    /// Load configuration from defaults, an optional file and `ORDERER_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `ORDERER_LOGGING__LEVEL`.
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        builder = builder.add_source(::config::Config::try_from(&MultichannelConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ORDERER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Whether `channel` is the system channel.
    pub fn is_system_channel(&self, channel: &str) -> bool {
        self.system_channel.as_deref() == Some(channel)
    }
}
