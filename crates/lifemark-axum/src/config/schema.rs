use std::net::SocketAddr;

use serde::Deserialize;
use lifemark_core::error::{LifemarkError, Result};
use lifemark_core::LifecycleEvent;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifemarkConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub plugin: PluginSection,
}

impl Default for LifemarkConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            plugin: PluginSection::default(),
        }
    }
}

impl LifemarkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LifemarkError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.plugin.validate()?;

        Ok(())
    }
}

/// Listener settings for the demo binary.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            LifemarkError::Config(format!("server.listen must be a valid socket address: {}", self.listen))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSection {
    /// Events the host fires, in lifecycle order.
    #[serde(default = "default_events")]
    pub events: Vec<LifecycleEvent>,

    /// Log every measurement through `TracingObserver`.
    #[serde(default = "default_log_measurements")]
    pub log_measurements: bool,
}

impl Default for PluginSection {
    fn default() -> Self {
        Self {
            events: default_events(),
            log_measurements: default_log_measurements(),
        }
    }
}

impl PluginSection {
    pub fn validate(&self) -> Result<()> {
        // strictly increasing => canonical order and no duplicates
        if !self.events.windows(2).all(|w| w[0] < w[1]) {
            return Err(LifemarkError::Config(
                "plugin.events must be unique and in lifecycle order".into(),
            ));
        }
        if !self.events.contains(&LifecycleEvent::ResponseComplete) {
            return Err(LifemarkError::Config(
                "plugin.events must include response-complete".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_events() -> Vec<LifecycleEvent> {
    LifecycleEvent::ALL.to_vec()
}
fn default_log_measurements() -> bool {
    true
}
