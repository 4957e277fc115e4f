//! Plugin config loader (strict parsing).

pub mod schema;

use std::fs;

use lifemark_core::error::{LifemarkError, Result};

pub use schema::{LifemarkConfig, PluginSection, ServerSection};

pub fn load_from_file(path: &str) -> Result<LifemarkConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LifemarkError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<LifemarkConfig> {
    let cfg: LifemarkConfig = serde_yaml::from_str(s)
        .map_err(|e| LifemarkError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
