use crate::resolve::ResolutionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a render configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0:?}")]
    UnsupportedFormat(Option<String>),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for the forward rendering system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub resolution_policy: ResolutionPolicy,
    /// Edge length of the cube drawn at each light.
    pub light_marker_size: f32,
    pub draw_light_markers: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            resolution_policy: ResolutionPolicy::default(),
            light_marker_size: 0.01,
            draw_light_markers: true,
        }
    }
}

impl RenderConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file. Missing fields take
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config: Self = match extension.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&data)?,
            Some("json") => serde_json::from_str(&data)?,
            _ => return Err(ConfigError::UnsupportedFormat(extension)),
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded render config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.light_marker_size.is_finite() && self.light_marker_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "light_marker_size must be positive, got {}",
                self.light_marker_size
            )));
        }
        Ok(())
    }
}
