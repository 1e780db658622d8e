//! Player configuration
//!
//! Loaded from a TOML file; every section is optional.
//!
//! ```toml
//! [log]
//! filter = "enklu=debug"
//!
//! [trellis]
//! base_url = "https://trellis.enklu.com"
//! app_id = "app"
//! scene_id = "scene"
//!
//! [proximity]
//! default_inner_radius = 0.5
//! default_outer_radius = 0.75
//! margin = 0.25
//!
//! [anchors]
//! cache_dir = "cache/anchors"
//! ```

use anyhow::{Context, Result};
use enklu_anchor::AnchorEndpoints;
use enklu_proximity::ProximitySettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Sections
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Backend the anchors are saved to
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrellisConfig {
    pub base_url: String,
    pub app_id: String,
    pub scene_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnchorsConfig {
    /// Directory for exported anchor bytes; in-memory when unset
    pub cache_dir: Option<PathBuf>,
}

// =============================================================================
// PlayerConfig
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub log: LogConfig,
    pub trellis: TrellisConfig,
    pub proximity: ProximitySettings,
    pub anchors: AnchorsConfig,
}

impl PlayerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse player config")
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize player config")
    }

    /// Anchor endpoints for the configured scene
    pub fn endpoints(&self) -> AnchorEndpoints {
        AnchorEndpoints::new(
            self.trellis.base_url.clone(),
            self.trellis.app_id.clone(),
            self.trellis.scene_id.clone(),
        )
    }
}
