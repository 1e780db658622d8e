//! Persisted anchor data and backend endpoints

use enklu_core::Schema;
use serde::{Deserialize, Serialize};

/// Schema key holding the anchor version
pub const VERSION_KEY: &str = "anchor.version";
/// Schema key holding the anchor download url
pub const URL_KEY: &str = "anchor.url";

/// The logical state of one world anchor
///
/// `version` 0 means the anchor was never saved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub id: String,
    pub version: u32,
    #[serde(default)]
    pub url: Option<String>,
    /// Whether user manipulation is currently disallowed
    #[serde(skip)]
    pub locked: bool,
}

impl AnchorRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: u32, url: impl Into<String>) -> Self {
        self.version = version;
        self.url = Some(url.into());
        self
    }

    /// Read the persisted anchor fields from an element schema
    pub fn from_schema(id: impl Into<String>, schema: &Schema) -> Self {
        Self {
            id: id.into(),
            version: schema
                .get_int(VERSION_KEY)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            url: schema.get_string(URL_KEY).map(str::to_string),
            locked: false,
        }
    }

    /// Write the persisted anchor fields back into an element schema
    pub fn write_schema(&self, schema: &mut Schema) {
        schema.set(VERSION_KEY, i64::from(self.version));
        match &self.url {
            Some(url) => {
                schema.set(URL_KEY, url.as_str());
            }
            None => {
                schema.remove(URL_KEY);
            }
        }
    }

    pub fn is_saved(&self) -> bool {
        self.version > 0
    }
}

/// Trellis endpoints used by anchors of one scene
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorEndpoints {
    pub base_url: String,
    pub app_id: String,
    pub scene_id: String,
}

impl AnchorEndpoints {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        scene_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_id: app_id.into(),
            scene_id: scene_id.into(),
        }
    }

    /// Upload endpoint for an anchor's exported bytes
    pub fn anchor_url(&self, anchor_id: &str) -> String {
        format!(
            "{}/v1/editor/app/{}/scene/{}/anchor/{}",
            self.base_url.trim_end_matches('/'),
            self.app_id,
            self.scene_id,
            anchor_id
        )
    }
}

/// Body of a successful anchor upload response
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AnchorUploadBody {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_url() {
        let endpoints = AnchorEndpoints::new("https://trellis.example/", "app", "scene");
        assert_eq!(
            endpoints.anchor_url("a1"),
            "https://trellis.example/v1/editor/app/app/scene/scene/anchor/a1"
        );
    }

    #[test]
    fn test_schema_round_trip_fields() {
        let schema = Schema::new()
            .with(VERSION_KEY, 3i64)
            .with(URL_KEY, "https://cdn/anchors/a1.v3");
        let record = AnchorRecord::from_schema("a1", &schema);
        assert_eq!(record.version, 3);
        assert_eq!(record.url.as_deref(), Some("https://cdn/anchors/a1.v3"));
        assert!(record.is_saved());

        let mut out = Schema::new();
        AnchorRecord::new("a2").write_schema(&mut out);
        assert_eq!(out.get_int(VERSION_KEY), Some(0));
        assert!(!out.contains(URL_KEY));
    }

    #[test]
    fn test_negative_version_reads_as_unsaved() {
        let schema = Schema::new().with(VERSION_KEY, -4i64);
        assert_eq!(AnchorRecord::from_schema("a", &schema).version, 0);
    }
}
