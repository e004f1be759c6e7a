//! Environment layers
//!
//! Each layer is sourced from its own optional JSON document in the project
//! root:
//! - `appsettings.json` (Local, a personal additive override)
//! - `appsettings.dev.json` (Dev, the checked-in baseline)
//!
//! Document keys are SCREAMING_SNAKE_CASE. Inside a device section `FLAGS`
//! is the flag list and every other key is a free-form option, except the
//! well-known `WEB_PORT` and `WEB_RENDERER` fields of the `WEB` section.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use super::model::{DeviceSpecificSettings, LayerSettings, WebLayer};
use super::value::ScalarValue;
use crate::error::SettingsError;

/// Base name shared by every layer document
pub const APP_SETTINGS_FILE_NAME: &str = "appsettings";

/// Extension shared by every layer document
pub const APP_SETTINGS_FILE_EXTENSION: &str = ".json";

/// One of the two configuration sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentLayer {
    Local,
    Dev,
}

impl EnvironmentLayer {
    /// Infix between the base name and the extension
    pub fn file_infix(&self) -> &'static str {
        match self {
            Self::Local => "",
            Self::Dev => ".dev",
        }
    }

    /// File name of this layer's document
    pub fn file_name(&self) -> String {
        format!(
            "{}{}{}",
            APP_SETTINGS_FILE_NAME,
            self.file_infix(),
            APP_SETTINGS_FILE_EXTENSION
        )
    }

    /// Identify the layer a settings file name belongs to
    pub fn from_file_name(name: &str) -> Option<Self> {
        [Self::Local, Self::Dev]
            .into_iter()
            .find(|layer| layer.file_name() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Dev => "dev",
        }
    }
}

impl fmt::Display for EnvironmentLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" => Ok(Self::Dev),
            other => Err(format!("unknown environment '{}' (valid: local, dev)", other)),
        }
    }
}

/// Device section as written in a settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceSection {
    #[serde(rename = "FLAGS", default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<String>>,

    #[serde(flatten)]
    pub options: IndexMap<String, Value>,
}

/// Web section as written in a settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSection {
    #[serde(rename = "WEB_PORT", default, skip_serializing_if = "Option::is_none")]
    pub web_port: Option<i64>,

    #[serde(rename = "WEB_RENDERER", default, skip_serializing_if = "Option::is_none")]
    pub web_renderer: Option<String>,

    #[serde(flatten)]
    pub device: DeviceSection,
}

/// A settings document exactly as deserialized, values not yet coerced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppSettingsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<DeviceSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<DeviceSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<DeviceSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dart_defines: Option<IndexMap<String, Value>>,
}

impl AppSettingsDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Coerce every value, failing on the first unsupported one
    pub fn coerce(&self) -> Result<LayerSettings, SettingsError> {
        Ok(LayerSettings {
            web: self
                .web
                .as_ref()
                .map(|web| {
                    Ok::<_, SettingsError>(WebLayer {
                        web_port: web.web_port,
                        web_renderer: web.web_renderer.clone(),
                        device: coerce_device("WEB", &web.device)?,
                    })
                })
                .transpose()?,
            android: self
                .android
                .as_ref()
                .map(|d| coerce_device("ANDROID", d))
                .transpose()?,
            ios: self
                .ios
                .as_ref()
                .map(|d| coerce_device("IOS", d))
                .transpose()?,
            run: self
                .run
                .as_ref()
                .map(|d| coerce_device("RUN", d))
                .transpose()?,
            dart_defines: self
                .dart_defines
                .as_ref()
                .map(|defines| coerce_map("DART_DEFINES", defines))
                .transpose()?,
        })
    }
}

fn coerce_map(
    section: &str,
    values: &IndexMap<String, Value>,
) -> Result<IndexMap<String, ScalarValue>, SettingsError> {
    values
        .iter()
        .map(|(key, value)| {
            let path = format!("{}.{}", section, key);
            Ok((key.clone(), ScalarValue::from_json(&path, value)?))
        })
        .collect()
}

fn coerce_device(
    section: &str,
    raw: &DeviceSection,
) -> Result<DeviceSpecificSettings, SettingsError> {
    Ok(DeviceSpecificSettings {
        options: coerce_map(section, &raw.options)?,
        flags: raw.flags.clone().unwrap_or_default(),
    })
}

/// Where a loaded layer came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSource {
    pub layer: EnvironmentLayer,

    /// File path of the document
    pub path: String,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,
}

/// A layer document read from disk and coerced
#[derive(Debug, Clone)]
pub struct LoadedLayer {
    pub settings: LayerSettings,
    pub source: LayerSource,
}

/// Both layers of a project; an absent document is `None`
#[derive(Debug, Clone, Default)]
pub struct LoadedLayers {
    pub local: Option<LoadedLayer>,
    pub dev: Option<LoadedLayer>,
}

impl LoadedLayers {
    /// Read both layer documents from a project root
    pub fn load(project_root: &Path) -> Result<Self, LayerError> {
        Ok(Self {
            local: load_layer(project_root, EnvironmentLayer::Local)?,
            dev: load_layer(project_root, EnvironmentLayer::Dev)?,
        })
    }

    /// Sources of the layers that were present, Dev first
    pub fn sources(&self) -> Vec<LayerSource> {
        [&self.dev, &self.local]
            .into_iter()
            .flatten()
            .map(|l| l.source.clone())
            .collect()
    }
}

/// Errors reading a layer document
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid settings in {}: {source}", .path.display())]
    Value { path: PathBuf, source: SettingsError },
}

/// Path of a layer's document in a project root
pub fn layer_path(project_root: &Path, layer: EnvironmentLayer) -> PathBuf {
    project_root.join(layer.file_name())
}

/// Read one layer. A missing document is not an error.
pub fn load_layer(
    project_root: &Path,
    layer: EnvironmentLayer,
) -> Result<Option<LoadedLayer>, LayerError> {
    let path = layer_path(project_root, layer);
    if !path.exists() {
        debug!(layer = %layer, path = %path.display(), "layer document absent");
        return Ok(None);
    }

    let bytes = fs::read(&path).map_err(|source| LayerError::Io {
        path: path.clone(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let document: AppSettingsDocument =
        serde_json::from_slice(&bytes).map_err(|source| LayerError::Parse {
            path: path.clone(),
            source,
        })?;
    let settings = document.coerce().map_err(|source| LayerError::Value {
        path: path.clone(),
        source,
    })?;

    debug!(layer = %layer, path = %path.display(), digest = %digest, "loaded layer document");

    Ok(Some(LoadedLayer {
        settings,
        source: LayerSource {
            layer,
            path: path.to_string_lossy().to_string(),
            digest,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_names() {
        assert_eq!(EnvironmentLayer::Local.file_name(), "appsettings.json");
        assert_eq!(EnvironmentLayer::Dev.file_name(), "appsettings.dev.json");
        assert_eq!(
            EnvironmentLayer::from_file_name("appsettings.dev.json"),
            Some(EnvironmentLayer::Dev)
        );
        assert_eq!(
            EnvironmentLayer::from_file_name("appsettings.json"),
            Some(EnvironmentLayer::Local)
        );
        assert_eq!(EnvironmentLayer::from_file_name("appsettings.prod.json"), None);
    }

    #[test]
    fn test_parse_layer_name() {
        assert_eq!("Dev".parse::<EnvironmentLayer>(), Ok(EnvironmentLayer::Dev));
        assert_eq!("local".parse::<EnvironmentLayer>(), Ok(EnvironmentLayer::Local));
        assert!("prod".parse::<EnvironmentLayer>().is_err());
    }

    #[test]
    fn test_document_sections() {
        let json = r#"{
            "WEB": { "WEB_PORT": 8080, "FLAGS": ["--release"], "PWA_STRATEGY": "none" },
            "ANDROID": { "FLAVOR": "staging", "TARGET_PLATFORM": ["android-arm", "android-arm64"] },
            "DART_DEFINES": { "APP_USE_MOCK_SERVICE": false, "APP_INITIAL_ENDPOINT": "PLAYGROUND" }
        }"#;

        let layer = AppSettingsDocument::from_json(json).unwrap().coerce().unwrap();

        let web = layer.web.unwrap();
        assert_eq!(web.web_port, Some(8080));
        assert_eq!(web.web_renderer, None);
        assert_eq!(web.device.flags, vec!["--release"]);
        assert_eq!(
            web.device.options.get("PWA_STRATEGY"),
            Some(&ScalarValue::String("none".to_string()))
        );
        assert!(!web.device.options.contains_key("WEB_PORT"));

        let android = layer.android.unwrap();
        assert_eq!(android.flags, Vec::<String>::new());
        assert_eq!(android.options.len(), 2);

        let defines: Vec<&String> = layer.dart_defines.as_ref().unwrap().keys().collect();
        assert_eq!(defines, vec!["APP_USE_MOCK_SERVICE", "APP_INITIAL_ENDPOINT"]);

        assert!(layer.ios.is_none());
        assert!(layer.run.is_none());
    }

    #[test]
    fn test_nested_option_rejected() {
        let json = r#"{ "IOS": { "nested": { "a": 1 } } }"#;
        let err = AppSettingsDocument::from_json(json).unwrap().coerce().unwrap_err();
        assert_eq!(
            err,
            SettingsError::UnsupportedValueKind {
                path: "IOS.nested".to_string(),
                kind: "object",
            }
        );
    }

    #[test]
    fn test_empty_document_serializes_empty() {
        let json = AppSettingsDocument::default().to_json().unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_load_missing_layer() {
        let dir = TempDir::new().unwrap();
        let loaded = load_layer(dir.path(), EnvironmentLayer::Dev).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_layer_with_digest() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("appsettings.dev.json"),
            r#"{ "DART_DEFINES": { "A": 1 } }"#,
        )
        .unwrap();

        let layers = LoadedLayers::load(dir.path()).unwrap();
        assert!(layers.local.is_none());

        let dev = layers.dev.as_ref().unwrap();
        assert_eq!(dev.source.layer, EnvironmentLayer::Dev);
        assert_eq!(dev.source.digest.len(), 64);
        assert_eq!(layers.sources().len(), 1);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("appsettings.json"), "{ not json").unwrap();

        let err = load_layer(dir.path(), EnvironmentLayer::Local).unwrap_err();
        assert!(matches!(err, LayerError::Parse { .. }));
    }

    #[test]
    fn test_load_unsupported_value() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("appsettings.json"),
            r#"{ "DART_DEFINES": { "CFG": { "a": 1 } } }"#,
        )
        .unwrap();

        let err = load_layer(dir.path(), EnvironmentLayer::Local).unwrap_err();
        assert!(matches!(
            err,
            LayerError::Value {
                source: SettingsError::UnsupportedValueKind { .. },
                ..
            }
        ));
    }
}
