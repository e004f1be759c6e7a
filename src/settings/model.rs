//! Settings model
//!
//! Coerced per-layer settings and the effective settings produced by the
//! merger. Every collection is insertion ordered.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use super::value::ScalarValue;

/// Default port for `flutter run -d web-server`
pub const DEFAULT_WEB_PORT: i64 = 30001;

/// Default web renderer
pub const DEFAULT_WEB_RENDERER: &str = "canvaskit";

/// A named scope for device-specific options and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceTarget {
    Web,
    Android,
    Ios,
    Run,
}

impl DeviceTarget {
    pub const ALL: [DeviceTarget; 4] = [Self::Web, Self::Android, Self::Ios, Self::Run];

    /// Section key in a settings document
    pub fn section_key(&self) -> &'static str {
        match self {
            Self::Web => "WEB",
            Self::Android => "ANDROID",
            Self::Ios => "IOS",
            Self::Run => "RUN",
        }
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Web => "web",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Run => "run",
        })
    }
}

/// Free-form build options and bare flags for one device target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSpecificSettings {
    /// Option name to value; rendered as `--<kebab-name> <value>`
    #[serde(flatten)]
    pub options: IndexMap<String, ScalarValue>,

    /// Flags passed through verbatim, in source order
    #[serde(rename = "FLAGS")]
    pub flags: Vec<String>,
}

impl DeviceSpecificSettings {
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.flags.is_empty()
    }
}

/// Web section of one layer, before defaults are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebLayer {
    pub web_port: Option<i64>,
    pub web_renderer: Option<String>,
    pub device: DeviceSpecificSettings,
}

/// One environment layer after value coercion.
///
/// A section that is absent from the source document stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSettings {
    pub web: Option<WebLayer>,
    pub android: Option<DeviceSpecificSettings>,
    pub ios: Option<DeviceSpecificSettings>,
    pub run: Option<DeviceSpecificSettings>,
    pub dart_defines: Option<IndexMap<String, ScalarValue>>,
}

impl LayerSettings {
    /// Device section for a target, if the layer supplied one
    pub fn device(&self, target: DeviceTarget) -> Option<&DeviceSpecificSettings> {
        match target {
            DeviceTarget::Web => self.web.as_ref().map(|w| &w.device),
            DeviceTarget::Android => self.android.as_ref(),
            DeviceTarget::Ios => self.ios.as_ref(),
            DeviceTarget::Run => self.run.as_ref(),
        }
    }
}

/// Web settings with the two well-known fields resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WebSettings {
    pub web_port: i64,
    pub web_renderer: String,
    #[serde(flatten)]
    pub device: DeviceSpecificSettings,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            web_port: DEFAULT_WEB_PORT,
            web_renderer: DEFAULT_WEB_RENDERER.to_string(),
            device: DeviceSpecificSettings::default(),
        }
    }
}

/// The merged settings used for every projection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EffectiveSettings {
    pub web: WebSettings,
    pub android: DeviceSpecificSettings,
    pub ios: DeviceSpecificSettings,
    pub run: DeviceSpecificSettings,
    pub dart_defines: IndexMap<String, ScalarValue>,
}

impl EffectiveSettings {
    pub fn device(&self, target: DeviceTarget) -> &DeviceSpecificSettings {
        match target {
            DeviceTarget::Web => &self.web.device,
            DeviceTarget::Android => &self.android,
            DeviceTarget::Ios => &self.ios,
            DeviceTarget::Run => &self.run,
        }
    }

    pub(crate) fn device_mut(&mut self, target: DeviceTarget) -> &mut DeviceSpecificSettings {
        match target {
            DeviceTarget::Web => &mut self.web.device,
            DeviceTarget::Android => &mut self.android,
            DeviceTarget::Ios => &mut self.ios,
            DeviceTarget::Run => &mut self.run,
        }
    }
}

/// Convert an identifier to the kebab-case used for command-line flags.
///
/// Handles camelCase, PascalCase, snake_case and SCREAMING_SNAKE_CASE:
/// `webRenderer`, `WebRenderer` and `WEB_RENDERER` all become `web-renderer`.
/// An acronym followed by a capitalized word is split before the word
/// (`HTMLRenderer` becomes `html-renderer`).
pub fn to_kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join("-")
}
