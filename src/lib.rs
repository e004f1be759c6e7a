//! Flutter App Settings
//!
//! Resolves a project's layered `appsettings` documents (a checked-in Dev
//! baseline plus a personal Local override) into one effective settings
//! object and reflects it into the places a Flutter build reads from: run
//! configuration arguments, the Gradle dart-defines property, and the
//! Xcode project generated by `flutter build ios --config-only`.

pub mod bootstrap;
pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod projection;
pub mod reflect;
pub mod settings;

pub use config::ReflectConfig;
pub use document::{upsert, Document, PatchOutcome, Selector, Step};
pub use error::SettingsError;
pub use settings::{
    merge_layers, DeviceSpecificSettings, DeviceTarget, EffectiveSettings, EnvironmentLayer,
    LoadedLayers, ScalarValue, WebSettings,
};
