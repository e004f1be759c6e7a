//! Settings resolution
//!
//! Two environment layers are merged into one effective settings object:
//! 1. Dev (`appsettings.dev.json`), the checked-in baseline
//! 2. Local (`appsettings.json`), a personal additive override

mod layer;
mod merge;
mod model;
mod value;

pub use layer::{
    layer_path, load_layer, AppSettingsDocument, DeviceSection, EnvironmentLayer, LayerError,
    LayerSource, LoadedLayer, LoadedLayers, WebSection,
};
pub use merge::{merge_device, merge_layers};
pub use model::{
    to_kebab_case, DeviceSpecificSettings, DeviceTarget, EffectiveSettings, LayerSettings,
    WebLayer, WebSettings, DEFAULT_WEB_PORT, DEFAULT_WEB_RENDERER,
};
pub use value::ScalarValue;

impl LoadedLayers {
    /// Merge the loaded layers
    pub fn resolve(&self) -> EffectiveSettings {
        merge_layers(
            self.dev.as_ref().map(|l| &l.settings),
            self.local.as_ref().map(|l| &l.settings),
        )
    }
}
