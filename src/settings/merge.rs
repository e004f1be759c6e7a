//! Precedence merge
//!
//! Combines the Dev baseline and the Local override into one effective
//! settings object:
//! - Well-known scalars: Dev, else Local, else built-in default
//! - Maps (options, dart defines): Dev entries, Local only fills gaps
//! - Flags: Dev flags, then Local flags not already present (first seen wins)

use indexmap::IndexMap;

use super::model::{
    DeviceSpecificSettings, DeviceTarget, EffectiveSettings, LayerSettings, WebSettings,
    DEFAULT_WEB_PORT, DEFAULT_WEB_RENDERER,
};

/// Add every entry of `source` whose key is not already in `target`
fn fill_gaps<V: Clone>(target: &mut IndexMap<String, V>, source: &IndexMap<String, V>) {
    for (key, value) in source {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Append every flag of `source` not already in `target`, keeping order
fn union_flags(target: &mut Vec<String>, source: &[String]) {
    for flag in source {
        if !target.contains(flag) {
            target.push(flag.clone());
        }
    }
}

/// Merge device settings given in precedence order (baseline first).
///
/// Earlier sections win option collisions; flags keep first-seen order.
pub fn merge_device<'a, I>(sections: I) -> DeviceSpecificSettings
where
    I: IntoIterator<Item = &'a DeviceSpecificSettings>,
{
    sections
        .into_iter()
        .fold(DeviceSpecificSettings::default(), |mut merged, section| {
            fill_gaps(&mut merged.options, &section.options);
            union_flags(&mut merged.flags, &section.flags);
            merged
        })
}

/// Merge the two layers. A missing layer contributes nothing.
pub fn merge_layers(dev: Option<&LayerSettings>, local: Option<&LayerSettings>) -> EffectiveSettings {
    // Precedence order: Dev is the baseline that wins, Local fills gaps
    let layers: Vec<&LayerSettings> = [dev, local].into_iter().flatten().collect();

    let web_port = layers
        .iter()
        .find_map(|l| l.web.as_ref().and_then(|w| w.web_port))
        .unwrap_or(DEFAULT_WEB_PORT);
    let web_renderer = layers
        .iter()
        .find_map(|l| l.web.as_ref().and_then(|w| w.web_renderer.clone()))
        .unwrap_or_else(|| DEFAULT_WEB_RENDERER.to_string());

    let mut dart_defines = IndexMap::new();
    for defines in layers.iter().filter_map(|l| l.dart_defines.as_ref()) {
        fill_gaps(&mut dart_defines, defines);
    }

    let mut effective = EffectiveSettings {
        web: WebSettings {
            web_port,
            web_renderer,
            device: DeviceSpecificSettings::default(),
        },
        dart_defines,
        ..Default::default()
    };

    for target in DeviceTarget::ALL {
        *effective.device_mut(target) =
            merge_device(layers.iter().copied().filter_map(|l| l.device(target)));
    }

    effective
}
