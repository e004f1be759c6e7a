//! Argument projection
//!
//! Pure functions from effective settings to the strings external tools
//! consume. Every token in a string projection is prefixed by one space so
//! projections can be concatenated; callers trim the leading space where a
//! standalone value is needed.

use base64::Engine;
use indexmap::IndexMap;

use crate::error::SettingsError;
use crate::settings::{
    to_kebab_case, DeviceSpecificSettings, DeviceTarget, EffectiveSettings, ScalarValue,
    WebSettings,
};

/// Gradle property carrying the encoded dart defines
pub const DART_DEFINES_PROPERTY: &str = "dart-defines";

/// `--dart-define=<key>=<value>` per define, in map order
pub fn dart_define_args(dart_defines: &IndexMap<String, ScalarValue>) -> String {
    dart_define_argv(dart_defines)
        .iter()
        .map(|token| format!(" {}", token))
        .collect()
}

pub fn dart_define_argv(dart_defines: &IndexMap<String, ScalarValue>) -> Vec<String> {
    dart_defines
        .iter()
        .map(|(key, value)| format!("--dart-define={}={}", key, value))
        .collect()
}

/// `--web-renderer <value> --web-port <value>`, always both
pub fn web_args(web: &WebSettings) -> String {
    format!(
        " --{} {} --{} {}",
        to_kebab_case("webRenderer"),
        web.web_renderer,
        to_kebab_case("webPort"),
        web.web_port
    )
}

/// Options as `--<kebab-key> <value>`, then flags verbatim.
///
/// A null option renders as a bare `--<kebab-key>` switch. Flags get no
/// prefix: they may be short switches or carry their own value.
pub fn device_args(device: &DeviceSpecificSettings) -> String {
    let mut out = String::new();
    for (key, value) in &device.options {
        out.push_str(" --");
        out.push_str(&to_kebab_case(key));
        if !value.is_null() {
            out.push(' ');
            out.push_str(&value.to_string());
        }
    }
    for flag in &device.flags {
        out.push(' ');
        out.push_str(flag);
    }
    out
}

/// Argument vector form of [`device_args`] for spawning a process directly.
///
/// Option values stay single arguments even when they contain spaces. A
/// flag is split with shell quoting rules, so `--out="a b"` stays one
/// argument; an unclosed quote is an error.
pub fn device_argv(device: &DeviceSpecificSettings) -> Result<Vec<String>, SettingsError> {
    let mut argv = Vec::new();
    for (key, value) in &device.options {
        argv.push(format!("--{}", to_kebab_case(key)));
        if !value.is_null() {
            argv.push(value.to_string());
        }
    }
    for flag in &device.flags {
        let words =
            shlex::split(flag).ok_or_else(|| SettingsError::UnbalancedQuotes(flag.clone()))?;
        argv.extend(words);
    }
    Ok(argv)
}

/// `-Pdart-defines=<b64(k=v)>,<b64(k=v)>,...` for Gradle.
///
/// With no defines this is the bare `-Pdart-defines=` prefix, unless the
/// caller requires at least one token.
pub fn native_build_property(
    dart_defines: &IndexMap<String, ScalarValue>,
    require_non_empty: bool,
) -> Result<String, SettingsError> {
    if require_non_empty && dart_defines.is_empty() {
        return Err(SettingsError::EmptyDefineSet);
    }

    let tokens: Vec<String> = dart_defines
        .iter()
        .map(|(key, value)| {
            base64::engine::general_purpose::STANDARD.encode(format!("{}={}", key, value))
        })
        .collect();

    Ok(format!("-P{}={}", DART_DEFINES_PROPERTY, tokens.join(",")))
}

/// Value for the `additionalArgs` option of the run configuration:
/// web args, dart defines, then run-target options and flags
pub fn run_configuration_args(settings: &EffectiveSettings) -> String {
    let args = format!(
        "{}{}{}",
        web_args(&settings.web),
        dart_define_args(&settings.dart_defines),
        device_args(settings.device(DeviceTarget::Run))
    );
    args.trim_start().to_string()
}

/// Arguments for `flutter build ios --config-only`
pub fn ios_config_argv(settings: &EffectiveSettings) -> Result<Vec<String>, SettingsError> {
    let mut argv: Vec<String> = ["build", "ios", "--config-only", "--no-codesign"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    argv.extend(dart_define_argv(&settings.dart_defines));
    argv.extend(device_argv(settings.device(DeviceTarget::Ios))?);
    Ok(argv)
}
