//! Reflect pipeline
//!
//! Loads both layers, merges them, and reflects the effective settings to:
//! 1. The Flutter run configuration (`additionalArgs`)
//! 2. The Android Studio workspace (Gradle `COMMAND_LINE_OPTIONS`)
//! 3. The Xcode project, via `flutter build ios --config-only`

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

use crate::config::ReflectConfig;
use crate::document::{upsert, Document, DocumentError, PatchOutcome, Selector, Step};
use crate::error::SettingsError;
use crate::projection::{ios_config_argv, native_build_property, run_configuration_args};
use crate::settings::{EffectiveSettings, LayerError, LoadedLayers};

/// Run configuration written when the project has none yet
const RUN_CONFIGURATION_TEMPLATE: &str = r#"<component name="ProjectRunConfigurationManager">
  <configuration default="false" name="main.dart" type="FlutterRunConfigurationType" factoryName="Flutter">
    <option name="filePath" value="$PROJECT_DIR$/lib/main.dart" />
    <method v="2" />
  </configuration>
</component>"#;

/// Errors from any reflect step
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to patch {}: {source}", .path.display())]
    Patch {
        path: PathBuf,
        source: SettingsError,
    },

    #[error("Failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{program} exited with {status}")]
    BuildFailed { program: String, status: ExitStatus },
}

/// Selects `additionalArgs` of the first run configuration
pub fn run_configuration_selector() -> Selector {
    Selector::new(
        "component",
        vec![
            Step::element("configuration"),
            Step::keyed("option", "name", "additionalArgs"),
        ],
        "value",
    )
}

/// Selects the Gradle command-line options of the Android Studio workspace
pub fn android_gradle_selector() -> Selector {
    Selector::new(
        "project",
        vec![
            Step::keyed("component", "name", "AndroidGradleBuildConfiguration"),
            Step::keyed("option", "name", "COMMAND_LINE_OPTIONS"),
        ],
        "value",
    )
}

/// What reflect did to each target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectReport {
    pub run_configuration: PatchOutcome,

    /// `None` when the Android Studio workspace does not exist yet
    pub android_workspace: Option<PatchOutcome>,

    /// `None` when the iOS step is disabled
    pub ios: Option<ExitStatus>,
}

/// Upsert into a loaded document and write it back if anything changed
fn patch_file(
    path: &Path,
    document: &mut Document,
    value: &str,
    selector: &Selector,
) -> Result<PatchOutcome, ReflectError> {
    let outcome = upsert(document, selector, value).map_err(|source| ReflectError::Patch {
        path: path.to_path_buf(),
        source,
    })?;
    if outcome != PatchOutcome::Unchanged {
        document.write_to_file(path)?;
    }
    debug!(path = %path.display(), ?outcome, "patched document");
    Ok(outcome)
}

/// Write the run/debug arguments into the run configuration, creating it
/// from a template if missing
pub fn reflect_run_configuration(
    path: &Path,
    settings: &EffectiveSettings,
) -> Result<PatchOutcome, ReflectError> {
    info!(path = %path.display(), "reflecting Flutter run/debug configuration");

    let mut document = if path.exists() {
        Document::from_file(path)?
    } else {
        warn!(path = %path.display(), "run configuration missing, creating it");
        Document::parse(RUN_CONFIGURATION_TEMPLATE).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    patch_file(
        path,
        &mut document,
        &run_configuration_args(settings),
        &run_configuration_selector(),
    )
}

/// Write the Gradle dart-defines property into the Android Studio workspace.
///
/// The workspace only exists once the Android project has been opened in
/// the IDE; until then this step is skipped with a warning.
pub fn reflect_android_workspace(
    path: &Path,
    settings: &EffectiveSettings,
    require_dart_defines: bool,
) -> Result<Option<PatchOutcome>, ReflectError> {
    info!(path = %path.display(), "reflecting native Android project");

    if !path.exists() {
        warn!(
            "Could not find {}. Open the android project once with Android Studio \
             (`studio android`) or IntelliJ IDEA (`idea android`) from the project root.",
            path.display()
        );
        return Ok(None);
    }

    let property = native_build_property(&settings.dart_defines, require_dart_defines)?;
    let mut document = Document::from_file(path)?;
    patch_file(path, &mut document, &property, &android_gradle_selector()).map(Some)
}

/// Run `flutter build ios --config-only`, streaming its output through
pub fn reflect_ios(
    project_root: &Path,
    flutter: &str,
    settings: &EffectiveSettings,
) -> Result<ExitStatus, ReflectError> {
    info!("reflecting native iOS project");

    // The executable may carry a prefix such as `fvm flutter`
    let mut words = shlex::split(flutter)
        .ok_or_else(|| SettingsError::UnbalancedQuotes(flutter.to_string()))?
        .into_iter();
    let program = words.next().unwrap_or_else(|| "flutter".to_string());
    let mut argv: Vec<String> = words.collect();
    argv.extend(ios_config_argv(settings)?);

    info!("running: {} {}", program, argv.join(" "));

    let status = Command::new(&program)
        .args(&argv)
        .current_dir(project_root)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| ReflectError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(ReflectError::BuildFailed { program, status });
    }
    Ok(status)
}

/// Run the whole pipeline for a project root
pub fn reflect(project_root: &Path, config: &ReflectConfig) -> Result<ReflectReport, ReflectError> {
    let layers = LoadedLayers::load(project_root)?;
    for source in layers.sources() {
        debug!(layer = %source.layer, path = %source.path, digest = %source.digest, "using layer");
    }
    let settings = layers.resolve();

    let run_configuration = reflect_run_configuration(
        &config.run_configuration_path(project_root),
        &settings,
    )?;
    let android_workspace = reflect_android_workspace(
        &config.android_workspace_path(project_root),
        &settings,
        config.require_dart_defines,
    )?;
    let ios = if config.ios {
        Some(reflect_ios(project_root, &config.flutter, &settings)?)
    } else {
        debug!("iOS step disabled");
        None
    };

    Ok(ReflectReport {
        run_configuration,
        android_workspace,
        ios,
    })
}
