//! Flutter App Settings CLI
//!
//! Entry point for the `flutter-appsettings` command-line tool.

use clap::{Parser, Subcommand};
use flutter_appsettings::bootstrap::bootstrap;
use flutter_appsettings::discovery::find_project_root;
use flutter_appsettings::projection::{
    ios_config_argv, native_build_property, run_configuration_args,
};
use flutter_appsettings::reflect::{reflect, ReflectError};
use flutter_appsettings::{EnvironmentLayer, LoadedLayers, PatchOutcome, ReflectConfig};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;

#[derive(Parser)]
#[command(name = "flutter-appsettings")]
#[command(about = "Layered appsettings for Flutter projects", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the project with a new settings file
    Bootstrap {
        /// The project path (default: nearest directory with pubspec.yaml)
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,

        /// Environment of the generated file (local, dev)
        #[arg(long, short = 'c', default_value = "local")]
        config: EnvironmentLayer,
    },

    /// Reflect the current settings to run/debug configurations and native projects
    Reflect {
        /// The project path (default: nearest directory with pubspec.yaml)
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,

        /// Skip `flutter build ios --config-only`
        #[arg(long)]
        no_ios: bool,

        /// Flutter executable (overrides appsettings.toml)
        #[arg(long)]
        flutter: Option<String>,
    },

    /// Print the effective settings
    Show {
        /// The project path (default: nearest directory with pubspec.yaml)
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,

        /// Print the projected arguments instead of JSON
        #[arg(long)]
        args: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Bootstrap { path, config } => run_bootstrap(path, config),
        Commands::Reflect {
            path,
            no_ios,
            flutter,
        } => run_reflect(path, no_ios, flutter),
        Commands::Show { path, args } => run_show(path, args),
    }
}

/// Logs go to stderr; command output stays on stdout.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
    if let Err(e) = result {
        eprintln!("Warning: could not initialize logging: {}", e);
    }
}

fn project_root(path: Option<PathBuf>) -> PathBuf {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error reading current directory: {}", e);
            process::exit(1);
        }
    };

    match find_project_root(path.as_deref(), &cwd) {
        Ok(root) => {
            debug!(root = %root.display(), "project root");
            root
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn load_config(root: &Path) -> ReflectConfig {
    match ReflectConfig::load(root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_bootstrap(path: Option<PathBuf>, layer: EnvironmentLayer) {
    let root = project_root(path);

    match bootstrap(&root, layer) {
        Ok(path) => println!("Created {}", path.display()),
        Err(e) => {
            eprintln!("Error: {}. Terminating operation...", e);
            process::exit(1);
        }
    }
}

fn describe(outcome: PatchOutcome) -> &'static str {
    match outcome {
        PatchOutcome::Unchanged => "already up to date",
        PatchOutcome::Updated => "updated",
        PatchOutcome::Created => "created",
    }
}

fn run_reflect(path: Option<PathBuf>, no_ios: bool, flutter: Option<String>) {
    let root = project_root(path);

    let mut config = load_config(&root);
    if no_ios {
        config.ios = false;
    }
    if let Some(flutter) = flutter {
        config.flutter = flutter;
    }

    match reflect(&root, &config) {
        Ok(report) => {
            println!("Run configuration: {}", describe(report.run_configuration));
            match report.android_workspace {
                Some(outcome) => println!("Android workspace: {}", describe(outcome)),
                None => println!("Android workspace: skipped (not found)"),
            }
            if report.ios.is_none() {
                println!("iOS project: skipped");
            } else {
                println!("iOS project: configured");
            }
            println!("Done reflecting settings.");
        }
        Err(ReflectError::BuildFailed { program, status }) => {
            eprintln!("Error: {} exited with {}", program, status);
            process::exit(status.code().unwrap_or(1));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_show(path: Option<PathBuf>, args: bool) {
    let root = project_root(path);

    let layers = match LoadedLayers::load(&root) {
        Ok(layers) => layers,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let settings = layers.resolve();

    if args {
        let config = load_config(&root);
        println!("Run configuration: {}", run_configuration_args(&settings));
        match native_build_property(&settings.dart_defines, config.require_dart_defines) {
            Ok(property) => println!("Android Gradle:    {}", property),
            Err(e) => println!("Android Gradle:    ({})", e),
        }
        match ios_config_argv(&settings) {
            Ok(argv) => println!("iOS:               {} {}", config.flutter, argv.join(" ")),
            Err(e) => println!("iOS:               ({})", e),
        }
        return;
    }

    let output = serde_json::json!({
        "settings": settings,
        "sources": layers.sources(),
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
