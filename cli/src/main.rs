//! bladelint CLI — binary entry point.
//!
//! Two host surfaces over the analysis engine:
//!
//! - `check`: one-shot manual analysis of the given files; exits non-zero
//!   when any error-severity diagnostic is published.
//! - `watch`: maps filesystem write events onto saved-document triggers
//!   and reprints diagnostics as runs publish.

mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bladelint_analysis::{AnalysisTrigger, Analyzer, DiagnosticsSnapshot};
use bladelint_config::BladeConfig;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    // Logs go to stderr; stdout carries diagnostics only.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser)]
#[command(
    name = "bladelint",
    version,
    about = "On-the-fly diagnostics for Blade templates",
    long_about = "bladelint — runs the Blade linter and compile-time syntax check \
                  against template files and reports merged diagnostics.\n\n\
                  Configuration precedence: <root>/.bladelint.toml > ~/.bladelint/config.toml > defaults.",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze files once and print diagnostics
    #[command(
        about = "Analyze files once",
        long_about = "Run both checkers against the given files and print the merged \
                      diagnostics. Exits 1 when any error-severity diagnostic is found.",
        after_help = "Examples:\n  bladelint check resources/views/home.blade.php\n  bladelint check --root /srv/app resources/views/*.blade.php"
    )]
    Check {
        /// Files to analyze (.php / .blade.php)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Workspace root (default: current dir)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Watch a directory and re-analyze files as they change
    #[command(
        about = "Watch a directory",
        long_about = "Watch a directory tree for writes to tracked files, re-running \
                      analysis as they change. Redundant events inside the debounce \
                      window are suppressed.",
        after_help = "Examples:\n  bladelint watch\n  bladelint watch resources/views --root /srv/app"
    )]
    Watch {
        /// Directory to watch (default: workspace root)
        dir: Option<PathBuf>,
        /// Workspace root (default: current dir)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn resolve_root(arg: Option<PathBuf>) -> PathBuf {
    arg.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(root: &std::path::Path) -> BladeConfig {
    match bladelint_config::load(root) {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::info!("no configuration found; using defaults");
            BladeConfig::default()
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

/// Print every published diagnostic, then a compact summary.
fn print_snapshot(snapshot: &DiagnosticsSnapshot) {
    for (path, diagnostics) in snapshot.files() {
        for diagnostic in diagnostics {
            println!("{}", diagnostic.display_with_path(path));
        }
    }
    if !snapshot.is_empty() {
        println!("{}", snapshot.status_string());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Check { paths, root } => {
            let root = resolve_root(root);
            let config = load_config(&root);
            let mut analyzer = Analyzer::new(
                config.analysis.unwrap_or_default(),
                Some(root),
            );

            for path in &paths {
                // A manual run is never debounced; a rejection means the
                // file type is not tracked at all.
                if !analyzer.request(path, AnalysisTrigger::ManualCommand, false) {
                    tracing::warn!("skipping {}: not a PHP or Blade file", path.display());
                }
            }
            analyzer.drain().await;

            let snapshot = analyzer.snapshot();
            print_snapshot(&snapshot);
            if snapshot.error_count() > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Watch { dir, root } => {
            let root = resolve_root(root);
            let config = load_config(&root);
            let dir = dir.unwrap_or_else(|| root.clone());
            let mut analyzer = Analyzer::new(
                config.analysis.unwrap_or_default(),
                Some(root),
            );
            watch::run(&mut analyzer, &dir).await
        }
    }
}
