// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! ctxweave main entry point - CLI and commands.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use ctxweave::config::{self, CliOptions, ResolvedConfig};
use ctxweave::orchestrator::{self, stdout_emitter, RunSettings, RunSummary};
use ctxweave::telemetry::{init_telemetry, TelemetryConfig, GLOBAL_METRICS};
use ctxweave::transform::TransformKind;

/// ctxweave - Context parameters and tracing spans for Go packages.
#[derive(Parser)]
#[command(name = "ctxweave")]
#[command(
    author,
    version,
    about = "Context parameters and tracing spans for Go packages",
    long_about = None
)]
struct Cli {
    /// Log one line per processed file
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Show debug output and a metrics report
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for ctxweave.
#[derive(Subcommand)]
enum Commands {
    /// Add a leading context parameter to every function and interface method
    Context(RunArgs),

    /// Open and close a tracing span in every function with a context parameter
    Trace(RunArgs),

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Arguments shared by the transform subcommands.
#[derive(Args)]
struct RunArgs {
    /// Descend into subdirectories
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Overwrite input files instead of writing prefixed copies
    #[arg(short = 'u', long)]
    rewrite: bool,

    /// Print results to stdout without touching any file
    #[arg(short = 'n', long)]
    dry: bool,

    /// Directories to process
    #[arg(required = true)]
    dirs: Vec<PathBuf>,
}

impl RunArgs {
    /// Flags left unset fall through to configuration files.
    fn cli_options(&self) -> CliOptions {
        CliOptions {
            recursive: self.recursive.then_some(true),
            rewrite: self.rewrite.then_some(true),
            dry_run: self.dry.then_some(true),
        }
    }
}

/// Config subcommand actions.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _telemetry = init_telemetry(&TelemetryConfig::from_flags(cli.verbose, cli.debug))?;
    let report = cli.verbose || cli.debug;

    match cli.command {
        Commands::Context(args) => run_transform(TransformKind::Context, args, report).await,
        Commands::Trace(args) => run_transform(TransformKind::Trace, args, report).await,
        Commands::Config { action } => {
            let cwd = std::env::current_dir()?;
            match action {
                Some(ConfigAction::Show) | None => {
                    let config = resolve_config(&cwd, CliOptions::default());
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
            }
            Ok(())
        }
    }
}

async fn run_transform(kind: TransformKind, args: RunArgs, report: bool) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = resolve_config(&cwd, args.cli_options());

    let roots: Vec<PathBuf> = args.dirs.iter().map(|dir| cwd.join(dir)).collect();
    let transform = kind.build(&config);
    let settings = RunSettings::from_config(&config);

    let summary = orchestrator::run(roots, settings, transform, stdout_emitter()).await;

    info!(
        written = summary.written,
        emitted = summary.emitted,
        skipped = summary.skipped,
        failed = summary.failed,
        failed_roots = summary.failed_roots,
        "Run complete"
    );

    if report {
        print_summary(&summary);
        eprintln!("{}", GLOBAL_METRICS.snapshot().format_report().dimmed());
    }

    Ok(())
}

/// Load configuration for `cwd`, falling back to defaults when it cannot be read.
fn resolve_config(cwd: &Path, cli_options: CliOptions) -> ResolvedConfig {
    let workspace_root = config::find_workspace_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
    match config::load_config(&workspace_root, cli_options.clone()) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load configuration, using defaults");
            config::merge_config(None, None, None, cli_options)
        }
    }
}

fn print_summary(summary: &RunSummary) {
    eprintln!(
        "{} {} files: {} written, {} emitted, {} skipped",
        "ctxweave".bright_blue().bold(),
        summary.total(),
        summary.written.to_string().green(),
        summary.emitted,
        summary.skipped,
    );
    if summary.has_failures() {
        eprintln!(
            "{}",
            format!(
                "{} files and {} directories failed, see log",
                summary.failed, summary.failed_roots
            )
            .red()
        );
    }
}
