//! Fuse CLI - Livewire binding checks

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use fuse_native::{CheckConfig, CheckReport, Checker, FuseError};

#[derive(Parser)]
#[command(name = "fuse")]
#[command(about = "Fuse - static analysis for Livewire $wire bindings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check wire: directives and $wire references against component APIs
    Check {
        /// Application root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Config file (default: <root>/fuse.json when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Check components in parallel
        #[arg(long)]
        parallel: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            root,
            config,
            format,
            parallel,
        } => run_check(root, config, format, parallel),
    };

    match result {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run_check(
    root: PathBuf,
    config_path: Option<PathBuf>,
    format: Format,
    parallel: bool,
) -> Result<CheckReport, FuseError> {
    let mut config = CheckConfig::load(&root, config_path.as_deref())?;
    config.parallel |= parallel;

    if let Format::Text = format {
        println!("{} Running Fuse static analysis checks...", "🔍".cyan());
        println!();
    }

    let report = Checker::new(root, config)?.run();

    match format {
        Format::Text => print_text(&report),
        Format::Json => println!("{}", report.to_json()?),
    }

    Ok(report)
}

fn print_text(report: &CheckReport) {
    if report.is_clean() {
        println!(
            "{} All $wire binding checks passed! ({} components, {} templates)",
            "✓".green(),
            report.components,
            report.templates
        );
        return;
    }

    println!(
        "{} Found {} $wire binding issue(s):",
        "✗".red(),
        report.errors.len()
    );
    println!();

    for error in &report.errors {
        println!("{}", format!("• {}: {}", error.kind, error.message).red());
        println!("  File: {}:{}", error.file.display(), error.line);
        println!();
    }
}
