//! Stencil - remote template fetcher
//!
//! Usage:
//!   stencil fetch <reference> [destination]   # Materialise a template
//!   stencil resolve <reference>               # Show how a reference parses
//!   stencil config                            # Print the effective config

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stencil_core::config::{StencilConfig, default_config_path, to_toml};
use stencil_core::fetch::{FetchOptions, FetchReport, TemplateFetcher};
use stencil_core::reference::{TemplateSpec, normalize};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Fetch project templates from GitHub and Codeberg", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true, value_name = "PATH", env = "STENCIL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a template into a directory
    ///
    /// Accepts `owner/repo[/path][#ref]`, `github:` and `codeberg:` prefixes,
    /// `git@` SSH addresses and browser URLs.
    Fetch {
        /// Template reference
        reference: String,

        /// Destination directory
        #[arg(default_value = ".")]
        destination: PathBuf,

        /// Report strategy selection and fallbacks
        #[arg(short = 'v', long)]
        verbose: bool,

        /// Write into a non-empty destination
        #[arg(short, long)]
        force: bool,
    },

    /// Show how a reference is normalized and parsed
    Resolve {
        /// Template reference
        reference: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Fetch { verbose: true, .. } => "stencil=debug,info",
        _ => "stencil=info,warn",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.clone().or_else(default_config_path);
    let config = match &config_path {
        Some(path) => StencilConfig::load_from(path)?,
        None => StencilConfig::default(),
    };
    tracing::debug!(
        path = ?config_path,
        user_agent = %config.http.user_agent,
        shallow = config.clone.shallow,
        "loaded configuration"
    );

    match cli.command {
        Commands::Fetch {
            reference,
            destination,
            verbose,
            force,
        } => run_fetch(&config, &reference, &destination, verbose, force).await,
        Commands::Resolve { reference, format } => run_resolve(&reference, format),
        Commands::Config => {
            print!("{}", to_toml(&config)?);
            Ok(())
        }
    }
}

async fn run_fetch(
    config: &StencilConfig,
    reference: &str,
    destination: &Path,
    verbose: bool,
    force: bool,
) -> Result<()> {
    if force {
        tracing::debug!(dest = %destination.display(), "skipping emptiness check");
    } else if !is_empty_dir(destination)? {
        anyhow::bail!(
            "Destination {} is not empty (use --force to write into it)",
            destination.display()
        );
    }

    let fetcher = TemplateFetcher::from_config(config)?;
    let options = FetchOptions::default().with_verbose(verbose);
    let report = fetcher
        .fetch(reference, destination, &options)
        .await
        .with_context(|| format!("Failed to fetch {reference}"))?;

    tracing::debug!(
        canonical = %report.canonical,
        strategy = %report.strategy,
        fell_back = report.fell_back,
        files = ?report.files,
        "fetch complete"
    );
    print_report(&report, destination);
    Ok(())
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if !path.is_dir() {
        anyhow::bail!("Destination {} is not a directory", path.display());
    }
    let mut entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read destination: {}", path.display()))?;
    Ok(entries.next().is_none())
}

fn print_report(report: &FetchReport, destination: &Path) {
    let via = if report.fell_back {
        format!("{} (fallback)", report.strategy)
    } else {
        report.strategy.to_string()
    };
    match report.files {
        Some(files) => println!(
            "Fetched {} into {} via {} ({} files)",
            report.canonical,
            destination.display(),
            via,
            files
        ),
        None => println!(
            "Fetched {} into {} via {}",
            report.canonical,
            destination.display(),
            via
        ),
    }
}

fn run_resolve(reference: &str, format: OutputFormat) -> Result<()> {
    let normalized = normalize(reference);
    let parsed = normalized
        .provider
        .map(|provider| TemplateSpec::parse(provider, &normalized.canonical));

    match format {
        OutputFormat::Json => {
            let (spec, error) = match &parsed {
                Some(Ok(spec)) => (Some(spec), None),
                Some(Err(e)) => (None, Some(e.to_string())),
                None => (None, None),
            };
            let value = serde_json::json!({
                "input": reference,
                "canonical": normalized.canonical,
                "provider": normalized.provider,
                "spec": spec,
                "single_file": spec.map(TemplateSpec::is_single_file),
                "error": error,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            println!("{:<12} {}", "input", reference);
            println!("{:<12} {}", "canonical", normalized.canonical);
            match normalized.provider {
                Some(provider) => println!("{:<12} {}", "provider", provider),
                None => println!("{:<12} (none, passed to clone as-is)", "provider"),
            }
            match &parsed {
                Some(Ok(spec)) => {
                    println!("{:<12} {}", "owner", spec.owner);
                    println!("{:<12} {}", "repo", spec.repo);
                    println!("{:<12} {}", "ref", spec.git_ref);
                    println!("{:<12} {}", "subpath", display_subpath(&spec.subpath));
                    let kind = if spec.is_single_file() { "file" } else { "directory" };
                    println!("{:<12} {}", "kind", kind);
                }
                Some(Err(e)) => println!("{:<12} {}", "error", e),
                None => {}
            }
        }
    }
    Ok(())
}

fn display_subpath(subpath: &str) -> &str {
    if subpath.is_empty() { "(root)" } else { subpath }
}
