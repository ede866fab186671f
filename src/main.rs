use std::path::{Path, PathBuf};
use std::sync::Arc;

use admission_campaign::catalog::{Catalog, ProgramId, Variant};
use admission_campaign::config::{Config, ConfigOverrides};
use admission_campaign::output::json::render_json;
use admission_campaign::output::ReportFormat;
use admission_campaign::pipeline::{run_campaign, RunSettings};
use admission_campaign::portal::PortalClient;
use admission_campaign::snapshot::SnapshotStore;
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "admission-campaign",
    about = "Admissions rating poller with per-program agreement deltas"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,
    #[arg(long, value_enum)]
    variant: Option<Variant>,
    #[arg(short = 'p', long)]
    programs: Option<String>,
    #[arg(long)]
    snapshot: Option<String>,
    #[arg(long)]
    message: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        variant: cli.variant,
        format: cli.format,
        enabled_programs: cli
            .programs
            .as_deref()
            .map(|raw| {
                parse_program_list(raw).map(|ids| {
                    ids.into_iter()
                        .map(|id| id.as_slug().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .transpose()?,
        snapshot_path: cli.snapshot.clone(),
        message_path: cli.message.clone(),
    });

    if let Some(Commands::Config { init, show }) = &cli.command {
        return handle_config_command(*init, *show, &config, &config_path);
    }

    let variant = config.programs.variant;
    let selected = config.selected_programs()?;
    let catalog = Arc::new(Catalog::for_variant(variant).restrict(&selected));
    let client = PortalClient::new(&config.portal, Arc::clone(&catalog))?;
    info!(
        "polling {} programs at {} ({:?} variant)",
        catalog.len(),
        client.url(),
        variant
    );

    let store = SnapshotStore::open(config.resolved_snapshot_path());
    let settings = RunSettings {
        variant,
        format: config.report.format,
        options: config.render_options(),
        message_path: config.resolved_message_path(),
    };
    let outcome = run_campaign(Arc::new(client), &catalog, &store, &settings).await?;

    print!("{}", outcome.message);
    println!("Fetch is done.");
    Ok(())
}

fn handle_config_command(
    init: bool,
    show: bool,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn parse_program_list(raw: &str) -> Result<Vec<ProgramId>> {
    let mut out = Vec::new();
    for piece in raw.split(',') {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push(trimmed.parse::<ProgramId>()?);
    }
    if out.is_empty() {
        return Err(anyhow!("program filter is empty"));
    }
    out.sort();
    out.dedup();
    Ok(out)
}
