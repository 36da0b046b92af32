//! NF-e audit command line
//!
//! Prints one JSON report per document on stdout, in argument order. Logs
//! go to stderr.

use anyhow::Context;
use clap::Parser;
use nfe_pipeline::{Config, Pipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tax_audit::read_orders_file;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable naming a TOML config file
const CONFIG_ENV: &str = "NFE_AUDIT_CONFIG";

#[derive(Parser, Debug)]
#[command(name = "nfe-audit", version, about = "Audit NF-e documents")]
struct Cli {
    /// NF-e XML files
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Purchase-order sheet (CSV) to reconcile every document against
    #[arg(long)]
    orders: Option<PathBuf>,

    /// TOML config file; falls back to NFE_AUDIT_CONFIG, then the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Pretty-print reports
    #[arg(long)]
    pretty: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

    match path {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            Config::from_file(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => {
            info!("Loading config from environment variables");
            Ok(Config::from_env()?)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = load_config(&cli)?;
    let orders = match &cli.orders {
        Some(path) => Some(Arc::new(
            read_orders_file(path).with_context(|| format!("reading {}", path.display()))?,
        )),
        None => None,
    };

    let pipeline = Arc::new(Pipeline::new(&config)?);
    info!("Auditing {} documents", cli.documents.len());

    let tasks: Vec<_> = cli
        .documents
        .iter()
        .cloned()
        .map(|path| {
            let pipeline = pipeline.clone();
            let orders = orders.clone();
            tokio::spawn(async move {
                pipeline
                    .process_file(&path, orders.as_deref().map(Vec::as_slice))
                    .await
            })
        })
        .collect();

    let total = tasks.len();
    let mut failures = 0;
    for task in tasks {
        match task.await? {
            Ok(report) => {
                let json = if cli.pretty {
                    serde_json::to_string_pretty(&report)?
                } else {
                    serde_json::to_string(&report)?
                };
                println!("{}", json);
            }
            Err(e) => {
                failures += 1;
                error!("Document {} failed: {}", e.document().unwrap_or("?"), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} documents failed", failures, total);
    }
    Ok(())
}
