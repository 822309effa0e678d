//! rarity-gen - NFT collection rarity generator
//!
//! Reads a collection of token metadata documents, scores every token by how
//! uncommon its trait values are, and writes a ranked JSON report.

use anyhow::Result;
use clap::Parser;
use rarity_common::config::ConfigOverrides;
use rarity_gen::startup::start;
use rarity_gen::{run, RunOptions, Spinner};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "rarity-gen", version, about = "NFT collection rarity generator")]
struct Cli {
    /// Collection file (JSON array of token documents)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Report file stem
    #[arg(long)]
    file_name: Option<String>,

    /// TOML config file
    #[arg(short, long, env = "RARITY_CONFIG")]
    config: Option<PathBuf>,

    /// Gateway replacing ipfs:// in links
    #[arg(long)]
    ipfs_gateway: Option<String>,

    /// Per-request timeout for metadata lookups, in seconds
    #[arg(long)]
    fetch_timeout: Option<u64>,

    /// Fetch images missing from documents through their tokenUri
    #[arg(long, default_value_t = false)]
    resolve_images: bool,

    /// Build the tally in parallel shards of this many records
    #[arg(long)]
    shard_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        input: cli.input,
        output_dir: cli.output_dir,
        file_name: cli.file_name,
        ipfs_gateway: cli.ipfs_gateway,
        fetch_timeout_secs: cli.fetch_timeout,
        log_level: cli.log_level,
    };
    let (config, _logging) = start(&overrides, cli.config.as_deref())?;

    info!("Starting rarity-gen v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {}", config.input.display());
    info!("Output: {}", config.output_path().display());

    let options = RunOptions {
        resolve_images: cli.resolve_images,
        shard_size: cli.shard_size,
    };

    let mut spinner = Spinner::new("Rarity generator");
    let mut stdout = std::io::stdout();

    match run(&config, &options, &mut spinner, &mut stdout).await {
        Ok(report) => {
            if let Some(top) = report.items.first() {
                info!(
                    "Rarest token: #{} (total rarity {:.2})",
                    top.token_id, top.total_rarity
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("Rarity run failed: {}", e);
            Err(e.into())
        }
    }
}
