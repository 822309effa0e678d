//! End-to-end rarity run
//!
//! load → validate → resolve images → tally → score → rank → write.
//!
//! Validation and image lookup both finish before the tally is built, so the
//! scoring core only ever sees a complete, well-formed collection.

use crate::images::ImageResolver;
use crate::spinner::Spinner;
use chrono::{DateTime, Utc};
use rarity_common::config::RarityConfig;
use rarity_common::schema::validate_collection;
use rarity_common::{
    build_tally, build_tally_parallel, rank, score_all, Error, MetadataRecord, NftDocument,
    Result, Tally, ValidationReporter,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Switches for a run that are not part of the resolved configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Fetch missing images through each token's metadata URI
    pub resolve_images: bool,
    /// Build the tally in shards of this many records on the rayon pool
    pub shard_size: Option<usize>,
}

/// Written report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RarityReport {
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    pub tally: Tally,
    /// Rarest first
    pub items: Vec<ReportItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    pub rank: usize,
    pub token_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub total_rarity: f64,
    pub attributes: MetadataRecord,
}

/// Read the collection file
pub fn load_documents(path: &Path) -> Result<Vec<NftDocument>> {
    let raw = std::fs::read_to_string(path)?;
    let docs: Vec<NftDocument> = serde_json::from_str(&raw)?;
    info!("Loaded {} documents from {}", docs.len(), path.display());
    Ok(docs)
}

/// Validate every document, printing failures to `errors_out`.
///
/// Any failure aborts the run before tallying.
pub fn check_documents<W: Write>(docs: &[NftDocument], errors_out: &mut W) -> Result<()> {
    let mut reporter = ValidationReporter::new();
    let failed = validate_collection(docs, &mut reporter);

    if reporter.has_error() {
        reporter.print_errors(errors_out)?;
        return Err(Error::InvalidRecord(format!(
            "{} of {} documents failed validation",
            failed,
            docs.len()
        )));
    }

    debug!(documents = docs.len(), "All documents valid");
    Ok(())
}

/// Rewrite known image links and fetch missing ones when enabled
pub async fn resolve_images(
    docs: &mut [NftDocument],
    resolver: &ImageResolver,
    fetch_missing: bool,
) -> Result<()> {
    let mut fetched = 0usize;

    for doc in docs.iter_mut() {
        let image = match (doc.image.as_deref(), doc.token_uri.as_deref()) {
            (Some(known), _) => resolver.resolve(known),
            (None, Some(token_uri)) if fetch_missing => {
                let fetched_image = resolver.image_for(token_uri).await?;
                debug!(token_id = %doc.token_id, image = %fetched_image, "Image resolved");
                fetched += 1;
                fetched_image
            }
            _ => continue,
        };
        doc.image = Some(image);
    }

    if fetched > 0 {
        info!("Fetched {} token images", fetched);
    }
    Ok(())
}

/// Tally and score a validated collection
pub fn score_documents(docs: &[NftDocument], shard_size: Option<usize>) -> Result<RarityReport> {
    let records: Vec<MetadataRecord> = docs.iter().map(|d| d.attributes.clone()).collect();

    let tally = match shard_size {
        Some(size) => build_tally_parallel(&records, size),
        None => build_tally(&records),
    };
    let scored = score_all(&records, &tally)?;

    let items = rank(&scored)
        .into_iter()
        .map(|ranked| {
            let doc = &docs[ranked.index];
            ReportItem {
                rank: ranked.rank,
                token_id: doc.token_id.clone(),
                name: doc.name.clone(),
                image: doc.image.clone(),
                total_rarity: ranked.total_rarity,
                attributes: scored[ranked.index].record.clone(),
            }
        })
        .collect();

    Ok(RarityReport {
        generated_at: Utc::now(),
        total_records: records.len(),
        tally,
        items,
    })
}

/// Write the report as pretty JSON, creating the directory if needed
pub fn write_report(report: &RarityReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// Run the whole pipeline for `config`
pub async fn run<W: Write>(
    config: &RarityConfig,
    options: &RunOptions,
    spinner: &mut Spinner,
    errors_out: &mut W,
) -> Result<RarityReport> {
    let mut docs = load_documents(&config.input)?;
    check_documents(&docs, errors_out)?;

    let resolver = ImageResolver::new(config.ipfs_gateway.clone(), config.fetch_timeout)?;
    if options.resolve_images {
        spinner.start(Some("Resolving images"));
        let resolved = resolve_images(&mut docs, &resolver, true).await;
        spinner.stop();
        resolved?;
    } else {
        resolve_images(&mut docs, &resolver, false).await?;
    }

    spinner.start(Some("Scoring"));
    let scored = score_documents(&docs, options.shard_size);
    spinner.stop();
    let report = scored?;

    write_report(&report, &config.output_path())?;

    info!(
        records = report.total_records,
        trait_types = report.tally.trait_types().count(),
        "Rarity run complete"
    );
    Ok(report)
}
