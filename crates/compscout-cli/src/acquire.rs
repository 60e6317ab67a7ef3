//! Acquisition command handlers for the CLI.

use std::path::Path;
use std::sync::Arc;

use compscout_core::AppConfig;
use compscout_crawler::{
    AcquisitionJob, AcquisitionSink, Acquirer, ContentSaver, CrawlerChain, JsonlSink,
};

/// Wires the standard chain, a saver rooted at the storage path, and the
/// JSONL journal beside it.
pub(crate) fn build_acquirer(config: &AppConfig) -> anyhow::Result<Acquirer> {
    let chain = CrawlerChain::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build crawler chain: {e}"))?;
    tracing::debug!(strategies = ?chain.strategy_names(), "crawler chain ready");

    let saver = ContentSaver::new(&config.storage_path)?;
    let sink: Arc<dyn AcquisitionSink> =
        Arc::new(JsonlSink::in_storage_root(&config.storage_path));

    Ok(Acquirer::new(chain, saver, sink))
}

/// Crawls and saves one page, printing where it landed.
///
/// # Errors
///
/// Returns an error if every strategy failed or the page could not be saved.
pub(crate) async fn run_crawl(config: &AppConfig, job: &AcquisitionJob) -> anyhow::Result<()> {
    let acquirer = build_acquirer(config)?;
    let saved = acquirer.acquire_one(job).await?;

    println!(
        "saved '{}' -> {} ({} images)",
        saved.title,
        saved.content_path.display(),
        saved.image_files.len()
    );
    Ok(())
}

/// Reads a YAML list of jobs and runs them as one batch, waiting for it to
/// finish.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed. Individual job
/// failures are logged by the batch and do not fail the command.
pub(crate) async fn run_batch_file(
    config: &AppConfig,
    jobs_path: &Path,
    requested_concurrency: i64,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(jobs_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", jobs_path.display()))?;
    let jobs: Vec<AcquisitionJob> = serde_yaml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", jobs_path.display()))?;

    if jobs.is_empty() {
        println!("batch: {} lists no jobs", jobs_path.display());
        return Ok(());
    }

    let acquirer = build_acquirer(config)?;
    let handle = acquirer.submit_batch(jobs, requested_concurrency);
    let batch_id = handle.batch_id;
    println!(
        "batch {batch_id}: {} jobs, concurrency {}",
        handle.job_count, handle.concurrency
    );
    handle.wait().await;

    let journal = JsonlSink::in_storage_root(&config.storage_path);
    println!(
        "batch {batch_id} finished; results in {}",
        journal.path().display()
    );
    Ok(())
}
