//! Discovery command handlers for the CLI.

use std::collections::BTreeMap;
use std::path::PathBuf;

use compscout_core::AppConfig;
use compscout_crawler::{plan_acquisitions, sanitize_filename, DEFAULT_JOBS_PER_COMPETITOR};
use compscout_discovery::{
    engines_from_config, process_search_results, run_discovery, DataSourceInfo, DiscoveryRequest,
    SearchManager, SourceCategory,
};

fn build_manager(config: &AppConfig) -> anyhow::Result<SearchManager> {
    let engines = engines_from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build search engines: {e}"))?;
    if engines.is_empty() {
        anyhow::bail!(
            "no search engine configured; set SERPER_API_KEY, GOOGLE_API_KEY with \
             GOOGLE_SEARCH_ENGINE_ID, or BING_API_KEY"
        );
    }
    Ok(SearchManager::new(engines))
}

/// Runs discovery for a topic, writes the JSON report, and optionally hands
/// the best sources of each competitor to a batch acquisition.
///
/// # Errors
///
/// Returns an error if no engine is configured, the competitor search finds
/// nothing, or the report cannot be written. Acquisition failures are logged
/// per job by the batch and do not fail the command.
pub(crate) async fn run_discover(
    config: &AppConfig,
    request: &DiscoveryRequest,
    output: Option<PathBuf>,
    acquire: bool,
) -> anyhow::Result<()> {
    let manager = build_manager(config)?;
    tracing::info!(
        topic = %request.topic,
        depth = %request.depth,
        engines = ?manager.engine_names(),
        "starting discovery"
    );

    let report = run_discovery(&manager, request).await?;

    let output = output.unwrap_or_else(|| {
        config
            .storage_path
            .join(format!("discovery_{}.json", sanitize_filename(&request.topic)))
    });
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(&output, json).await?;

    println!(
        "discovery: {} competitors, {} data sources -> {}",
        report.competitors.len(),
        report.total_sources(),
        output.display()
    );
    for competitor in &report.competitors {
        let count: usize = report
            .data_sources
            .get(competitor)
            .map_or(0, |by_category| by_category.values().map(Vec::len).sum());
        println!("  {competitor}: {count} sources");
    }

    if !acquire {
        return Ok(());
    }

    let jobs = plan_acquisitions(&report, DEFAULT_JOBS_PER_COMPETITOR);
    if jobs.is_empty() {
        println!("acquire: no sources to fetch");
        return Ok(());
    }

    let acquirer = crate::acquire::build_acquirer(config)?;
    let handle = acquirer.submit_batch(jobs, config.batch_concurrency);
    println!(
        "acquire: batch {} queued {} jobs (concurrency {})",
        handle.batch_id, handle.job_count, handle.concurrency
    );
    handle.wait().await;
    println!("acquire: batch finished; see the journal for per-page results");

    Ok(())
}

/// Searches and scores data sources for a single competitor, printing the
/// surviving sources as JSON grouped by category.
///
/// # Errors
///
/// Returns an error if no engine is configured or the output cannot be
/// serialized. Categories with no usable sources are omitted.
pub(crate) async fn run_sources(
    config: &AppConfig,
    competitor: &str,
    types: &[SourceCategory],
    per_type: usize,
) -> anyhow::Result<()> {
    let manager = build_manager(config)?;
    let found = manager
        .search_data_sources(competitor, types, per_type)
        .await;

    let scored: BTreeMap<SourceCategory, Vec<DataSourceInfo>> = found
        .into_iter()
        .map(|(category, results)| (category, process_search_results(&results)))
        .filter(|(_, sources)| !sources.is_empty())
        .collect();

    if scored.is_empty() {
        tracing::warn!(competitor = %competitor, "no usable data sources found");
    }
    println!("{}", serde_json::to_string_pretty(&scored)?);

    Ok(())
}
