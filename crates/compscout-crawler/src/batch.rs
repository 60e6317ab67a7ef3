//! Acquisition of single pages and fire-and-forget batches.
//!
//! A batch runs in the background under a concurrency cap of at most three.
//! Job `i` waits `i * 2s` once it holds a permit, then tries the crawler
//! chain up to three times with 5s and 10s back-off. Failures are logged and
//! never reported back to the submitter.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

use crate::chain::CrawlerChain;
use crate::clock::{Clock, SystemClock};
use crate::error::CrawlerError;
use crate::saver::{ContentSaver, SaveResult};
use crate::sink::{content_hash, AcquisitionRecord, AcquisitionSink};
use crate::strategies::CrawlResult;

pub const MAX_CONCURRENCY: usize = 3;
pub const MAX_ATTEMPTS: u32 = 3;
pub const STAGGER_STEP: Duration = Duration::from_secs(2);
pub const RETRY_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionJob {
    pub url: String,
    pub competitor: String,
    #[serde(default)]
    pub source_type: String,
}

/// Maps any requested concurrency onto `1..=MAX_CONCURRENCY`.
#[must_use]
pub fn clamp_concurrency(requested: i64) -> usize {
    usize::try_from(requested).map_or(1, |n| n.clamp(1, MAX_CONCURRENCY))
}

/// Receipt for a submitted batch.
#[derive(Debug)]
pub struct BatchHandle {
    pub batch_id: Uuid,
    pub job_count: usize,
    /// Concurrency actually applied after clamping.
    pub concurrency: usize,
    task: JoinHandle<()>,
}

impl BatchHandle {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for every job in the batch to finish or be abandoned.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            tracing::error!(batch_id = %self.batch_id, error = %e, "batch task aborted");
        }
    }
}

#[derive(Clone)]
pub struct Acquirer {
    chain: Arc<CrawlerChain>,
    saver: Arc<ContentSaver>,
    sink: Arc<dyn AcquisitionSink>,
    clock: Arc<dyn Clock>,
}

impl Acquirer {
    #[must_use]
    pub fn new(chain: CrawlerChain, saver: ContentSaver, sink: Arc<dyn AcquisitionSink>) -> Self {
        Self {
            chain: Arc::new(chain),
            saver: Arc::new(saver),
            sink,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for stagger and back-off delays and for
    /// record timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Crawls, saves, and records one job, without retries.
    ///
    /// # Errors
    ///
    /// Returns the chain error if every strategy failed, or a storage error
    /// if the page could not be saved or recorded.
    pub async fn acquire_one(&self, job: &AcquisitionJob) -> Result<SaveResult, CrawlerError> {
        let result = self.chain.crawl(&job.url).await?;
        self.store(job, &result).await
    }

    /// Starts `jobs` in the background and returns immediately.
    ///
    /// `requested_concurrency` is clamped with [`clamp_concurrency`].
    #[must_use]
    pub fn submit_batch(&self, jobs: Vec<AcquisitionJob>, requested_concurrency: i64) -> BatchHandle {
        let concurrency = clamp_concurrency(requested_concurrency);
        let batch_id = Uuid::new_v4();
        let job_count = jobs.len();

        tracing::info!(
            %batch_id,
            job_count,
            requested_concurrency,
            concurrency,
            "batch acquisition started"
        );

        let acquirer = self.clone();
        let task = tokio::spawn(async move {
            acquirer.run_batch(batch_id, jobs, concurrency).await;
        });

        BatchHandle {
            batch_id,
            job_count,
            concurrency,
            task,
        }
    }

    async fn run_batch(&self, batch_id: Uuid, jobs: Vec<AcquisitionJob>, concurrency: usize) {
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let acquirer = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move { acquirer.run_job(index, job, semaphore).await });
        }

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => succeeded += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(%batch_id, error = %e, "acquisition task panicked");
                }
            }
        }

        tracing::info!(%batch_id, succeeded, failed, "batch acquisition finished");
    }

    async fn run_job(&self, index: usize, job: AcquisitionJob, semaphore: Arc<Semaphore>) -> bool {
        let Ok(_permit) = semaphore.acquire_owned().await else {
            return false;
        };

        if index > 0 {
            let steps = u32::try_from(index).unwrap_or(u32::MAX);
            self.clock.sleep(STAGGER_STEP.saturating_mul(steps)).await;
        }

        let mut attempt = 0u32;
        let result = loop {
            match self.chain.crawl(&job.url).await {
                Ok(result) => break result,
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        tracing::error!(
                            url = %job.url,
                            competitor = %job.competitor,
                            attempts = attempt,
                            error = %e,
                            "acquisition abandoned"
                        );
                        return false;
                    }
                    let delay = RETRY_STEP * attempt;
                    tracing::warn!(
                        url = %job.url,
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        delay_secs = delay.as_secs(),
                        error = %e,
                        "fetch failed, retrying after back-off"
                    );
                    self.clock.sleep(delay).await;
                }
            }
        };

        match self.store(&job, &result).await {
            Ok(saved) => {
                tracing::info!(
                    url = %job.url,
                    path = %saved.content_path.display(),
                    images = saved.image_files.len(),
                    "acquisition succeeded"
                );
                true
            }
            Err(e) => {
                tracing::error!(url = %job.url, error = %e, "saving acquisition failed");
                false
            }
        }
    }

    async fn store(
        &self,
        job: &AcquisitionJob,
        result: &CrawlResult,
    ) -> Result<SaveResult, CrawlerError> {
        let saved = self.saver.save(result, &job.competitor).await?;

        self.sink
            .record(AcquisitionRecord {
                competitor: job.competitor.clone(),
                url: job.url.clone(),
                source_type: job.source_type.clone(),
                content_path: saved.content_path.clone(),
                image_files: saved.image_files.clone(),
                title: result.title.clone(),
                platform: result.platform.display_name().to_string(),
                method: result.method.to_string(),
                content_hash: content_hash(&result.markdown),
                captured_at: self.clock.now().with_timezone(&Utc),
            })
            .await?;

        Ok(saved)
    }
}
