//! Sync engine: read → fetch → partition → write
//!
//! One engine drives one manifest through a single run. Any failure moves
//! the engine to `Failed` before anything is written, so a manifest is
//! either rewritten completely or not at all.

use crate::domain::{ManifestRecord, Partition};
use crate::error::{AppError, RegistryError};
use crate::manifest::ManifestAdapter;
use crate::progress::Progress;
use crate::registry::{RegistryClient, DEFAULT_TIMEOUT};
use futures::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of registry lookups in flight (sequential)
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Reading,
    Fetching,
    Partitioning,
    Writing,
    Done,
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Reading => "reading",
            EngineState::Fetching => "fetching",
            EngineState::Partitioning => "partitioning",
            EngineState::Writing => "writing",
            EngineState::Done => "done",
            EngineState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Registry lookups in flight at once; 1 is strictly sequential
    pub concurrency: usize,
    /// Upper bound for a single lookup, retries included
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    /// Records split by comparison against latest
    pub partition: Partition,
    /// Where the rewritten manifest was written
    pub destination: PathBuf,
    /// Every record in read order, latest version filled in
    pub records: Vec<ManifestRecord>,
}

/// Drives one manifest adapter against one registry client
pub struct SyncEngine {
    adapter: Box<dyn ManifestAdapter>,
    client: Box<dyn RegistryClient>,
    config: EngineConfig,
    progress: Progress,
    state: EngineState,
}

impl SyncEngine {
    /// Create an idle engine
    pub fn new(
        adapter: Box<dyn ManifestAdapter>,
        client: Box<dyn RegistryClient>,
        config: EngineConfig,
    ) -> Self {
        Self {
            adapter,
            client,
            config,
            progress: Progress::disabled(),
            state: EngineState::Idle,
        }
    }

    /// Show a progress bar while fetching (builder pattern)
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run every step and return the outcome
    pub async fn run(&mut self) -> Result<SyncOutcome, AppError> {
        let records = self.read()?;
        self.sync(records).await
    }

    /// Read the manifest; the first half of [`SyncEngine::run`]
    pub fn read(&mut self) -> Result<Vec<ManifestRecord>, AppError> {
        self.transition(EngineState::Reading);
        let result = self.adapter.read().map_err(AppError::from);
        self.settle(result)
    }

    /// Fetch, partition and write records produced by [`SyncEngine::read`]
    pub async fn sync(&mut self, records: Vec<ManifestRecord>) -> Result<SyncOutcome, AppError> {
        let result = self.fetch_partition_write(records).await;
        let outcome = self.settle(result)?;
        self.transition(EngineState::Done);
        Ok(outcome)
    }

    async fn fetch_partition_write(
        &mut self,
        records: Vec<ManifestRecord>,
    ) -> Result<SyncOutcome, AppError> {
        self.transition(EngineState::Fetching);
        let records = self.fetch_all(records).await?;

        self.transition(EngineState::Partitioning);
        let partition = Partition::split(&records);
        info!(
            outdated = partition.outdated.len(),
            up_to_date = partition.up_to_date.len(),
            "Partitioned records"
        );

        self.transition(EngineState::Writing);
        let destination = self.adapter.write_back(&records)?;

        Ok(SyncOutcome {
            partition,
            destination,
            records,
        })
    }

    /// Look up every record in read order; the first failure drops all
    /// lookups still in flight
    async fn fetch_all(
        &mut self,
        records: Vec<ManifestRecord>,
    ) -> Result<Vec<ManifestRecord>, RegistryError> {
        if records.is_empty() {
            return Ok(records);
        }

        self.progress
            .start(records.len(), self.client.registry_name());

        let client = self.client.as_ref();
        let timeout = self.config.request_timeout;
        let progress = &self.progress;

        let latest: Vec<String> = stream::iter(
            records
                .iter()
                .map(|record| fetch_latest(client, &record.name, timeout)),
        )
        .buffered(self.config.concurrency.max(1))
        .inspect_ok(|_| progress.inc())
        .try_collect()
        .await?;

        self.progress.finish_and_clear();

        Ok(records
            .into_iter()
            .zip(latest)
            .map(|(record, latest)| record.with_latest(latest))
            .collect())
    }

    fn transition(&mut self, next: EngineState) {
        debug!(from = %self.state, to = %next, "Engine state");
        self.state = next;
    }

    /// Move to `Failed` if the step failed
    fn settle<T>(&mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(e) = &result {
            self.progress.finish_and_clear();
            warn!(state = %self.state, error = %e, "Run failed");
            self.transition(EngineState::Failed);
        }
        result
    }
}

/// Fetch one package, bounded by `timeout` once the registry lets it through
async fn fetch_latest(
    client: &dyn RegistryClient,
    package: &str,
    timeout: Duration,
) -> Result<String, RegistryError> {
    client.throttle().await;
    let latest = match tokio::time::timeout(timeout, client.fetch_latest(package)).await {
        Ok(result) => result?,
        Err(_) => return Err(RegistryError::timeout(package, client.registry_name())),
    };
    debug!(package, latest = %latest, "Fetched latest version");
    Ok(latest)
}
