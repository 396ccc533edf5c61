//! Staged ingestion state machine.
//!
//! ```text
//! submit --> stage 0 --tick--> stage 1 ... --tick--> stage n-1 --tick--> Completed
//!   ^ a new submit replaces the active job at any point
//! ```
//!
//! Ticks are driven explicitly: [`IngestionPipeline::advance`] moves exactly
//! one step, [`IngestionPipeline::poll`] moves as many steps as the deadline
//! allows. Tests call `advance` directly; hosts call `poll` from their loop.

use std::time::Duration;
use web_time::Instant;

use crate::constants::INGEST_TICK_MS;
use crate::error::ViewerError;
use crate::store::CaseStore;

use super::factory::{CaseFactory, DemoCaseFactory};
use super::validation::{UploadFile, validate_upload};

/// Stage labels shown while a job runs.
pub fn default_stages() -> Vec<String> {
    [
        "Uploading DICOM/Image data...",
        "Preprocessing & Normalization...",
        "Running DenseNet-121 Inference...",
        "Generating Grad-CAM Heatmaps...",
        "Finalizing Report...",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Identifies one submitted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Observable progress of the active job.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The job moved on to another stage
    Advanced {
        job: JobId,
        stage: usize,
        label: String,
    },
    /// The job finished and its case is now first in the store
    Completed {
        job: JobId,
        case_id: String,
        upload: UploadFile,
    },
}

#[derive(Debug)]
struct IngestionJob {
    id: JobId,
    file: UploadFile,
    stage: usize,
    deadline: Instant,
}

/// Runs at most one ingestion job at a time.
pub struct IngestionPipeline {
    stages: Vec<String>,
    tick: Duration,
    job: Option<IngestionJob>,
    next_job: u64,
    factory: Box<dyn CaseFactory>,
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::new(default_stages(), Duration::from_millis(INGEST_TICK_MS))
    }
}

impl IngestionPipeline {
    pub fn new(stages: Vec<String>, tick: Duration) -> Self {
        Self {
            stages,
            tick,
            job: None,
            next_job: 1,
            factory: Box::new(DemoCaseFactory),
        }
    }

    /// Replace the factory that builds completed cases.
    pub fn with_factory(mut self, factory: impl CaseFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Validate `file` and start a job for it, replacing any active job.
    ///
    /// A rejected file leaves an active job running.
    pub fn submit(&mut self, file: UploadFile, now: Instant) -> Result<JobId, ViewerError> {
        validate_upload(&file)?;
        if self.stages.is_empty() {
            return Err(ViewerError::Ingestion("no stages configured".to_string()));
        }

        if let Some(previous) = self.cancel() {
            log::info!("Ingestion: {} superseded by a new upload", previous);
        }

        let id = JobId(self.next_job);
        self.next_job += 1;
        log::info!("Ingestion: {} started for '{}'", id, file.name);
        self.job = Some(IngestionJob {
            id,
            file,
            stage: 0,
            deadline: now + self.tick,
        });
        Ok(id)
    }

    /// Drop the active job, if any. Its pending tick dies with it.
    pub fn cancel(&mut self) -> Option<JobId> {
        self.job.take().map(|job| {
            log::debug!("Ingestion: {} cancelled at stage {}", job.id, job.stage);
            job.id
        })
    }

    pub fn active_job(&self) -> Option<JobId> {
        self.job.as_ref().map(|job| job.id)
    }

    pub fn is_active(&self) -> bool {
        self.job.is_some()
    }

    /// Index and label of the stage the active job is in.
    pub fn current_stage(&self) -> Option<(usize, &str)> {
        let job = self.job.as_ref()?;
        self.stages
            .get(job.stage)
            .map(|label| (job.stage, label.as_str()))
    }

    /// Run one tick of the active job.
    ///
    /// The job is released before the case is built, so a failure leaves
    /// neither a running job nor a modified store behind.
    pub fn advance(&mut self, store: &mut CaseStore) -> Result<Option<PipelineEvent>, ViewerError> {
        let Some(job) = self.job.as_mut() else {
            return Ok(None);
        };

        if job.stage + 1 < self.stages.len() {
            job.stage += 1;
            job.deadline += self.tick;
            log::debug!(
                "Ingestion: {} stage {}/{}",
                job.id,
                job.stage + 1,
                self.stages.len()
            );
            return Ok(Some(PipelineEvent::Advanced {
                job: job.id,
                stage: job.stage,
                label: self.stages[job.stage].clone(),
            }));
        }

        let Some(job) = self.job.take() else {
            return Ok(None);
        };
        let case = self.factory.build(&job.file, job.id).inspect_err(|e| {
            log::error!("Ingestion: {} failed: {}", job.id, e);
        })?;
        let case_id = case.id.clone();
        store.prepend(case)?;
        log::info!("Ingestion: {} completed as case '{}'", job.id, case_id);

        Ok(Some(PipelineEvent::Completed {
            job: job.id,
            case_id,
            upload: job.file,
        }))
    }

    /// Run every tick that is due at `now`.
    pub fn poll(&mut self, now: Instant, store: &mut CaseStore) -> Result<Vec<PipelineEvent>, ViewerError> {
        let mut events = Vec::new();
        while self.job.as_ref().is_some_and(|job| now >= job.deadline) {
            if let Some(event) = self.advance(store)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Time until the next tick is due, if a job is active.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.job
            .as_ref()
            .map(|job| job.deadline.saturating_duration_since(now))
    }
}
