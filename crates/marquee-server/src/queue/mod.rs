//! Asynchronous insert queue for movie creation.
//!
//! Decouples the create endpoint from synchronous store writes: jobs go
//! through a bounded channel to a background worker that applies the
//! upsert-by-title-or-imdb rule, so bursty creation traffic does not
//! serialize on write latency and duplicate titles self-heal into updates.
//!
//! Job lifecycle: Queued -> Processing -> Completed | Failed. A failing job
//! is retried with exponential backoff; once attempts are exhausted it is
//! kept in the failed-jobs list for inspection. Completed jobs are
//! discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use marquee_core::NewMovie;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::storage::CatalogDatabase;

#[cfg(test)]
mod tests;

/// Maximum delivery attempts per job.
const MAX_ATTEMPTS: u32 = 3;
/// First retry delay; doubles on each further attempt.
const BASE_BACKOFF: Duration = Duration::from_secs(2);
/// Jobs buffered before enqueue starts failing fast.
const QUEUE_CAPACITY: usize = 64;

/// Enqueue errors. The queue never blocks a request: when the buffer is
/// full or the worker is gone, callers fall back to a direct write.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue not available")]
    Unavailable,
}

/// A job that exhausted its retries, retained for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct FailedJob {
    pub id: u64,
    pub title: String,
    pub attempts: u32,
    pub error: String,
}

struct QueuedJob {
    id: u64,
    movie: NewMovie,
}

/// Handle to the insert queue. Cheap to clone; all clones feed the same
/// worker.
#[derive(Clone)]
pub struct InsertQueue {
    tx: mpsc::Sender<QueuedJob>,
    next_id: Arc<AtomicU64>,
    failed: Arc<Mutex<Vec<FailedJob>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InsertQueue {
    /// Start the queue worker against the given store.
    pub fn start(db: CatalogDatabase) -> Self {
        Self::start_with_backoff(db, BASE_BACKOFF)
    }

    /// Start with a custom base backoff (tests use zero to exercise retry
    /// exhaustion without waiting).
    pub fn start_with_backoff(db: CatalogDatabase, base_backoff: Duration) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let failed = Arc::new(Mutex::new(Vec::new()));

        tokio::spawn(run_worker(db, rx, Arc::clone(&failed), base_backoff));

        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
            failed,
        }
    }

    /// Submit a movie for queued insertion.
    ///
    /// Fails immediately (never waits) when the buffer is full or the
    /// worker has stopped. A returned job id only means the job was
    /// accepted, not that it has been applied yet.
    pub fn enqueue(&self, movie: NewMovie) -> Result<u64, QueueError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tx
            .try_send(QueuedJob { id, movie })
            .map_err(|_| QueueError::Unavailable)?;
        Ok(id)
    }

    /// Jobs that exhausted their retries, oldest first.
    pub fn failed_jobs(&self) -> Vec<FailedJob> {
        lock(&self.failed).clone()
    }
}

async fn run_worker(
    db: CatalogDatabase,
    mut rx: mpsc::Receiver<QueuedJob>,
    failed: Arc<Mutex<Vec<FailedJob>>>,
    base_backoff: Duration,
) {
    while let Some(job) = rx.recv().await {
        process_job(&db, job, &failed, base_backoff).await;
    }
    info!("Insert queue worker stopped");
}

async fn process_job(
    db: &CatalogDatabase,
    job: QueuedJob,
    failed: &Mutex<Vec<FailedJob>>,
    base_backoff: Duration,
) {
    let mut last_error = String::new();

    for attempt in 1..=MAX_ATTEMPTS {
        match db.upsert_movie(&job.movie).await {
            Ok((action, movie)) => {
                info!(
                    job_id = job.id,
                    title = %movie.title,
                    action = action.as_str(),
                    "Queued movie insertion completed"
                );
                return;
            }
            Err(e) => {
                last_error = e.to_string();
                warn!(
                    job_id = job.id,
                    attempt,
                    error = %last_error,
                    "Queued movie insertion attempt failed"
                );
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(base_backoff * 2_u32.pow(attempt - 1)).await;
                }
            }
        }
    }

    warn!(
        job_id = job.id,
        title = %job.movie.title,
        "Queued movie insertion failed permanently"
    );
    lock(failed).push(FailedJob {
        id: job.id,
        title: job.movie.title,
        attempts: MAX_ATTEMPTS,
        error: last_error,
    });
}
