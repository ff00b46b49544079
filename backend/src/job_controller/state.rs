//! Manages the state of background dispatch jobs.
//!
//! A batch runs outside the request/response cycle (see
//! `services/merge/start.rs`). Its worker never touches this state directly:
//! it reports through a channel, and a single updater task owns all writes
//! to the job map.
//!
//! The main components are:
//! - `JobsState`: a clonable, thread-safe handle injected into the Actix
//!   application. Besides the job map it tracks whether a batch is in flight,
//!   since only one may run at a time.
//! - `JobUpdate`: a status change for one job, sent by background tasks.
//! - `start_job_updater`: the long-running task that applies `JobUpdate`s.

use common::jobs::JobStatus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// A thread-safe, shareable container for the state of all background jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to its latest `JobStatus`. Read by the status endpoint, written
    /// by `start_job_updater`.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Sender side of the update channel consumed by `start_job_updater`.
    pub tx: mpsc::Sender<JobUpdate>,

    /// Set while a batch is running.
    active: Arc<AtomicBool>,
}

/// A status update for a specific background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Held by the running batch; clears the in-flight flag when dropped.
#[derive(Debug)]
pub struct BatchSlot {
    active: Arc<AtomicBool>,
}

impl Drop for BatchSlot {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claims the single batch slot, or `None` if a batch is already running.
    pub fn try_begin_batch(&self) -> Option<BatchSlot> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BatchSlot {
                active: Arc::clone(&self.active),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Starts the central job state updater task.
///
/// Spawned once from `main.rs`; applies every `JobUpdate` received on `rx`
/// to the shared job map until all senders are gone.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}
