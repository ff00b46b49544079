//! # Batch Start Service
//!
//! `POST /api/merge/start` turns the current session into a `DispatchJob` and
//! runs it off the async runtime.
//!
//! ## Workflow:
//!
//! 1.  **Slot**: only one batch may be in flight. The handler claims the
//!     single `BatchSlot` first and answers `409` if it is taken. The slot
//!     travels with the background task and frees itself when dropped.
//!
//! 2.  **Snapshot**: the row range and delivery mode from the request are
//!     validated against the session, which is then copied into the job. The
//!     session is not touched again by the batch.
//!
//! 3.  **Scheduling**: `schedule_dispatch_job` registers the job as `Pending`,
//!     returns its id, and spawns a task that runs `run_batch` inside
//!     `spawn_blocking`.
//!
//! 4.  **Progress**: the worker reports each row over a per-job channel as a
//!     `DispatchUpdate`. A listener task turns those into `JobUpdate`s for the
//!     central job controller.
//!
//! 5.  **Outcome**: once the listener has drained, the task posts the final
//!     status: `Completed` with the batch report, or `Failed` when the mail
//!     session could not be opened or the worker died.

use crate::engine::dispatch::{run_batch, DispatchJob};
use crate::error::{ApiError, DispatchError};
use crate::job_controller::state::{BatchSlot, JobUpdate, JobsState};
use crate::services::SessionData;
use crate::transport::MailTransport;
use actix_web::{web, HttpResponse};
use common::jobs::JobStatus;
use common::model::merge::{BatchReport, DeliveryMode, DispatchProgress, RowRange};
use common::requests::StartMergeRequest;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Sent from the blocking worker to the job's listener task.
#[derive(Debug)]
pub enum DispatchUpdate {
    Job(JobStatus),
    Row(DispatchProgress),
}

impl From<DispatchUpdate> for JobStatus {
    fn from(update: DispatchUpdate) -> Self {
        match update {
            DispatchUpdate::Job(status) => status,
            DispatchUpdate::Row(progress) => JobStatus::InProgress {
                percent: progress.percent,
                message: progress.message,
            },
        }
    }
}

pub(crate) async fn process(
    jobs: web::Data<JobsState>,
    session: SessionData,
    transport: web::Data<dyn MailTransport>,
    payload: web::Json<StartMergeRequest>,
) -> Result<HttpResponse, ApiError> {
    let slot = jobs.try_begin_batch().ok_or(DispatchError::Busy)?;
    let req = payload.into_inner();
    let job = {
        let session = session.read().await;
        let range = requested_range(&req, session.dataset().len());
        session.dispatch_job(range, DeliveryMode::from_draft_flag(req.draft))?
    };

    let job_id = schedule_dispatch_job(&jobs, transport.into_inner(), job, slot).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })))
}

/// An open end of the range defaults to the first or last row.
fn requested_range(req: &StartMergeRequest, len: usize) -> Option<RowRange> {
    match (req.start_row, req.end_row) {
        (None, None) => None,
        (start, end) => Some(RowRange::new(start.unwrap_or(1), end.unwrap_or(len))),
    }
}

/// Registers the job and runs it in the background, returning its id.
async fn schedule_dispatch_job(
    state: &JobsState,
    transport: Arc<dyn MailTransport>,
    job: DispatchJob,
    slot: BatchSlot,
) -> String {
    let job_id = Uuid::new_v4().to_string();
    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let range = job.range();
    info!(
        "Starting job {} for rows {}-{} ({:?})",
        job_id,
        range.start,
        range.end,
        job.mode()
    );

    let tx = state.tx.clone();
    let job_id_clone = job_id.clone();

    tokio::spawn(async move {
        let (dispatch_tx, mut dispatch_rx) = mpsc::channel::<DispatchUpdate>(100);

        let listener_tx = tx.clone();
        let job_id_for_listener = job_id_clone.clone();
        let listener = tokio::spawn(async move {
            while let Some(update) = dispatch_rx.recv().await {
                let _ = listener_tx
                    .send(JobUpdate {
                        job_id: job_id_for_listener.clone(),
                        status: update.into(),
                    })
                    .await;
            }
        });

        let handle = tokio::task::spawn_blocking(move || dispatch_blocking(dispatch_tx, &job, &*transport));

        let status = match handle.await {
            Ok(Ok(report)) => {
                info!("Job {}: {}", job_id_clone, report.summary());
                JobStatus::Completed(report)
            }
            Ok(Err(e)) => {
                error!("Job {} failed: {}", job_id_clone, e);
                JobStatus::Failed(e.to_string())
            }
            Err(e) => {
                error!("Job {} worker died: {}", job_id_clone, e);
                JobStatus::Failed(DispatchError::Fatal(format!("Task join error: {}", e)).to_string())
            }
        };

        // Progress must not land after the final status.
        let _ = listener.await;
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status,
            })
            .await;
        drop(slot);
    });

    job_id
}

fn dispatch_blocking(
    tx: mpsc::Sender<DispatchUpdate>,
    job: &DispatchJob,
    transport: &dyn MailTransport,
) -> Result<BatchReport, DispatchError> {
    let _ = tx.blocking_send(DispatchUpdate::Job(JobStatus::InProgress {
        percent: 0,
        message: format!("Starting {} rows", job.total()),
    }));
    run_batch(job, transport, |progress| {
        let _ = tx.blocking_send(DispatchUpdate::Row(progress));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatch::tests::{ann_and_bo, RecordingTransport};
    use crate::session::MergeSession;
    use actix_web::{test as actix_test, App};
    use common::model::mapping::Mapping;
    use common::model::routing::RoutingConfig;
    use common::model::template::Template;
    use tokio::sync::RwLock;

    fn two_row_job() -> DispatchJob {
        let mapping: Mapping = [("name", "Name")].into_iter().collect();
        DispatchJob::new(
            Arc::new(ann_and_bo()),
            Template {
                subject: "Hi {{name}}".into(),
                body: "<p>Dear {{name}}</p>".into(),
            },
            mapping,
            RoutingConfig {
                to: Some("Email".into()),
                cc: None,
                bcc: None,
            },
            RowRange::full(2),
            DeliveryMode::Draft,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn scheduled_job_reports_progress_then_completes() {
        let (tx, mut rx) = mpsc::channel(100);
        let state = JobsState::new(tx);
        let transport = RecordingTransport::default();
        let slot = state.try_begin_batch().unwrap();

        let job_id =
            schedule_dispatch_job(&state, Arc::new(transport.clone()), two_row_job(), slot).await;
        assert_eq!(
            state.jobs.read().await.get(&job_id),
            Some(&JobStatus::Pending)
        );

        let mut statuses = Vec::new();
        while let Some(update) = rx.recv().await {
            assert_eq!(update.job_id, job_id);
            let done = update.status.is_finished();
            statuses.push(update.status);
            if done {
                break;
            }
        }

        assert_eq!(statuses.len(), 4);
        assert!(matches!(statuses[0], JobStatus::InProgress { percent: 0, .. }));
        assert_eq!(
            statuses[2],
            JobStatus::InProgress {
                percent: 100,
                message: "FAILED 2/2: Unknown/Empty".into()
            }
        );
        match &statuses[3] {
            JobStatus::Completed(report) => {
                assert_eq!(report.success_count, 1);
                assert_eq!(report.failures.len(), 1);
            }
            other => panic!("unexpected final status {:?}", other),
        }
        assert_eq!(transport.sent.lock().unwrap().len(), 1);

        for _ in 0..100 {
            if !state.is_busy() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("batch slot was not released");
    }

    #[test]
    fn open_range_ends_default_to_the_dataset() {
        let req = |start_row, end_row| StartMergeRequest {
            start_row,
            end_row,
            draft: true,
        };
        assert_eq!(requested_range(&req(None, None), 5), None);
        assert_eq!(requested_range(&req(Some(3), None), 5), Some(RowRange::new(3, 5)));
        assert_eq!(requested_range(&req(None, Some(2)), 5), Some(RowRange::new(1, 2)));
    }

    #[actix_web::test]
    async fn start_is_refused_without_a_to_column() {
        let (tx, _rx) = mpsc::channel(100);
        let jobs = JobsState::new(tx);
        let transport: Arc<dyn MailTransport> = Arc::new(RecordingTransport::default());
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(RwLock::new(MergeSession::new())))
                .app_data(web::Data::from(transport))
                .service(super::super::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/merge/start")
            .set_json(serde_json::json!({ "draft": true }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let body = actix_test::read_body(resp).await;
        assert_eq!(body, "Please select an Email column for the 'To' field.");
        assert!(!jobs.is_busy());
    }

    #[actix_web::test]
    async fn start_is_refused_while_a_batch_runs() {
        let (tx, _rx) = mpsc::channel(100);
        let jobs = JobsState::new(tx);
        let _slot = jobs.try_begin_batch().unwrap();
        let transport: Arc<dyn MailTransport> = Arc::new(RecordingTransport::default());
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(RwLock::new(MergeSession::new())))
                .app_data(web::Data::from(transport))
                .service(super::super::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/merge/start")
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);
    }
}
