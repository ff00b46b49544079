//! Batch dispatch.
//!
//! - `POST /api/merge/start`: snapshots the session into a batch and runs it
//!   in the background. Returns the `job_id` to poll.
//! - `GET /api/merge/status/{job_id}`: the batch's `JobStatus`.

mod start;
mod status;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/merge";

/// Configures and returns the Actix `Scope` for all merge-related routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(status::process))
}
