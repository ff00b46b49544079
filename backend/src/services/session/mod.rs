//! Session overview and reload.
//!
//! - `GET /api/session`: what is loaded, the mapping, routing, subject,
//!   default row range and the record on preview.
//! - `POST /api/session/refresh`: re-reads the document and data source from
//!   disk, keeping mapping and routing, and renders the first record.

use crate::error::ApiError;
use crate::job_controller::state::JobsState;
use crate::services::preview::PreviewView;
use crate::services::{ensure_idle, SessionData};
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Scope};

const API_PATH: &str = "/api/session";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(summary))
        .route("/refresh", post().to(refresh))
}

async fn summary(session: SessionData) -> HttpResponse {
    HttpResponse::Ok().json(session.read().await.summary())
}

async fn refresh(
    jobs: web::Data<JobsState>,
    session: SessionData,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let record = session.write().await.refresh()?;
    Ok(PreviewView::respond(record))
}
