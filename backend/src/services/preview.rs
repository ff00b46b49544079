//! Record preview navigation.
//!
//! - `GET /api/preview`: the record currently shown.
//! - `POST /api/preview/advance`: `{ "step": n }`, negative steps move back.
//! - `POST /api/preview/jump`: `{ "index": i }`, zero-based.
//!
//! Movement saturates at the first and last record. With no data or no
//! mapping nothing moves and the previously shown record comes back.

use crate::error::ApiError;
use crate::job_controller::state::JobsState;
use crate::services::{ensure_idle, SessionData};
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::preview::RenderedRecord;
use common::requests::{AdvanceRequest, JumpRequest};
use serde::Serialize;

const API_PATH: &str = "/api/preview";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(current))
        .route("/advance", post().to(advance))
        .route("/jump", post().to(jump))
}

/// A rendered record plus the display strings the operator sees.
#[derive(Debug, Serialize)]
pub struct PreviewView {
    pub record: Option<RenderedRecord>,
    pub label: Option<String>,
    pub html: Option<String>,
}

impl From<Option<RenderedRecord>> for PreviewView {
    fn from(record: Option<RenderedRecord>) -> Self {
        Self {
            label: record.as_ref().map(RenderedRecord::label),
            html: record.as_ref().map(RenderedRecord::to_html),
            record,
        }
    }
}

impl PreviewView {
    pub fn respond(record: Option<RenderedRecord>) -> HttpResponse {
        HttpResponse::Ok().json(Self::from(record))
    }
}

async fn current(session: SessionData) -> HttpResponse {
    PreviewView::respond(session.write().await.preview(0))
}

async fn advance(
    jobs: web::Data<JobsState>,
    session: SessionData,
    payload: web::Json<AdvanceRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let record = session.write().await.preview(payload.step);
    Ok(PreviewView::respond(record))
}

async fn jump(
    jobs: web::Data<JobsState>,
    session: SessionData,
    payload: web::Json<JumpRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let record = session.write().await.jump_to(payload.index);
    Ok(PreviewView::respond(record))
}
