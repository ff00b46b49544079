//! Placeholder-to-column mapping.
//!
//! - `GET /api/mapping/suggest`: a proposal built from the current mapping
//!   and same-named columns. Does not change the session.
//! - `PUT /api/mapping`: replaces the mapping and shows the first record.

use crate::error::ApiError;
use crate::job_controller::state::JobsState;
use crate::services::preview::PreviewView;
use crate::services::{ensure_idle, SessionData};
use actix_web::web::{get, put, scope};
use actix_web::{web, HttpResponse, Scope};
use common::requests::MappingRequest;
use log::info;

const API_PATH: &str = "/api/mapping";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", put().to(replace))
        .route("/suggest", get().to(suggest))
}

async fn suggest(session: SessionData) -> HttpResponse {
    HttpResponse::Ok().json(session.read().await.suggest_mapping())
}

async fn replace(
    jobs: web::Data<JobsState>,
    session: SessionData,
    payload: web::Json<MappingRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let mapping = payload.into_inner().mapping;
    info!("Mapping updated with {} entries", mapping.len());
    let record = session.write().await.set_mapping(mapping);
    Ok(PreviewView::respond(record))
}
