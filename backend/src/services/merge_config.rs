//! Persisted merge configuration.
//!
//! - `GET /api/config`: the session's mapping, subject and routing.
//! - `PUT /api/config`: applies a configuration verbatim.
//! - `POST /api/config/save`: writes the configuration to `MAILMERGE_CONFIG`.
//! - `POST /api/config/load`: reads `MAILMERGE_CONFIG` and applies it.

use crate::config::{load_merge_config, save_merge_config, AppConfig};
use crate::error::{ApiError, ConfigError};
use crate::job_controller::state::JobsState;
use crate::services::preview::PreviewView;
use crate::services::{ensure_idle, SessionData};
use actix_web::web::{get, post, put, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::config::MergeConfig;
use std::path::Path;

const API_PATH: &str = "/api/config";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(export))
        .route("", put().to(import))
        .route("/save", post().to(save))
        .route("/load", post().to(load))
}

fn config_path(config: &AppConfig) -> Result<&Path, ConfigError> {
    config.merge_config_path.as_deref().ok_or(ConfigError::NoPath)
}

async fn export(session: SessionData) -> HttpResponse {
    HttpResponse::Ok().json(session.read().await.export_config())
}

async fn import(
    jobs: web::Data<JobsState>,
    session: SessionData,
    payload: web::Json<MergeConfig>,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let record = session.write().await.apply_config(payload.into_inner());
    Ok(PreviewView::respond(record))
}

async fn save(
    config: web::Data<AppConfig>,
    session: SessionData,
) -> Result<HttpResponse, ApiError> {
    let path = config_path(&config)?;
    let merge_config = session.read().await.export_config();
    if merge_config.mapping.is_empty() {
        return Err(ConfigError::EmptyMapping.into());
    }
    save_merge_config(path, &merge_config)?;
    Ok(HttpResponse::Ok().json(merge_config))
}

async fn load(
    config: web::Data<AppConfig>,
    jobs: web::Data<JobsState>,
    session: SessionData,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let merge_config = load_merge_config(config_path(&config)?)?;
    let record = session.write().await.apply_config(merge_config);
    Ok(PreviewView::respond(record))
}
