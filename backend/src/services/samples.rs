//! Sample inputs.
//!
//! - `POST /api/samples`: writes `Sample_Data.csv` and `Sample_Template.md`
//!   into `<upload dir>/samples` and loads both into the session.

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::job_controller::state::JobsState;
use crate::services::{ensure_idle, SessionData};
use crate::sources::samples::write_samples;
use actix_web::web::{post, scope};
use actix_web::{web, HttpResponse, Scope};
use serde_json::json;

const API_PATH: &str = "/api/samples";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(process))
}

async fn process(
    config: web::Data<AppConfig>,
    jobs: web::Data<JobsState>,
    session: SessionData,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let dir = config.upload_dir.join("samples");
    let files = tokio::task::spawn_blocking(move || write_samples(&dir))
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))??;

    let mut session = session.write().await;
    let document = session.load_document(&files.template)?;
    let data_source = session.load_data(&files.data)?;
    Ok(HttpResponse::Ok().json(json!({
        "document": document,
        "data_source": data_source,
    })))
}
