use crate::config::AppConfig;
use crate::error::ApiError;
use crate::job_controller::state::JobsState;
use crate::services::upload::{prune_upload, save_upload};
use crate::services::{ensure_idle, SessionData};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use std::path::Path;

pub(crate) async fn process(
    payload: Multipart,
    config: web::Data<AppConfig>,
    jobs: web::Data<JobsState>,
    session: SessionData,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let path = save_upload(payload, &config.upload_dir).await?;
    let mut session = session.write().await;
    let replaced = session.document_path().map(Path::to_path_buf);
    match session.load_document(&path) {
        Ok(summary) => {
            prune_upload(&config.upload_dir, replaced.as_deref(), Some(&path));
            Ok(HttpResponse::Ok().json(summary))
        }
        Err(e) => {
            prune_upload(&config.upload_dir, Some(&path), None);
            Err(e.into())
        }
    }
}
