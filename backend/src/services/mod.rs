pub mod data_sources;
pub mod documents;
pub mod mapping;
pub mod merge;
pub mod merge_config;
pub mod preview;
pub mod routing;
pub mod samples;
pub mod session;
mod upload;

use crate::error::ApiError;
use crate::job_controller::state::JobsState;
use crate::session::MergeSession;
use tokio::sync::RwLock;

/// The operator's session as injected into handlers.
pub type SessionData = actix_web::web::Data<RwLock<MergeSession>>;

/// The session is read-only while a batch is in flight.
pub(crate) fn ensure_idle(jobs: &JobsState) -> Result<(), ApiError> {
    if jobs.is_busy() {
        Err(ApiError::Busy)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use tokio::sync::mpsc;

    fn app_parts() -> (JobsState, SessionData) {
        let (tx, _rx) = mpsc::channel(100);
        (
            JobsState::new(tx),
            web::Data::new(RwLock::new(MergeSession::new())),
        )
    }

    #[actix_web::test]
    async fn session_edits_are_refused_while_a_batch_runs() {
        let (jobs, session) = app_parts();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(jobs.clone()))
                .app_data(session.clone())
                .service(mapping::configure_routes())
                .service(preview::configure_routes()),
        )
        .await;

        let slot = jobs.try_begin_batch().unwrap();
        let req = actix_test::TestRequest::put()
            .uri("/api/mapping")
            .set_json(serde_json::json!({ "mapping": { "name": "Name" } }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(session.read().await.mapping().is_empty());

        drop(slot);
        let req = actix_test::TestRequest::put()
            .uri("/api/mapping")
            .set_json(serde_json::json!({ "mapping": { "name": "Name" } }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(session.read().await.mapping().column_for("name"), Some("Name"));
    }

    #[actix_web::test]
    async fn empty_session_previews_nothing() {
        let (jobs, state) = app_parts();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(jobs))
                .app_data(state)
                .service(session::configure_routes())
                .service(preview::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/preview/advance")
            .set_json(serde_json::json!({ "step": 3 }))
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert!(body["record"].is_null());

        let req = actix_test::TestRequest::get().uri("/api/session").to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["row_count"], 0);
        assert!(body["default_range"].is_null());
    }

    #[actix_web::test]
    async fn unknown_job_is_not_found() {
        let (jobs, _) = app_parts();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(jobs))
                .service(merge::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/merge/status/nope")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn saving_config_needs_a_path() {
        let (jobs, state) = app_parts();
        let config = crate::config::AppConfig::from_lookup(|_| None).unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(jobs))
                .app_data(state)
                .app_data(web::Data::new(config))
                .service(merge_config::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post().uri("/api/config/save").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn samples_are_written_and_loaded() {
        let (jobs, state) = app_parts();
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::AppConfig::from_lookup(|name| {
            (name == "MAILMERGE_UPLOAD_DIR").then(|| dir.path().display().to_string())
        })
        .unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(jobs))
                .app_data(state.clone())
                .app_data(web::Data::new(config))
                .service(samples::configure_routes()),
        )
        .await;

        let req = actix_test::TestRequest::post().uri("/api/samples").to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data_source"]["row_count"], 3);
        assert_eq!(body["data_source"]["to_column"], "Email");
        assert!(dir.path().join("samples/Sample_Template.md").exists());
        assert_eq!(state.read().await.placeholders().len(), 8);
    }
}
