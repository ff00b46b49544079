mod config;
mod engine;
mod error;
mod job_controller;
mod services;
mod session;
mod sources;
mod transport;

use crate::config::{load_merge_config, AppConfig};
use crate::job_controller::state::JobsState;
use crate::session::MergeSession;
use crate::transport::smtp::LettreTransport;
use crate::transport::MailTransport;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Applies the persisted merge configuration, if one is configured and present.
fn restore_session(config: &AppConfig) -> MergeSession {
    let mut session = MergeSession::new();
    let Some(path) = config.merge_config_path.as_deref() else {
        return session;
    };
    if !path.exists() {
        info!("No merge configuration at {} yet", path.display());
        return session;
    }
    match load_merge_config(path) {
        Ok(merge_config) => {
            session.apply_config(merge_config);
        }
        Err(e) => warn!("Ignoring merge configuration: {}", e),
    }
    session
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let url = config.url();

    if config.smtp.is_none() {
        warn!("SMTP_HOST is not set; only draft mode is available");
    }

    // Initialize job controller state
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState::new(tx);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let session = web::Data::new(RwLock::new(restore_session(&config)));
    let transport: Arc<dyn MailTransport> = Arc::new(LettreTransport::from_config(&config));
    let transport = web::Data::from(transport);
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(session.clone())
            .app_data(transport.clone())
            .app_data(config.clone())
            .service(services::documents::configure_routes())
            .service(services::data_sources::configure_routes())
            .service(services::session::configure_routes())
            .service(services::mapping::configure_routes())
            .service(services::routing::configure_routes())
            .service(services::merge_config::configure_routes())
            .service(services::preview::configure_routes())
            .service(services::samples::configure_routes())
            .service(services::merge::configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}
