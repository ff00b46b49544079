//! Subject line and recipient columns.
//!
//! - `PUT /api/routing`: `{ "subject", "to", "cc", "bcc" }`. Column fields
//!   may be omitted, empty or `-- None --` to leave that field unset.

use crate::error::ApiError;
use crate::job_controller::state::JobsState;
use crate::services::preview::PreviewView;
use crate::services::{ensure_idle, SessionData};
use actix_web::web::{put, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::routing::RoutingConfig;
use common::requests::RoutingRequest;

const API_PATH: &str = "/api/routing";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", put().to(process))
}

fn column(value: Option<String>) -> Option<String> {
    value.and_then(|v| RoutingConfig::column_from_persisted(&v))
}

async fn process(
    jobs: web::Data<JobsState>,
    session: SessionData,
    payload: web::Json<RoutingRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_idle(&jobs)?;
    let req = payload.into_inner();
    let routing = RoutingConfig {
        to: column(req.to),
        cc: column(req.cc),
        bcc: column(req.bcc),
    };
    let record = session.write().await.set_routing(req.subject, routing);
    Ok(PreviewView::respond(record))
}
