//! Recipient data uploads.
//!
//! - `POST /api/data_sources/upload`: multipart upload with a `file` field
//!   holding a CSV file or a spreadsheet (first worksheet is used). Replaces
//!   the session's dataset and returns its columns, row count and the column
//!   picked for `To`.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod upload;

const API_PATH: &str = "/api/data_sources";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/upload", post().to(upload::process))
}
