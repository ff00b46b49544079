//! Template document uploads.
//!
//! - `POST /api/documents/upload`: multipart upload with a `file` field
//!   holding a Markdown or HTML document. The document becomes the session's
//!   message body and its placeholders are returned.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod upload;

const API_PATH: &str = "/api/documents";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/upload", post().to(upload::process))
}
