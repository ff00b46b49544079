use crate::model::mapping::Mapping;
use serde::Deserialize;

/// Request payload for `POST /api/merge/start`. Rows are 1-based and inclusive.
#[derive(Debug, Deserialize)]
pub struct StartMergeRequest {
    pub start_row: Option<usize>,
    pub end_row: Option<usize>,
    #[serde(default = "default_draft")]
    pub draft: bool,
}

fn default_draft() -> bool {
    true
}

/// Request payload for `PUT /api/routing`.
#[derive(Debug, Deserialize)]
pub struct RoutingRequest {
    #[serde(default)]
    pub subject: String,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
}

/// Request payload for `PUT /api/mapping`.
#[derive(Debug, Deserialize)]
pub struct MappingRequest {
    pub mapping: Mapping,
}

/// Request payload for `POST /api/preview/advance`.
#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub step: isize,
}

/// Request payload for `POST /api/preview/jump`. Zero-based.
#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub index: usize,
}
