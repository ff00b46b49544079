//! Data model shared by the merge engine and its HTTP surface.

pub mod jobs;
pub mod model;
pub mod requests;
