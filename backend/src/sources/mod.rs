//! Loaders for the two inputs of a merge: the template document and the
//! tabular data source.

pub mod document;
pub mod samples;
pub mod tabular;

use crate::error::LoadError;
use std::path::Path;

fn extension(path: &Path) -> Result<String, LoadError> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| LoadError::UnsupportedType(path.display().to_string()))
}
