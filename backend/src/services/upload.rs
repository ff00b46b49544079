use crate::error::ApiError;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn upload_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::Upload(e.to_string())
}

/// Runs file I/O on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(upload_error)?
        .map_err(upload_error)
}

/// Streams the multipart `file` field into its own directory under `dir`,
/// keeping the client's file name so its extension picks the loader.
pub(crate) async fn save_upload(mut payload: Multipart, dir: &Path) -> Result<PathBuf, ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(upload_error)?;
        let disposition = field.content_disposition().cloned();
        let Some(disposition) = disposition else {
            continue;
        };
        if disposition.get_name() != Some("file") {
            continue;
        }

        // Only the final path component of the client-supplied name is used.
        let file_name = disposition
            .get_filename()
            .and_then(|f| Path::new(f).file_name())
            .map(|f| f.to_os_string())
            .ok_or_else(|| ApiError::Upload("The file part has no file name".into()))?;

        let target_dir = dir.join(Uuid::new_v4().to_string());
        let path = target_dir.join(file_name);
        let create_path = path.clone();
        let mut file: File = blocking(move || {
            fs::create_dir_all(&target_dir)?;
            File::create(create_path)
        })
        .await?;

        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(upload_error)?;
            file = blocking(move || {
                let mut file = file;
                file.write_all(&chunk)?;
                Ok(file)
            })
            .await?;
        }
        blocking(move || file.sync_all()).await?;
        debug!("Stored upload at {}", path.display());
        return Ok(path);
    }
    Err(ApiError::Upload("Missing file".into()))
}

/// Deletes the upload directory of a file the session no longer uses,
/// unless it also holds `keep`.
///
/// Only uuid-named directories directly under `upload_dir` are removed.
pub(crate) fn prune_upload(upload_dir: &Path, replaced: Option<&Path>, keep: Option<&Path>) {
    let Some(old_dir) = replaced.and_then(Path::parent) else {
        return;
    };
    if old_dir.parent() != Some(upload_dir) || Some(old_dir) == keep.and_then(Path::parent) {
        return;
    }
    let is_upload = old_dir
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| Uuid::parse_str(n).is_ok());
    if !is_upload {
        return;
    }
    match fs::remove_dir_all(old_dir) {
        Ok(()) => debug!("Removed replaced upload {}", old_dir.display()),
        Err(e) => warn!("Could not remove {}: {}", old_dir.display(), e),
    }
}
