use std::io::Write;

use tempfile::NamedTempFile;

use crate::error::{KioskError, Result};

/// Spool uploaded bytes to a named temp file in the transient upload
/// directory.
///
/// The returned guard owns the file: it is removed when the guard drops,
/// on success and on every error path alike, so handlers get the
/// guaranteed-cleanup behavior by simply holding the guard for the
/// duration of the request.
pub async fn spool(bytes: Vec<u8>, upload_dir: String) -> Result<NamedTempFile> {
    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&upload_dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".img")
            .tempfile_in(&upload_dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(|e| KioskError::Internal(format!("Upload spooling task panicked: {e}")))?
}
