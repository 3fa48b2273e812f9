use crate::error::ApiError;
use crate::models::db_operations::users_db_operations;
use actix_multipart::Multipart;
use actix_web::web;
use futures_util::StreamExt;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Securely maps a validated MIME type to a safe file extension. The client
/// filename is never trusted; this mapping is intentionally not configurable.
pub fn mime_to_safe_extension(mime_type: &str) -> Option<&'static str> {
    let map: BTreeMap<&str, &str> = [
        ("application/pdf", "pdf"),
        ("image/gif", "gif"),
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/webp", "webp"),
        ("video/mp4", "mp4"),
        ("video/webm", "webm"),
    ]
    .iter()
    .cloned()
    .collect();

    map.get(mime_type).cloned()
}

/// Upload limits loaded from the settings table.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_mime_types: HashSet<String>,
    pub max_file_size_mb: u64,
    pub rate_limit_per_minute: usize,
}

impl UploadPolicy {
    pub fn from_settings(conn: &Connection) -> UploadPolicy {
        let max_file_size_mb = users_db_operations::read_setting(conn, "max_file_upload_size_mb")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let allowed_mime_types: HashSet<String> =
            users_db_operations::read_setting(conn, "allowed_mime_types")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

        let rate_limit_per_minute =
            users_db_operations::read_setting(conn, "upload_rate_limit_per_minute")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(20);

        UploadPolicy {
            allowed_mime_types,
            max_file_size_mb,
            rate_limit_per_minute,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Gate check: is the declared MIME allowed, and does it map to a safe
    /// extension? Returns the extension to use.
    pub fn validate_mime(&self, mime_type: &str) -> Result<&'static str, ApiError> {
        if self.allowed_mime_types.is_empty() {
            return Err(ApiError::Validation(
                "File uploads are currently disabled. No MIME types are configured.".to_string(),
            ));
        }
        if !self.allowed_mime_types.contains(mime_type) {
            return Err(ApiError::Validation(format!(
                "Unsupported file type: '{}'. Please upload one of the allowed types.",
                mime_type
            )));
        }
        match mime_to_safe_extension(mime_type) {
            Some(ext) => Ok(ext),
            None => {
                log::error!(
                    "Configured allowed MIME type '{}' has no safe extension mapping.",
                    mime_type
                );
                Err(ApiError::Internal(
                    "An internal server configuration error occurred.".to_string(),
                ))
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedUpload {
    pub id: String,
    pub url: String,
}

/// Sharded on-disk location for an upload id, e.g. `ab/cd` for `abcd...`.
fn shard_dirs(id: &str) -> (&str, &str) {
    (&id[0..2], &id[2..4])
}

/// Writes streamed chunks to a file while enforcing the byte ceiling. The
/// partial file is removed the moment the ceiling is breached, and
/// `discard` removes it when a later part of the request fails.
#[derive(Debug)]
struct FileSink {
    file: fs::File,
    path: PathBuf,
    written: u64,
    max_bytes: u64,
    max_mb: u64,
}

impl FileSink {
    fn create(path: PathBuf, max_bytes: u64, max_mb: u64) -> Result<FileSink, ApiError> {
        let file = fs::File::create(&path)
            .map_err(|e| ApiError::Internal(format!("Could not create upload file: {}", e)))?;
        Ok(FileSink {
            file,
            path,
            written: 0,
            max_bytes,
            max_mb,
        })
    }

    fn push(mut self, data: &[u8]) -> Result<FileSink, ApiError> {
        self.written += data.len() as u64;
        if self.written > self.max_bytes {
            drop(self.file);
            let _ = fs::remove_file(&self.path);
            return Err(ApiError::Validation(format!(
                "File is too large. Maximum size is {}MB.",
                self.max_mb
            )));
        }
        self.file
            .write_all(data)
            .map_err(|e| ApiError::Internal(format!("File write error: {}", e)))?;
        Ok(self)
    }

    fn discard(self) {
        let _ = fs::remove_file(&self.path);
    }

    fn finish(self) -> PathBuf {
        self.path
    }
}

fn discard_partial(stored: &Option<PathBuf>) {
    if let Some(path) = stored {
        let _ = fs::remove_file(path);
    }
}

/// Streams the multipart `file` field to disk under a randomized name,
/// enforcing the MIME allow-list and the size ceiling while streaming. A
/// partial file is removed as soon as the ceiling is breached. Returns the
/// public `/media` URL of the stored file.
pub async fn save_upload(
    media_root: &Path,
    policy: &UploadPolicy,
    mut payload: Multipart,
) -> Result<SavedUpload, ApiError> {
    let file_id = Uuid::new_v4().to_string();
    let max_bytes = policy.max_file_size_bytes();

    let max_mb = policy.max_file_size_mb;
    let mut stored_path: Option<PathBuf> = None;
    let mut file_ext = "";

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                discard_partial(&stored_path);
                return Err(ApiError::Validation(format!(
                    "Malformed multipart payload: {}",
                    e
                )));
            }
        };
        let field_name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        if field_name != "file" {
            // Drain and ignore any extra form fields.
            while let Some(chunk) = field.next().await {
                if let Err(e) = chunk {
                    discard_partial(&stored_path);
                    return Err(ApiError::Validation(format!(
                        "Malformed multipart payload: {}",
                        e
                    )));
                }
            }
            continue;
        }

        if stored_path.is_some() {
            discard_partial(&stored_path);
            return Err(ApiError::Validation(
                "Only one file per upload request is accepted.".to_string(),
            ));
        }

        let content_type = field
            .content_type()
            .ok_or_else(|| ApiError::Validation("Content-Type not available.".to_string()))?
            .to_string();
        file_ext = policy.validate_mime(&content_type)?;

        let (dir1, dir2) = shard_dirs(&file_id);
        let dir = media_root.join("uploads").join(dir1).join(dir2);
        let final_path = dir.join(format!("{}.{}", file_id, file_ext));

        web::block({
            let dir = dir.clone();
            move || fs::create_dir_all(&dir)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking error: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("Could not create upload directory: {}", e)))?;

        let mut sink = web::block({
            let final_path = final_path.clone();
            move || FileSink::create(final_path, max_bytes, max_mb)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking error: {}", e)))??;

        while let Some(chunk) = field.next().await {
            let data = match chunk {
                Ok(data) => data,
                Err(e) => {
                    sink.discard();
                    return Err(ApiError::Validation(format!("Upload stream error: {}", e)));
                }
            };
            sink = web::block(move || sink.push(&data))
                .await
                .map_err(|e| ApiError::Internal(format!("Blocking error: {}", e)))??;
        }

        stored_path = Some(sink.finish());
    }

    if stored_path.is_none() {
        return Err(ApiError::Validation("No file was uploaded.".to_string()));
    }

    let (dir1, dir2) = shard_dirs(&file_id);
    let url = format!("/media/uploads/{}/{}/{}.{}", dir1, dir2, file_id, file_ext);
    Ok(SavedUpload { id: file_id, url })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(types: &[&str], max_mb: u64) -> UploadPolicy {
        UploadPolicy {
            allowed_mime_types: types.iter().map(|s| s.to_string()).collect(),
            max_file_size_mb: max_mb,
            rate_limit_per_minute: 20,
        }
    }

    #[test]
    fn allowed_mime_maps_to_extension() {
        let p = policy(&["image/jpeg", "application/pdf"], 10);
        assert_eq!(p.validate_mime("image/jpeg").unwrap(), "jpg");
        assert_eq!(p.validate_mime("application/pdf").unwrap(), "pdf");
    }

    #[test]
    fn disallowed_mime_rejected() {
        let p = policy(&["image/jpeg"], 10);
        assert!(matches!(
            p.validate_mime("application/x-msdownload"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn empty_allow_list_disables_uploads() {
        let p = policy(&[], 10);
        assert!(matches!(p.validate_mime("image/jpeg"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn allowed_but_unmapped_mime_is_internal_error() {
        let p = policy(&["application/x-tar"], 10);
        assert!(matches!(
            p.validate_mime("application/x-tar"),
            Err(ApiError::Internal(_))
        ));
    }

    #[test]
    fn policy_falls_back_to_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE settings (key TEXT PRIMARY KEY, value TEXT NOT NULL);")
            .unwrap();
        let p = UploadPolicy::from_settings(&conn);
        assert_eq!(p.max_file_size_mb, 10);
        assert_eq!(p.rate_limit_per_minute, 20);
        assert!(p.allowed_mime_types.is_empty());
    }

    fn temp_upload_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dernek-upload-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn oversize_stream_is_rejected_and_partial_file_removed() {
        let dir = temp_upload_dir();
        let path = dir.join("chunked.bin");

        let sink = FileSink::create(path.clone(), 8, 1).unwrap();
        let sink = sink.push(&[0u8; 6]).unwrap();
        assert!(path.exists());

        // The next chunk crosses the ceiling mid-stream.
        let err = sink.push(&[0u8; 6]).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(!path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn at_ceiling_stream_is_kept() {
        let dir = temp_upload_dir();
        let path = dir.join("exact.bin");

        let sink = FileSink::create(path.clone(), 8, 1).unwrap();
        let sink = sink.push(&[0u8; 8]).unwrap();
        let stored = sink.finish();
        assert_eq!(stored, path);
        assert_eq!(fs::metadata(&path).unwrap().len(), 8);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn discard_removes_stored_file() {
        let dir = temp_upload_dir();
        let path = dir.join("orphan.bin");

        let sink = FileSink::create(path.clone(), 64, 1).unwrap();
        let sink = sink.push(b"icerik").unwrap();
        sink.discard();
        assert!(!path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn shard_dirs_split_the_uuid() {
        let id = "deadbeef-0000-0000-0000-000000000000";
        assert_eq!(shard_dirs(id), ("de", "ad"));
    }

    #[test]
    fn size_ceiling_in_bytes() {
        assert_eq!(policy(&[], 2).max_file_size_bytes(), 2 * 1024 * 1024);
    }
}
