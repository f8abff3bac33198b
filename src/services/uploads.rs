use crate::{config::UploadConfig, errors::ServiceError};
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};
use utoipa::ToSchema;

lazy_static! {
    static ref UNSAFE_NAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Artwork and document formats accepted from clients, by MIME type and extension.
const ALLOWED_TYPES: &[(&str, &[&str])] = &[
    ("application/pdf", &["pdf"]),
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/gif", &["gif"]),
    ("image/tiff", &["tif", "tiff"]),
    ("image/svg+xml", &["svg"]),
    ("application/postscript", &["ps", "eps", "ai"]),
    ("application/illustrator", &["ai"]),
    ("image/vnd.adobe.photoshop", &["psd"]),
    ("application/x-photoshop", &["psd"]),
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredUpload {
    pub file_name: String,
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// Replaces anything outside `[A-Za-z0-9._-]` with `_` and strips directories.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(original)
        .trim();
    let cleaned = UNSAFE_NAME_CHARS.replace_all(base, "_").into_owned();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Accepts a file when either its declared MIME type or its extension is allowed.
/// Returns the content type to record.
pub fn check_allowed(content_type: Option<&str>, file_name: &str) -> Result<String, ServiceError> {
    let declared = content_type
        .map(|c| c.split(';').next().unwrap_or(c).trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty());
    let ext = extension(file_name);

    if let Some(mime) = declared.as_deref() {
        if ALLOWED_TYPES.iter().any(|(allowed, _)| *allowed == mime) {
            return Ok(mime.to_string());
        }
    }
    if let Some(ext) = ext.as_deref() {
        if let Some((mime, _)) = ALLOWED_TYPES
            .iter()
            .find(|(_, exts)| exts.contains(&ext))
        {
            return Ok((*mime).to_string());
        }
    }
    Err(ServiceError::ValidationError(format!(
        "File type {} is not allowed",
        declared.or(ext).unwrap_or_else(|| "unknown".to_string())
    )))
}

#[derive(Clone)]
pub struct UploadService {
    config: UploadConfig,
}

impl UploadService {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn max_bytes(&self) -> usize {
        self.config.max_upload_bytes
    }

    fn target_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.upload_dir)
    }

    /// Validates and writes an uploaded file as `<unix_millis>-<sanitized name>`.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(ServiceError::ValidationError(format!(
                "File exceeds the {} byte limit",
                self.config.max_upload_bytes
            )));
        }
        let content_type = check_allowed(content_type, original_name)?;

        let file_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        let dir = self.target_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Cannot create upload dir: {}", e)))?;
        fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|e| ServiceError::InternalError(format!("Cannot write upload: {}", e)))?;

        let url = format!(
            "{}/{}",
            self.config.public_url_prefix.trim_end_matches('/'),
            file_name
        );
        info!(file_name = %file_name, content_type = %content_type, "Upload stored");
        Ok(StoredUpload {
            file_name,
            url,
            content_type,
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("proof v2 (final).pdf", "proof_v2__final_.pdf")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\art\\logo.eps", "logo.eps")]
    #[case("café.png", "caf_.png")]
    #[case("...", "upload")]
    fn sanitizes_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_name(input), expected);
    }

    #[test]
    fn allow_list_checks_type_then_extension() {
        assert_eq!(check_allowed(Some("application/pdf"), "x.bin").unwrap(), "application/pdf");
        assert_eq!(
            check_allowed(Some("application/octet-stream"), "cover.TIFF").unwrap(),
            "image/tiff"
        );
        assert_matches!(
            check_allowed(Some("application/x-msdownload"), "setup.exe"),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn stores_with_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(UploadConfig {
            upload_dir: dir.path().to_string_lossy().into_owned(),
            public_url_prefix: "/uploads/".into(),
            max_upload_bytes: 1024,
        });
        let stored = service
            .store("Logo Final.png", Some("image/png"), b"\x89PNG....")
            .await
            .unwrap();
        assert!(stored.file_name.ends_with("-Logo_Final.png"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.file_name));
        assert!(dir.path().join(&stored.file_name).exists());

        let too_big = vec![0u8; 2048];
        assert_matches!(
            service.store("big.pdf", Some("application/pdf"), &too_big).await,
            Err(ServiceError::ValidationError(_))
        );
    }
}
