use rand::Rng;
use uuid::Uuid;

use crate::constants::{DEFAULT_MAX_FILES_PER_UPLOAD, DEFAULT_MAX_FILE_SIZE, PUBLIC_UPLOAD_PREFIX};

/// Metadata of a file already written to disk, waiting to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedia {
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    pub path: String,
    pub uploader: Uuid,
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub max_files: usize,
    pub upload_dir: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES_PER_UPLOAD,
            upload_dir: "./uploads".to_string(),
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}

/// `<unix millis>-<random>-<sanitized original>`
pub fn generate_stored_name(original: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}-{}", millis, suffix, sanitize_filename(original))
}

pub fn public_path(stored_name: &str) -> String {
    format!("{}/{}", PUBLIC_UPLOAD_PREFIX, stored_name)
}

/// Stored names are single path components; anything else never hits the disk.
pub fn is_safe_stored_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}
