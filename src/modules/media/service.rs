use actix_web::web::Bytes;
use futures_util::{stream, Stream, StreamExt};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::api::error;
use crate::modules::media::{
    model::{generate_stored_name, is_safe_stored_name, public_path, NewMedia, UploadConfig},
    repository::MediaRepository,
    schema::MediaEntity,
};

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// A recorded upload opened for reading.
pub struct StoredFile {
    pub entity: MediaEntity,
    pub len: u64,
    pub file: tokio::fs::File,
}

/// Reads `file` in fixed-size chunks until EOF.
pub fn file_chunks(file: tokio::fs::File) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok::<_, std::io::Error>(Some((Bytes::from(buf), file)))
    })
}

#[derive(Clone)]
pub struct MediaService<R>
where
    R: MediaRepository + Send + Sync,
{
    media_repo: Arc<R>,
    config: UploadConfig,
}

impl<R> MediaService<R>
where
    R: MediaRepository + Send + Sync,
{
    pub fn new(media_repo: Arc<R>, config: UploadConfig) -> Self {
        Self { media_repo, config }
    }

    pub fn max_files(&self) -> usize {
        self.config.max_files
    }

    fn disk_path(&self, stored_name: &str) -> PathBuf {
        PathBuf::from(&self.config.upload_dir).join(stored_name)
    }

    /// Create the upload directory if it doesn't exist
    pub async fn ensure_upload_dir(&self) -> Result<(), error::SystemError> {
        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        Ok(())
    }

    /// Streams one uploaded file to disk, enforcing the per-file size limit.
    ///
    /// A partially written file is removed before the error is returned.
    pub async fn store_file<S, B, E>(
        &self,
        original_name: &str,
        mime_type: String,
        uploader: Uuid,
        stream: S,
    ) -> Result<NewMedia, error::SystemError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        self.ensure_upload_dir().await?;

        let stored_name = generate_stored_name(original_name);
        let disk_path = self.disk_path(&stored_name);
        let mut file = tokio::fs::File::create(&disk_path).await?;
        let mut stream = std::pin::pin!(stream);
        let mut size: usize = 0;

        let written: Result<(), error::SystemError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| {
                    error::SystemError::bad_request(format!("Failed to read upload: {e}"))
                })?;
                let bytes = chunk.as_ref();
                size += bytes.len();
                if size > self.config.max_file_size {
                    return Err(error::SystemError::bad_request(format!(
                        "File '{}' exceeds maximum allowed size of {} bytes",
                        original_name, self.config.max_file_size
                    )));
                }
                file.write_all(bytes).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(&disk_path).await {
                warn!("Could not remove partial upload {}: {}", disk_path.display(), remove_err);
            }
            return Err(e);
        }

        Ok(NewMedia {
            original_name: original_name.to_string(),
            path: public_path(&stored_name),
            stored_name,
            mime_type,
            size: size as i64,
            uploader,
        })
    }

    /// Removes files that were written but will not be recorded.
    pub async fn discard(&self, files: &[NewMedia]) {
        for file in files {
            let path = self.disk_path(&file.stored_name);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Could not remove discarded upload {}: {}", path.display(), e);
            }
        }
    }

    /// Records stored files; on failure the files are removed from disk.
    pub async fn commit_upload(
        &self,
        files: Vec<NewMedia>,
    ) -> Result<Vec<MediaEntity>, error::SystemError> {
        if files.is_empty() {
            return Err(error::SystemError::bad_request("No files uploaded"));
        }

        match self.media_repo.insert_many(&files).await {
            Ok(saved) => {
                info!("Recorded {} uploaded file(s) for user {}", saved.len(), files[0].uploader);
                Ok(saved)
            }
            Err(e) => {
                self.discard(&files).await;
                Err(e)
            }
        }
    }

    pub async fn list_newest_first(&self) -> Result<Vec<MediaEntity>, error::SystemError> {
        self.media_repo.find_newest_first().await
    }

    /// Opens a recorded upload for streaming.
    pub async fn open_file(&self, stored_name: &str) -> Result<StoredFile, error::SystemError> {
        if !is_safe_stored_name(stored_name) {
            return Err(error::SystemError::not_found("File not found"));
        }

        let entity = self
            .media_repo
            .find_by_stored_name(stored_name)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;

        match tokio::fs::File::open(self.disk_path(stored_name)).await {
            Ok(file) => {
                let len = file.metadata().await?.len();
                Ok(StoredFile { entity, len, file })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Media {} is recorded but missing on disk", entity.id);
                Err(error::SystemError::not_found("File not found"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
