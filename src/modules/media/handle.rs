use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::api::success::Success;
use crate::api::{error, success};
use crate::constants::UPLOAD_FIELD;
use crate::middlewares::get_auth_user;
use crate::modules::media::{
    model::NewMedia,
    repository::MediaRepository,
    schema::{base_url, MediaListResponse},
    service::{file_chunks, MediaService},
};

/// Writes every `files` part to disk, pushing each stored file onto `staged`.
async fn stage_files<R>(
    payload: &mut Multipart,
    service: &MediaService<R>,
    uploader: Uuid,
    staged: &mut Vec<NewMedia>,
) -> Result<(), error::Error>
where
    R: MediaRepository + Send + Sync,
{
    while let Some(mut field) =
        payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            // drain parts we don't store
            while field
                .try_next()
                .await
                .map_err(|e| error::Error::bad_request(e.to_string()))?
                .is_some()
            {}
            continue;
        }

        if staged.len() >= service.max_files() {
            return Err(error::Error::bad_request(format!(
                "At most {} files can be uploaded at once",
                service.max_files()
            )));
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| error::Error::bad_request("Missing filename"))?;

        // Detect MIME type
        let mime_type = field.content_type().map(|m| m.to_string()).unwrap_or_else(|| {
            mime_guess::from_path(&filename).first_or_octet_stream().to_string()
        });

        let stored = service.store_file(&filename, mime_type, uploader, field).await?;
        staged.push(stored);
    }

    Ok(())
}

/// Upload files handler
pub async fn upload_files<R>(
    mut payload: Multipart,
    req: HttpRequest,
    service: web::Data<MediaService<R>>,
) -> Result<success::Success<MediaListResponse>, error::Error>
where
    R: MediaRepository + Send + Sync + 'static,
{
    let uploader = get_auth_user(&req)?.id;

    let mut staged = Vec::new();
    if let Err(e) = stage_files(&mut payload, &service, uploader, &mut staged).await {
        service.discard(&staged).await;
        return Err(e);
    }

    let saved = service.commit_upload(staged).await?;
    let response = MediaListResponse::new(saved, &base_url(&req));

    Ok(Success::created(Some(response)).message("Files uploaded successfully"))
}

/// List every media item, newest first
pub async fn list_media<R>(
    req: HttpRequest,
    service: web::Data<MediaService<R>>,
) -> Result<success::Success<MediaListResponse>, error::Error>
where
    R: MediaRepository + Send + Sync + 'static,
{
    let items = service.list_newest_first().await?;
    Ok(Success::ok(Some(MediaListResponse::new(items, &base_url(&req)))))
}

/// Serve a stored upload
pub async fn serve_upload<R>(
    stored_name: web::Path<String>,
    service: web::Data<MediaService<R>>,
) -> Result<HttpResponse, error::Error>
where
    R: MediaRepository + Send + Sync + 'static,
{
    let stored = service.open_file(&stored_name.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type(stored.entity.mime_type)
        .no_chunking(stored.len)
        .streaming(file_chunks(stored.file)))
}
