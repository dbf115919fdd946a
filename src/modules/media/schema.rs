use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Uploaded file metadata row
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MediaEntity {
    pub id: Uuid,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    pub path: String,
    pub uploader: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: Uuid,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size: i64,
    pub path: String,
    pub uploader: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub url: String,
}

impl MediaResponse {
    pub fn from_entity(entity: MediaEntity, base_url: &str) -> Self {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), entity.path);
        MediaResponse {
            id: entity.id,
            original_name: entity.original_name,
            stored_name: entity.stored_name,
            mime_type: entity.mime_type,
            size: entity.size,
            path: entity.path,
            uploader: entity.uploader,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MediaListResponse {
    pub items: Vec<MediaResponse>,
}

impl MediaListResponse {
    pub fn new(entities: Vec<MediaEntity>, base_url: &str) -> Self {
        let items =
            entities.into_iter().map(|entity| MediaResponse::from_entity(entity, base_url)).collect();
        MediaListResponse { items }
    }
}

/// `scheme://host` of the incoming request, used to build public file URLs.
pub fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}
