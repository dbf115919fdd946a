use uuid::Uuid;

use crate::{
    api::error,
    modules::media::{model::NewMedia, repository::MediaRepository, schema::MediaEntity},
};

#[derive(Clone)]
pub struct MediaRepositoryPg {
    pool: sqlx::PgPool,
}

impl MediaRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MediaRepository for MediaRepositoryPg {
    async fn insert_many(&self, items: &[NewMedia]) -> Result<Vec<MediaEntity>, error::SystemError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(items.len());

        for item in items {
            let entity = sqlx::query_as::<_, MediaEntity>(
                r#"
                INSERT INTO media_items (id, original_name, stored_name, mime_type, size, path, uploader)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(&item.original_name)
            .bind(&item.stored_name)
            .bind(&item.mime_type)
            .bind(item.size)
            .bind(&item.path)
            .bind(item.uploader)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(entity);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn find_newest_first(&self) -> Result<Vec<MediaEntity>, error::SystemError> {
        let items = sqlx::query_as::<_, MediaEntity>(
            "SELECT * FROM media_items ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn find_by_stored_name(
        &self,
        stored_name: &str,
    ) -> Result<Option<MediaEntity>, error::SystemError> {
        let item =
            sqlx::query_as::<_, MediaEntity>("SELECT * FROM media_items WHERE stored_name = $1")
                .bind(stored_name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(item)
    }
}
