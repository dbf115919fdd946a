use crate::{
    api::error,
    modules::{
        assignment::repository::{AssignmentRepository, AssignmentSnapshot},
        media::MediaEntity,
        user::schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct AssignmentRepositoryPg {
    pool: sqlx::PgPool,
}

impl AssignmentRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AssignmentRepository for AssignmentRepositoryPg {
    async fn load_snapshot(&self) -> Result<AssignmentSnapshot, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        // both reads must see the same rows
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let media = sqlx::query_as::<_, MediaEntity>(
            "SELECT * FROM media_items ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        let users =
            sqlx::query_as::<_, UserEntity>("SELECT * FROM users ORDER BY created_at ASC, id ASC")
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(AssignmentSnapshot { media, users })
    }
}
