use crate::{
    api::error,
    modules::media::{model::NewMedia, schema::MediaEntity},
};

#[async_trait::async_trait]
pub trait MediaRepository {
    /// Records every item or none of them.
    async fn insert_many(&self, items: &[NewMedia]) -> Result<Vec<MediaEntity>, error::SystemError>;

    async fn find_newest_first(&self) -> Result<Vec<MediaEntity>, error::SystemError>;

    async fn find_by_stored_name(
        &self,
        stored_name: &str,
    ) -> Result<Option<MediaEntity>, error::SystemError>;
}
