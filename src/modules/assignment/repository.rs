use crate::{
    api::error,
    modules::{media::MediaEntity, user::schema::UserEntity},
};

/// Media and users read from one consistent view, both ascending by creation time.
#[derive(Debug, Clone, Default)]
pub struct AssignmentSnapshot {
    pub media: Vec<MediaEntity>,
    pub users: Vec<UserEntity>,
}

#[async_trait::async_trait]
pub trait AssignmentRepository {
    async fn load_snapshot(&self) -> Result<AssignmentSnapshot, error::SystemError>;
}
