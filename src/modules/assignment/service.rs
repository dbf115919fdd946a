use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::{
    assignment::{partition, repository::AssignmentRepository},
    media::MediaEntity,
};

#[derive(Clone)]
pub struct AssignmentService<R>
where
    R: AssignmentRepository + Send + Sync,
{
    repo: Arc<R>,
    block_size: usize,
}

impl<R> AssignmentService<R>
where
    R: AssignmentRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, block_size: usize) -> Self {
        info!("AssignmentService initialized with block size {}", block_size);
        Self { repo, block_size }
    }

    /// Media items currently dealt to `requester`, oldest first.
    ///
    /// Recomputed from a fresh snapshot on every call.
    pub async fn assignments_for(
        &self,
        requester: Uuid,
    ) -> Result<Vec<MediaEntity>, error::SystemError> {
        let snapshot = self.repo.load_snapshot().await?;

        let assigned =
            partition::assign(&snapshot.media, &snapshot.users, self.block_size, &requester)?;

        info!(
            "User {} assigned {} of {} media item(s) across {} user(s)",
            requester,
            assigned.len(),
            snapshot.media.len(),
            snapshot.users.len()
        );

        Ok(assigned.into_iter().cloned().collect())
    }
}
