//! Deterministic round-robin partitioning of media items into per-user blocks.
//!
//! The media sequence is cut into consecutive chunks of `block_size` items and
//! chunk `i` belongs to `users[i % users.len()]`. Nothing here touches I/O; the
//! caller supplies both sequences already ordered by creation time.

use uuid::Uuid;

/// A record that can receive assignments.
pub trait Assignee {
    type Id: PartialEq + Clone;

    fn assignee_id(&self) -> &Self::Id;
}

impl Assignee for Uuid {
    type Id = Uuid;

    fn assignee_id(&self) -> &Uuid {
        self
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Assignment block size must be positive, got {block_size}")]
    InvalidConfiguration { block_size: usize },
    #[error("No users available for assignments")]
    NoUsersAvailable,
    #[error("Requester is not a registered user")]
    RequesterNotAuthorized,
}

/// A contiguous run of at most `block_size` media items owned by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a, M, I> {
    pub assigned_user_id: I,
    pub media_items: &'a [M],
}

/// Splits `media` into segments and deals them to `users` round-robin.
///
/// An empty `media` slice yields no segments even when `users` is empty.
pub fn partition<'a, M, U>(
    media: &'a [M],
    users: &[U],
    block_size: usize,
) -> Result<Vec<Segment<'a, M, U::Id>>, AssignmentError>
where
    U: Assignee,
{
    if block_size == 0 {
        return Err(AssignmentError::InvalidConfiguration { block_size });
    }
    if media.is_empty() {
        return Ok(Vec::new());
    }
    if users.is_empty() {
        return Err(AssignmentError::NoUsersAvailable);
    }

    let segments = media
        .chunks(block_size)
        .zip(users.iter().cycle())
        .map(|(media_items, user)| Segment {
            assigned_user_id: user.assignee_id().clone(),
            media_items,
        })
        .collect();

    Ok(segments)
}

/// Returns the media items dealt to `requester`, in their original order.
pub fn assign<'a, M, U>(
    media: &'a [M],
    users: &[U],
    block_size: usize,
    requester: &U::Id,
) -> Result<Vec<&'a M>, AssignmentError>
where
    U: Assignee,
{
    let segments = partition(media, users, block_size)?;
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    if !users.iter().any(|user| user.assignee_id() == requester) {
        return Err(AssignmentError::RequesterNotAuthorized);
    }

    Ok(segments
        .into_iter()
        .filter(|segment| &segment.assigned_user_id == requester)
        .flat_map(|segment| segment.media_items.iter())
        .collect())
}
