/// Authorization module for devcommunity-service
///
/// Provides ownership-based permission checks for posts, responses, comments,
/// votes and developer profiles. Developers may only modify what they authored.
use crate::error::{AppError, Result};
use crate::models::{Comment, Post, Response, Vote};

/// Content with a single authoring developer
pub trait Owned {
    /// Resource name used in rejection messages
    const RESOURCE: &'static str;

    fn owner_id(&self) -> i64;
}

impl Owned for Post {
    const RESOURCE: &'static str = "post";

    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

impl Owned for Response {
    const RESOURCE: &'static str = "response";

    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

impl Owned for Comment {
    const RESOURCE: &'static str = "comment";

    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

/// Check if a developer owns a post, response or comment
pub fn authorize_owner<T: Owned>(entity: &T, requester_id: i64) -> Result<()> {
    if entity.owner_id() == requester_id {
        Ok(())
    } else {
        tracing::warn!(
            resource = T::RESOURCE,
            owner_id = entity.owner_id(),
            requester_id,
            "Ownership check failed"
        );
        Err(AppError::Unauthorized(format!(
            "You are not authorized to modify this {}",
            T::RESOURCE
        )))
    }
}

/// Only the caster may delete a vote
pub fn check_vote_ownership(vote: &Vote, requester_id: i64) -> Result<()> {
    if vote.developer_id == requester_id {
        Ok(())
    } else {
        tracing::warn!(
            vote_id = vote.id,
            caster_id = vote.developer_id,
            requester_id,
            "Vote deletion rejected"
        );
        Err(AppError::Unauthorized(
            "You are not authorized to delete this vote.".to_string(),
        ))
    }
}

/// A developer may only remove their own profile
pub fn check_profile_ownership(developer_id: i64, requester_id: i64) -> Result<()> {
    if developer_id == requester_id {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "You are not authorized to modify this developer profile".to_string(),
        ))
    }
}
