/// Target resolution for votes and comments
///
/// A request carries up to three optional ids. Exactly one must be set; a zero
/// id counts as unset and a negative id is rejected. The chosen reference must
/// exist in the store.
use std::sync::Arc;

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{CommentParent, VoteTarget};

const MISSING_VOTE_TARGET: &str =
    "Either postId or responseId or commentId must be provided to vote";
const AMBIGUOUS_VOTE_TARGET: &str =
    "Only one of postId, responseId or commentId may be provided to vote";
const MISSING_COMMENT_PARENT: &str = "Either postId or responseId must be provided for a comment";
const AMBIGUOUS_COMMENT_PARENT: &str =
    "A comment must belong to either a post or a response, not both";

/// Treat `0` as absent; reject negatives
pub fn normalize_id(field: &str, id: Option<i64>) -> Result<Option<i64>> {
    match id {
        None | Some(0) => Ok(None),
        Some(id) if id < 0 => Err(AppError::Validation(format!(
            "{field} must be a positive integer, got {id}"
        ))),
        Some(id) => Ok(Some(id)),
    }
}

/// Pick the single vote target named by the request, without touching storage
pub fn select_vote_target(
    post_id: Option<i64>,
    response_id: Option<i64>,
    comment_id: Option<i64>,
) -> Result<VoteTarget> {
    let candidates = [
        normalize_id("postId", post_id)?.map(VoteTarget::Post),
        normalize_id("responseId", response_id)?.map(VoteTarget::Response),
        normalize_id("commentId", comment_id)?.map(VoteTarget::Comment),
    ];

    let mut set = candidates.into_iter().flatten();
    match (set.next(), set.next()) {
        (None, _) => Err(AppError::MissingTarget(MISSING_VOTE_TARGET.to_string())),
        (Some(target), None) => Ok(target),
        (Some(_), Some(_)) => Err(AppError::AmbiguousTarget(AMBIGUOUS_VOTE_TARGET.to_string())),
    }
}

/// Pick the single parent named by a comment request
pub fn select_comment_parent(
    post_id: Option<i64>,
    response_id: Option<i64>,
) -> Result<CommentParent> {
    match (
        normalize_id("postId", post_id)?,
        normalize_id("responseId", response_id)?,
    ) {
        (None, None) => Err(AppError::MissingTarget(MISSING_COMMENT_PARENT.to_string())),
        (Some(id), None) => Ok(CommentParent::Post(id)),
        (None, Some(id)) => Ok(CommentParent::Response(id)),
        (Some(_), Some(_)) => Err(AppError::AmbiguousTarget(
            AMBIGUOUS_COMMENT_PARENT.to_string(),
        )),
    }
}

#[derive(Clone)]
pub struct TargetResolver {
    store: Arc<dyn EntityStore>,
}

impl TargetResolver {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Fail with `TargetNotFound` unless the referenced surface exists
    pub async fn ensure_exists(&self, target: VoteTarget) -> Result<VoteTarget> {
        if self.store.target_exists(target).await? {
            Ok(target)
        } else {
            Err(AppError::TargetNotFound {
                kind: target.kind(),
                id: target.id(),
            })
        }
    }

    pub async fn resolve_vote_target(
        &self,
        post_id: Option<i64>,
        response_id: Option<i64>,
        comment_id: Option<i64>,
    ) -> Result<VoteTarget> {
        let target = select_vote_target(post_id, response_id, comment_id)?;
        self.ensure_exists(target).await
    }

    pub async fn resolve_comment_parent(
        &self,
        post_id: Option<i64>,
        response_id: Option<i64>,
    ) -> Result<CommentParent> {
        let parent = select_comment_parent(post_id, response_id)?;
        self.ensure_exists(parent.into()).await?;
        Ok(parent)
    }
}
