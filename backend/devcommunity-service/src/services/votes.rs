/// Vote service - casting, deleting and querying votes
///
/// Casting a vote walks: vote type -> requester binding -> caster lookup ->
/// target resolution -> duplicate check -> insert. Any failed step stops the
/// request and is counted as a rejection.
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics::votes::{record_vote_cast, record_vote_deleted, record_vote_rejected};
use crate::middleware::permissions::check_vote_ownership;
use crate::models::{AddVoteRequest, NewVote, TargetKind, Vote, VoteResult, VoteTarget, VoteType};
use crate::services::target_resolver::{normalize_id, TargetResolver};

#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn EntityStore>,
    resolver: TargetResolver,
}

impl VoteService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let resolver = TargetResolver::new(store.clone());
        Self { store, resolver }
    }

    /// Cast a vote on behalf of the authenticated requester
    pub async fn add_vote(&self, requester_id: i64, request: AddVoteRequest) -> Result<VoteResult> {
        match self.try_add_vote(requester_id, request).await {
            Ok(result) => Ok(result),
            Err(err) => {
                record_vote_rejected(err.reason());
                match &err {
                    AppError::DuplicateVote(_) | AppError::Unauthorized(_) => {
                        warn!(developer_id = requester_id, error = %err, "Vote rejected")
                    }
                    _ => tracing::debug!(developer_id = requester_id, error = %err, "Vote rejected"),
                }
                Err(err)
            }
        }
    }

    async fn try_add_vote(&self, requester_id: i64, request: AddVoteRequest) -> Result<VoteResult> {
        let vote_type: VoteType = request.vote_type.parse()?;

        if let Some(claimed) = normalize_id("developerId", request.developer_id)? {
            if claimed != requester_id {
                return Err(AppError::Unauthorized(
                    "You are not authorized to vote on behalf of another developer.".to_string(),
                ));
            }
        }

        let caster = self
            .store
            .find_developer_by_id(requester_id)
            .await?
            .ok_or_else(|| AppError::DeveloperNotFound("Developer not found".to_string()))?;

        let target = self
            .resolver
            .resolve_vote_target(request.post_id, request.response_id, request.comment_id)
            .await?;

        if self
            .store
            .find_vote_by_developer_and_target(caster.id, target)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateVote(target.kind()));
        }

        let vote = self
            .store
            .save_vote(NewVote {
                developer_id: caster.id,
                vote_type,
                target,
            })
            .await?;

        record_vote_cast(target.kind(), vote_type);
        info!(
            vote_id = vote.id,
            developer_id = caster.id,
            target = %target,
            vote_type = %vote_type,
            "Vote cast"
        );

        Ok(VoteResult::from_vote(&vote, caster.name))
    }

    /// Delete a vote; only its caster may do so
    pub async fn delete_vote(&self, vote_id: i64, requester_id: i64) -> Result<()> {
        let vote = self
            .store
            .find_vote_by_id(vote_id)
            .await?
            .ok_or(AppError::VoteNotFound(vote_id))?;

        check_vote_ownership(&vote, requester_id)?;

        if !self.store.delete_vote_by_id(vote_id).await? {
            return Err(AppError::VoteNotFound(vote_id));
        }

        record_vote_deleted();
        info!(vote_id, developer_id = requester_id, "Vote deleted");
        Ok(())
    }

    pub async fn get_vote(&self, vote_id: i64) -> Result<Option<VoteResult>> {
        match self.store.find_vote_by_id(vote_id).await? {
            Some(vote) => Ok(self.project(vec![vote]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// All votes on one post, response or comment; empty when there are none
    pub async fn votes_by_target(&self, kind: TargetKind, target_id: i64) -> Result<Vec<VoteResult>> {
        let target_id = normalize_id("targetId", Some(target_id))?.ok_or_else(|| {
            AppError::Validation("targetId must be a positive integer".to_string())
        })?;

        let votes = self
            .store
            .list_votes_by_target(VoteTarget::new(kind, target_id))
            .await?;
        self.project(votes).await
    }

    /// Number of votes of one type on a comment
    pub async fn count_by_type_and_comment(&self, vote_type: &str, comment_id: i64) -> Result<i64> {
        let vote_type: VoteType = vote_type.parse()?;
        self.store
            .count_votes_by_type_and_comment(vote_type, comment_id)
            .await
    }

    /// Attach caster names, looking each developer up once
    async fn project(&self, votes: Vec<Vote>) -> Result<Vec<VoteResult>> {
        let mut names: HashMap<i64, Option<String>> = HashMap::new();
        let mut results = Vec::with_capacity(votes.len());

        for vote in &votes {
            if !names.contains_key(&vote.developer_id) {
                let name = self
                    .store
                    .find_developer_by_id(vote.developer_id)
                    .await?
                    .and_then(|d| d.name);
                names.insert(vote.developer_id, name);
            }
            let name = names.get(&vote.developer_id).cloned().flatten();
            results.push(VoteResult::from_vote(vote, name));
        }

        Ok(results)
    }
}
