/// Reputation aggregation
///
/// Reputation is derived, never stored: the net vote score across everything a
/// developer authored, divided by the policy divisor with truncation toward zero.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics::votes::record_reputation_duration;
use crate::models::{AuthoredSurfaces, Vote, VoteTarget, VoteType};

pub const DEFAULT_REPUTATION_DIVISOR: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationPolicy {
    divisor: i64,
}

impl Default for ReputationPolicy {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_REPUTATION_DIVISOR,
        }
    }
}

impl ReputationPolicy {
    pub fn new(divisor: i64) -> Result<Self> {
        if divisor <= 0 {
            return Err(AppError::Validation(format!(
                "Reputation divisor must be positive, got {divisor}"
            )));
        }
        Ok(Self { divisor })
    }

    pub fn divisor(&self) -> i64 {
        self.divisor
    }

    /// Integer division truncating toward zero: -4 / 5 == 0, -5 / 5 == -1
    pub fn reputation_for(&self, score: i64) -> i64 {
        score / self.divisor
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl Tally {
    pub fn net(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

/// Votes indexed by target, plus how many votes each developer cast.
#[derive(Debug, Clone, Default)]
pub struct VoteSnapshot {
    tallies: HashMap<VoteTarget, Tally>,
    cast_counts: HashMap<i64, usize>,
}

impl VoteSnapshot {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let mut snapshot = Self::default();
        for vote in votes {
            let tally = snapshot.tallies.entry(vote.target).or_default();
            match vote.vote_type {
                VoteType::Upvote => tally.upvotes += 1,
                VoteType::Downvote => tally.downvotes += 1,
            }
            *snapshot.cast_counts.entry(vote.developer_id).or_default() += 1;
        }
        snapshot
    }

    pub fn tally(&self, target: &VoteTarget) -> Tally {
        self.tallies.get(target).copied().unwrap_or_default()
    }

    pub fn votes_cast_by(&self, developer_id: i64) -> usize {
        self.cast_counts.get(&developer_id).copied().unwrap_or(0)
    }

    /// Upvotes minus downvotes over every authored surface
    pub fn net_score(&self, surfaces: &AuthoredSurfaces) -> i64 {
        let posts = surfaces.post_ids.iter().map(|id| VoteTarget::Post(*id));
        let responses = surfaces
            .response_ids
            .iter()
            .map(|id| VoteTarget::Response(*id));
        let comments = surfaces
            .comment_ids
            .iter()
            .map(|id| VoteTarget::Comment(*id));

        posts
            .chain(responses)
            .chain(comments)
            .map(|target| self.tally(&target).net())
            .sum()
    }
}

/// Pure reputation computation over a fixed snapshot
pub fn compute_reputation(
    surfaces: &AuthoredSurfaces,
    snapshot: &VoteSnapshot,
    policy: ReputationPolicy,
) -> i64 {
    policy.reputation_for(snapshot.net_score(surfaces))
}

/// Loads snapshots from the store and computes reputation on demand.
#[derive(Clone)]
pub struct ReputationAggregator {
    store: Arc<dyn EntityStore>,
    policy: ReputationPolicy,
}

impl ReputationAggregator {
    pub fn new(store: Arc<dyn EntityStore>, policy: ReputationPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ReputationPolicy {
        self.policy
    }

    /// One vote scan shared by every developer in a batch
    pub async fn snapshot(&self) -> Result<VoteSnapshot> {
        let votes = self.store.list_all_votes().await?;
        Ok(VoteSnapshot::from_votes(&votes))
    }

    pub async fn compute_reputation(&self, developer_id: i64) -> Result<i64> {
        let start = Instant::now();

        if self.store.find_developer_by_id(developer_id).await?.is_none() {
            return Err(AppError::DeveloperNotFound("Developer not found".to_string()));
        }

        let surfaces = self.store.authored_surfaces(developer_id).await?;
        let snapshot = self.snapshot().await?;
        let reputation = compute_reputation(&surfaces, &snapshot, self.policy);

        record_reputation_duration("single", start.elapsed());
        tracing::debug!(developer_id, reputation, "Computed reputation");
        Ok(reputation)
    }
}
