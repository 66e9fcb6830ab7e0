//! Prometheus metrics for voting and reputation
//!
//! Tracks accepted and rejected votes, deletions, and reputation computation time

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::time::Duration;

use crate::models::{TargetKind, VoteType};

/// Votes persisted, by target kind and vote type
static VOTES_CAST_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "devcommunity_votes_cast_total",
        "Total votes persisted segmented by target kind and vote type",
        &["target_kind", "vote_type"]
    )
    .expect("failed to register devcommunity_votes_cast_total")
});

/// Vote requests rejected, by reason
static VOTES_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "devcommunity_votes_rejected_total",
        "Total vote requests rejected segmented by reason",
        &["reason"]
    )
    .expect("failed to register devcommunity_votes_rejected_total")
});

static VOTES_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "devcommunity_votes_deleted_total",
        "Total votes deleted by their caster"
    )
    .expect("failed to register devcommunity_votes_deleted_total")
});

/// Time spent computing reputation, by operation (single/batch)
static REPUTATION_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "devcommunity_reputation_duration_seconds",
        "Duration of reputation computations",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    )
    .expect("failed to register devcommunity_reputation_duration_seconds")
});

pub fn record_vote_cast(kind: TargetKind, vote_type: VoteType) {
    VOTES_CAST_TOTAL
        .with_label_values(&[kind.as_str(), vote_type.as_str()])
        .inc();
}

pub fn record_vote_rejected(reason: &str) {
    VOTES_REJECTED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_vote_deleted() {
    VOTES_DELETED_TOTAL.inc();
}

pub fn record_reputation_duration(operation: &str, duration: Duration) {
    REPUTATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let before = VOTES_CAST_TOTAL
            .with_label_values(&["post", "UPVOTE"])
            .get();
        record_vote_cast(TargetKind::Post, VoteType::Upvote);
        record_vote_cast(TargetKind::Post, VoteType::Upvote);
        let after = VOTES_CAST_TOTAL
            .with_label_values(&["post", "UPVOTE"])
            .get();
        assert!(after - before >= 2);
    }
}
