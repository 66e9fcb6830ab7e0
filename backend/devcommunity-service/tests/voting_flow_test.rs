//! Voting flow over the in-memory store: casting, duplicates, target
//! resolution, counting and deletion.

mod common;

use common::{vote_on_comment, vote_on_post, vote_on_response, TestContext};
use devcommunity_service::models::{AddVoteRequest, TargetKind, VoteType};
use devcommunity_service::AppError;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn upvote_on_post_then_duplicate_is_rejected() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;

    let result = ctx
        .votes
        .add_vote(2, vote_on_post("UPVOTE", 2, post.id))
        .await
        .unwrap();
    assert!(result.vote_id > 0);
    assert_eq!(result.vote_type, VoteType::Upvote);
    assert_eq!(result.developer_id, 2);
    assert_eq!(result.developer_name.as_deref(), Some("Linus"));
    assert_eq!(result.post_id, Some(post.id));
    assert_eq!(result.response_id, None);
    assert_eq!(result.comment_id, None);

    let err = ctx
        .votes
        .add_vote(2, vote_on_post("UPVOTE", 2, post.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateVote(TargetKind::Post)));
    assert_eq!(err.to_string(), "You have already voted on this post.");
}

#[tokio::test]
async fn opposite_vote_type_still_counts_as_duplicate() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;
    let response = ctx.response(1, post.id).await;

    ctx.votes
        .add_vote(2, vote_on_response("upvote", 2, response.id))
        .await
        .unwrap();
    let err = ctx
        .votes
        .add_vote(2, vote_on_response("downvote", 2, response.id))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "You have already voted on this response.");
}

#[tokio::test]
async fn missing_target_is_rejected() {
    let ctx = TestContext::new();
    ctx.developer(2, "Linus").await;

    let request = AddVoteRequest {
        vote_type: "UPVOTE".to_string(),
        developer_id: Some(2),
        ..Default::default()
    };
    let err = ctx.votes.add_vote(2, request).await.unwrap_err();
    assert!(matches!(err, AppError::MissingTarget(_)));
    assert_eq!(
        err.to_string(),
        "Either postId or responseId or commentId must be provided to vote"
    );
}

#[tokio::test]
async fn zero_ids_are_treated_as_absent() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;

    let request = AddVoteRequest {
        vote_type: "UPVOTE".to_string(),
        developer_id: Some(2),
        post_id: Some(post.id),
        response_id: Some(0),
        comment_id: Some(0),
    };
    let result = ctx.votes.add_vote(2, request).await.unwrap();
    assert_eq!(result.post_id, Some(post.id));
}

#[tokio::test]
async fn multiple_targets_are_ambiguous() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;
    let response = ctx.response(1, post.id).await;

    let request = AddVoteRequest {
        vote_type: "UPVOTE".to_string(),
        developer_id: Some(2),
        post_id: Some(post.id),
        response_id: Some(response.id),
        comment_id: None,
    };
    let err = ctx.votes.add_vote(2, request).await.unwrap_err();
    assert!(matches!(err, AppError::AmbiguousTarget(_)));
    assert!(ctx.store.list_all_votes().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_caster_and_unknown_target() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    let post = ctx.post(1).await;

    let err = ctx
        .votes
        .add_vote(9, vote_on_post("UPVOTE", 9, post.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DeveloperNotFound(_)));

    let err = ctx
        .votes
        .add_vote(1, vote_on_comment("UPVOTE", 1, 4242))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Comment not found with ID: 4242");
}

#[tokio::test]
async fn voting_on_behalf_of_someone_else_is_unauthorized() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;

    let err = ctx
        .votes
        .add_vote(2, vote_on_post("UPVOTE", 1, post.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn invalid_vote_type_fails_before_anything_else() {
    let ctx = TestContext::new();

    let err = ctx
        .votes
        .add_vote(2, vote_on_post("SIDEWAYS", 2, 1))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid vote type: SIDEWAYS. Allowed values: UPVOTE, DOWNVOTE"
    );
}

#[tokio::test]
async fn count_by_type_on_comment() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    ctx.developer(3, "Grace").await;
    ctx.developer(4, "Ken").await;
    let post = ctx.post(1).await;
    let comment = ctx.comment_on_post(1, post.id).await;

    ctx.votes
        .add_vote(2, vote_on_comment("UPVOTE", 2, comment.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(3, vote_on_comment("UPVOTE", 3, comment.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(4, vote_on_comment("DOWNVOTE", 4, comment.id))
        .await
        .unwrap();

    assert_eq!(
        ctx.votes
            .count_by_type_and_comment("UPVOTE", comment.id)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        ctx.votes
            .count_by_type_and_comment("downvote", comment.id)
            .await
            .unwrap(),
        1
    );

    let err = ctx
        .votes
        .count_by_type_and_comment("BOGUS", comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidVoteType(_)));
}

#[tokio::test]
async fn votes_by_target_lists_every_vote_and_empty_for_unknown() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    ctx.developer(3, "Grace").await;
    let post = ctx.post(1).await;

    ctx.votes
        .add_vote(2, vote_on_post("UPVOTE", 2, post.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(3, vote_on_post("DOWNVOTE", 3, post.id))
        .await
        .unwrap();

    let votes = ctx
        .votes
        .votes_by_target(TargetKind::Post, post.id)
        .await
        .unwrap();
    let mut casters: Vec<i64> = votes.iter().map(|v| v.developer_id).collect();
    casters.sort_unstable();
    assert_eq!(casters, vec![2, 3]);

    let none = ctx
        .votes
        .votes_by_target(TargetKind::Response, 999)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn only_the_caster_can_delete_a_vote() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;

    let vote = ctx
        .votes
        .add_vote(2, vote_on_post("UPVOTE", 2, post.id))
        .await
        .unwrap();

    let err = ctx.votes.delete_vote(vote.vote_id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(ctx.votes.get_vote(vote.vote_id).await.unwrap().is_some());

    ctx.votes.delete_vote(vote.vote_id, 2).await.unwrap();
    assert!(ctx.votes.get_vote(vote.vote_id).await.unwrap().is_none());

    let err = ctx.votes.delete_vote(vote.vote_id, 2).await.unwrap_err();
    assert_eq!(err.to_string(), format!("Vote not found with ID: {}", vote.vote_id));

    // The pair is free again once the vote is gone
    ctx.votes
        .add_vote(2, vote_on_post("DOWNVOTE", 2, post.id))
        .await
        .unwrap();
}
