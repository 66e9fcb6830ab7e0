//! Reputation derived from votes on authored posts, responses and comments.

mod common;

use common::{vote_on_comment, vote_on_post, vote_on_response, TestContext};
use devcommunity_service::AppError;
use pretty_assertions::assert_eq;

async fn upvote_post_from(ctx: &TestContext, post_id: i64, voters: std::ops::RangeInclusive<i64>) {
    for voter in voters {
        ctx.votes
            .add_vote(voter, vote_on_post("UPVOTE", voter, post_id))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn five_upvotes_earn_one_point() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    for id in 2..=6 {
        ctx.developer(id, "voter").await;
    }
    let post = ctx.post(1).await;

    upvote_post_from(&ctx, post.id, 2..=6).await;

    assert_eq!(ctx.reputation.compute_reputation(1).await.unwrap(), 1);
}

#[tokio::test]
async fn four_upvotes_are_not_enough() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    for id in 2..=5 {
        ctx.developer(id, "voter").await;
    }
    let post = ctx.post(1).await;

    upvote_post_from(&ctx, post.id, 2..=5).await;

    assert_eq!(ctx.reputation.compute_reputation(1).await.unwrap(), 0);
}

#[tokio::test]
async fn score_spans_posts_responses_and_comments() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    for id in 2..=6 {
        ctx.developer(id, "voter").await;
    }
    let post = ctx.post(1).await;
    let other_post = ctx.post(2).await;
    let response = ctx.response(1, other_post.id).await;
    let comment = ctx.comment_on_post(1, other_post.id).await;

    // 2 on the post, 2 on the response, 2 on the comment, 1 downvote: net 5
    for voter in 2..=3 {
        ctx.votes
            .add_vote(voter, vote_on_post("UPVOTE", voter, post.id))
            .await
            .unwrap();
        ctx.votes
            .add_vote(voter, vote_on_response("UPVOTE", voter, response.id))
            .await
            .unwrap();
        ctx.votes
            .add_vote(voter, vote_on_comment("UPVOTE", voter, comment.id))
            .await
            .unwrap();
    }
    ctx.votes
        .add_vote(4, vote_on_comment("DOWNVOTE", 4, comment.id))
        .await
        .unwrap();
    assert_eq!(ctx.reputation.compute_reputation(1).await.unwrap(), 1);

    ctx.votes
        .add_vote(5, vote_on_post("DOWNVOTE", 5, post.id))
        .await
        .unwrap();
    assert_eq!(ctx.reputation.compute_reputation(1).await.unwrap(), 0);

    // Votes on someone else's post do not count toward Ada
    assert_eq!(ctx.reputation.compute_reputation(2).await.unwrap(), 0);
}

#[tokio::test]
async fn negative_scores_truncate_toward_zero() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    for id in 2..=5 {
        ctx.developer(id, "voter").await;
    }
    let post = ctx.post(1).await;

    for voter in 2..=5 {
        ctx.votes
            .add_vote(voter, vote_on_post("DOWNVOTE", voter, post.id))
            .await
            .unwrap();
    }

    assert_eq!(ctx.reputation.compute_reputation(1).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_developer_has_no_reputation() {
    let ctx = TestContext::new();
    let err = ctx.reputation.compute_reputation(77).await.unwrap_err();
    assert!(matches!(err, AppError::DeveloperNotFound(_)));
}

#[tokio::test]
async fn profile_reports_reputation_and_counts() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    for id in 2..=6 {
        ctx.developer(id, "voter").await;
    }
    let post = ctx.post(1).await;
    ctx.response(1, post.id).await;
    ctx.comment_on_post(1, post.id).await;
    upvote_post_from(&ctx, post.id, 2..=6).await;

    let profile = ctx.developers.get_profile(1).await.unwrap();
    assert_eq!(profile.reputation, 1);
    assert_eq!(profile.total_posts, 1);
    assert_eq!(profile.total_responses, 1);
    assert_eq!(profile.total_comments, 1);
    assert_eq!(profile.total_votes, 0);

    let voter = ctx.developers.get_profile(2).await.unwrap();
    assert_eq!(voter.total_votes, 1);
    assert_eq!(voter.reputation, 0);
}

#[tokio::test]
async fn top_developer_by_reputation() {
    let ctx = TestContext::new();

    let err = ctx.developers.top_by_reputation().await.unwrap_err();
    assert_eq!(err.to_string(), "There are no developers in the database.");

    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    for id in 3..=8 {
        ctx.developer(id, "voter").await;
    }

    // Everyone at zero: lowest id wins
    assert_eq!(ctx.developers.top_by_reputation().await.unwrap().id, 1);

    let post = ctx.post(2).await;
    upvote_post_from(&ctx, post.id, 3..=7).await;

    let top = ctx.developers.top_by_reputation().await.unwrap();
    assert_eq!(top.id, 2);
    assert_eq!(top.reputation, 1);
}
