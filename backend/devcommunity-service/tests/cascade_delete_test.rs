//! Cascading deletes: removing a post or a developer leaves nothing that
//! still references it.

mod common;

use common::{vote_on_comment, vote_on_post, vote_on_response, TestContext};
use devcommunity_service::models::TargetKind;
use devcommunity_service::AppError;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn deleting_a_post_removes_its_thread_and_votes() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;
    let keep = ctx.post(1).await;
    let response = ctx.response(2, post.id).await;
    let on_post = ctx.comment_on_post(2, post.id).await;
    let on_response = ctx.comment_on_response(1, response.id).await;

    ctx.votes
        .add_vote(2, vote_on_post("UPVOTE", 2, post.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(1, vote_on_response("UPVOTE", 1, response.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(1, vote_on_comment("DOWNVOTE", 1, on_post.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(2, vote_on_comment("UPVOTE", 2, on_response.id))
        .await
        .unwrap();
    let kept_vote = ctx
        .votes
        .add_vote(2, vote_on_post("UPVOTE", 2, keep.id))
        .await
        .unwrap();

    ctx.posts.delete_post(post.id, 1).await.unwrap();

    assert!(ctx.store.find_post_by_id(post.id).await.unwrap().is_none());
    assert!(ctx.store.find_response_by_id(response.id).await.unwrap().is_none());
    assert!(ctx.store.find_comment_by_id(on_post.id).await.unwrap().is_none());
    assert!(ctx.store.find_comment_by_id(on_response.id).await.unwrap().is_none());

    let remaining = ctx.store.list_all_votes().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept_vote.vote_id);

    assert!(ctx
        .votes
        .votes_by_target(TargetKind::Post, post.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn deleting_a_developer_removes_authored_content_and_cast_votes() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let ada_post = ctx.post(1).await;
    let linus_post = ctx.post(2).await;
    let ada_answer = ctx.response(1, linus_post.id).await;
    let linus_comment = ctx.comment_on_response(2, ada_answer.id).await;
    let ada_comment = ctx.comment_on_post(1, linus_post.id).await;

    // Ada casts a vote on Linus' post, Linus votes on Ada's post
    ctx.votes
        .add_vote(1, vote_on_post("UPVOTE", 1, linus_post.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(2, vote_on_post("UPVOTE", 2, ada_post.id))
        .await
        .unwrap();
    ctx.votes
        .add_vote(2, vote_on_comment("UPVOTE", 2, ada_comment.id))
        .await
        .unwrap();

    ctx.developers.delete_developer(1, 1).await.unwrap();

    assert!(ctx.store.find_developer_by_id(1).await.unwrap().is_none());
    assert!(ctx.store.find_post_by_id(ada_post.id).await.unwrap().is_none());
    assert!(ctx.store.find_response_by_id(ada_answer.id).await.unwrap().is_none());
    assert!(ctx.store.find_comment_by_id(ada_comment.id).await.unwrap().is_none());
    // Comment on Ada's response disappears with the response
    assert!(ctx.store.find_comment_by_id(linus_comment.id).await.unwrap().is_none());

    assert!(ctx.store.list_all_votes().await.unwrap().is_empty());
    assert!(ctx.store.find_post_by_id(linus_post.id).await.unwrap().is_some());

    let linus = ctx.developers.get_profile(2).await.unwrap();
    assert_eq!(linus.total_votes, 0);
    assert_eq!(linus.total_comments, 0);
}

#[tokio::test]
async fn deleting_someone_elses_profile_is_unauthorized() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;

    let err = ctx.developers.delete_developer(1, 2).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(ctx.store.find_developer_by_id(1).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_comment_takes_its_votes() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;
    let comment = ctx.comment_on_post(1, post.id).await;
    ctx.votes
        .add_vote(2, vote_on_comment("UPVOTE", 2, comment.id))
        .await
        .unwrap();

    let err = ctx.comments.delete_comment(comment.id, 2).await.unwrap_err();
    assert_eq!(err.to_string(), "You are not authorized to modify this comment");

    let removed = ctx.comments.delete_comment(comment.id, 1).await.unwrap();
    assert_eq!(removed.id, comment.id);
    assert_eq!(removed.post_id, Some(post.id));
    assert_eq!(
        ctx.votes
            .count_by_type_and_comment("UPVOTE", comment.id)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn batch_post_delete_is_all_or_nothing() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let first = ctx.post(1).await;
    let second = ctx.post(1).await;
    let foreign = ctx.post(2).await;

    let err = ctx
        .posts
        .delete_posts(&[first.id, foreign.id], 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(ctx.store.list_posts().await.unwrap().len(), 3);

    let err = ctx
        .posts
        .delete_posts(&[first.id, 9999], 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(ctx.store.list_posts().await.unwrap().len(), 3);

    let deleted = ctx
        .posts
        .delete_posts(&[first.id, second.id, first.id], 1)
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(ctx.store.list_posts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn batch_response_delete_requires_ownership_of_all() {
    let ctx = TestContext::new();
    ctx.developer(1, "Ada").await;
    ctx.developer(2, "Linus").await;
    let post = ctx.post(1).await;
    let mine = ctx.response(2, post.id).await;
    let theirs = ctx.response(1, post.id).await;

    let err = ctx
        .responses
        .delete_responses(&[mine.id, theirs.id], 2)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(ctx.responses.responses_by_post(post.id).await.unwrap().len(), 2);

    assert_eq!(ctx.responses.delete_responses(&[mine.id], 2).await.unwrap(), 1);
    assert_eq!(ctx.responses.responses_by_post(post.id).await.unwrap().len(), 1);
}
