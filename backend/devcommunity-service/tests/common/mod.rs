//! Shared fixtures for devcommunity-service integration tests
//!
//! Builds services over a fresh in-memory store and seeds developers and
//! content through the same store the services read from.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use devcommunity_service::db::{EntityStore, InMemoryEntityStore};
use devcommunity_service::models::{
    AddVoteRequest, Comment, CommentParent, Developer, NewComment, NewPost, NewResponse, Post,
    Response,
};
use devcommunity_service::services::{
    CommentService, DeveloperService, PostService, ReputationAggregator, ReputationPolicy,
    ResponseService, VoteService,
};

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/jwt_test_private.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/jwt_test_public.pem");

pub struct TestContext {
    pub store: Arc<dyn EntityStore>,
    pub votes: VoteService,
    pub developers: DeveloperService,
    pub posts: PostService,
    pub responses: ResponseService,
    pub comments: CommentService,
    pub reputation: ReputationAggregator,
}

impl TestContext {
    pub fn new() -> Self {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());
        let reputation = ReputationAggregator::new(store.clone(), ReputationPolicy::default());

        Self {
            votes: VoteService::new(store.clone()),
            developers: DeveloperService::new(store.clone(), reputation.clone()),
            posts: PostService::new(store.clone()),
            responses: ResponseService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            reputation,
            store,
        }
    }

    pub async fn developer(&self, id: i64, name: &str) -> Developer {
        self.store
            .insert_developer(&Developer {
                id,
                name: Some(name.to_string()),
                skill: Some("rust".to_string()),
                member_since: Utc::now().date_naive(),
            })
            .await
            .expect("seed developer")
    }

    pub async fn post(&self, author_id: i64) -> Post {
        self.store
            .insert_post(NewPost {
                author_id,
                query: "How do lifetimes work?".to_string(),
                topic: "rust".to_string(),
            })
            .await
            .expect("seed post")
    }

    pub async fn response(&self, author_id: i64, post_id: i64) -> Response {
        self.store
            .insert_response(NewResponse {
                author_id,
                post_id,
                answer: "Read the book chapter on borrowing.".to_string(),
            })
            .await
            .expect("seed response")
    }

    pub async fn comment_on_post(&self, author_id: i64, post_id: i64) -> Comment {
        self.store
            .insert_comment(NewComment {
                author_id,
                parent: CommentParent::Post(post_id),
                text: "Good question".to_string(),
            })
            .await
            .expect("seed comment")
    }

    pub async fn comment_on_response(&self, author_id: i64, response_id: i64) -> Comment {
        self.store
            .insert_comment(NewComment {
                author_id,
                parent: CommentParent::Response(response_id),
                text: "Thanks, that helped".to_string(),
            })
            .await
            .expect("seed comment")
    }
}

pub fn vote_on_post(vote_type: &str, developer_id: i64, post_id: i64) -> AddVoteRequest {
    AddVoteRequest {
        vote_type: vote_type.to_string(),
        developer_id: Some(developer_id),
        post_id: Some(post_id),
        ..Default::default()
    }
}

pub fn vote_on_response(vote_type: &str, developer_id: i64, response_id: i64) -> AddVoteRequest {
    AddVoteRequest {
        vote_type: vote_type.to_string(),
        developer_id: Some(developer_id),
        response_id: Some(response_id),
        ..Default::default()
    }
}

pub fn vote_on_comment(vote_type: &str, developer_id: i64, comment_id: i64) -> AddVoteRequest {
    AddVoteRequest {
        vote_type: vote_type.to_string(),
        developer_id: Some(developer_id),
        comment_id: Some(comment_id),
        ..Default::default()
    }
}
