//! In-memory entity store.
//!
//! All state lives behind one `RwLock`, so a delete and its cascade, or a
//! duplicate check and the following insert, happen inside a single write
//! critical section.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{
    AuthoredSurfaces, Comment, CommentParent, Developer, NewComment, NewPost, NewResponse,
    NewVote, Post, Response, Vote, VoteTarget, VoteType,
};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    developers: BTreeMap<i64, Developer>,
    posts: BTreeMap<i64, Post>,
    responses: BTreeMap<i64, Response>,
    comments: BTreeMap<i64, Comment>,
    votes: BTreeMap<i64, Vote>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_developer(&self, id: i64) -> Result<()> {
        if self.developers.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::DeveloperNotFound("Developer not found".to_string()))
        }
    }

    fn require_target(&self, target: VoteTarget) -> Result<()> {
        let exists = match target {
            VoteTarget::Post(id) => self.posts.contains_key(&id),
            VoteTarget::Response(id) => self.responses.contains_key(&id),
            VoteTarget::Comment(id) => self.comments.contains_key(&id),
        };
        if exists {
            Ok(())
        } else {
            Err(AppError::TargetNotFound {
                kind: target.kind(),
                id: target.id(),
            })
        }
    }

    fn delete_developer_cascade(&mut self, id: i64) -> bool {
        if self.developers.remove(&id).is_none() {
            return false;
        }

        let posts: Vec<i64> = self
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in posts {
            self.delete_post_cascade(post_id);
        }

        let responses: Vec<i64> = self
            .responses
            .values()
            .filter(|r| r.author_id == id)
            .map(|r| r.id)
            .collect();
        for response_id in responses {
            self.delete_response_cascade(response_id);
        }

        let comments: Vec<i64> = self
            .comments
            .values()
            .filter(|c| c.author_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in comments {
            self.delete_comment_cascade(comment_id);
        }

        self.votes.retain(|_, v| v.developer_id != id);
        true
    }

    fn delete_post_cascade(&mut self, id: i64) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }

        let responses: Vec<i64> = self
            .responses
            .values()
            .filter(|r| r.post_id == id)
            .map(|r| r.id)
            .collect();
        for response_id in responses {
            self.delete_response_cascade(response_id);
        }

        self.delete_comments_under(CommentParent::Post(id));
        self.votes.retain(|_, v| v.target != VoteTarget::Post(id));
        true
    }

    fn delete_response_cascade(&mut self, id: i64) -> bool {
        if self.responses.remove(&id).is_none() {
            return false;
        }

        self.delete_comments_under(CommentParent::Response(id));
        self.votes.retain(|_, v| v.target != VoteTarget::Response(id));
        true
    }

    fn delete_comments_under(&mut self, parent: CommentParent) {
        let comments: Vec<i64> = self
            .comments
            .values()
            .filter(|c| c.parent == parent)
            .map(|c| c.id)
            .collect();
        for comment_id in comments {
            self.delete_comment_cascade(comment_id);
        }
    }

    fn delete_comment_cascade(&mut self, id: i64) -> bool {
        if self.comments.remove(&id).is_none() {
            return false;
        }
        self.votes.retain(|_, v| v.target != VoteTarget::Comment(id));
        true
    }
}

/// `EntityStore` backed by ordered maps; listings come back in id order.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    state: RwLock<MemoryState>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[async_trait::async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn ping(&self) -> Result<()> {
        let _state = self.state.read().await;
        Ok(())
    }

    async fn find_developer_by_id(&self, id: i64) -> Result<Option<Developer>> {
        Ok(self.state.read().await.developers.get(&id).cloned())
    }

    async fn list_developers(&self) -> Result<Vec<Developer>> {
        Ok(self.state.read().await.developers.values().cloned().collect())
    }

    async fn search_developers_by_skill(&self, skill: &str) -> Result<Vec<Developer>> {
        let needle = skill.to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .developers
            .values()
            .filter(|d| {
                d.skill
                    .as_deref()
                    .is_some_and(|s| contains_ignore_case(s, &needle))
            })
            .cloned()
            .collect())
    }

    async fn insert_developer(&self, developer: &Developer) -> Result<Developer> {
        let mut state = self.state.write().await;
        if state.developers.contains_key(&developer.id) {
            return Err(AppError::Conflict(format!(
                "Developer profile already exists for ID: {}",
                developer.id
            )));
        }
        state.developers.insert(developer.id, developer.clone());
        Ok(developer.clone())
    }

    async fn update_developer(&self, developer: &Developer) -> Result<Developer> {
        let mut state = self.state.write().await;
        match state.developers.get_mut(&developer.id) {
            Some(existing) => {
                *existing = developer.clone();
                Ok(developer.clone())
            }
            None => Err(AppError::DeveloperNotFound("Developer not found".to_string())),
        }
    }

    async fn delete_developer(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.delete_developer_cascade(id))
    }

    async fn authored_surfaces(&self, developer_id: i64) -> Result<AuthoredSurfaces> {
        let state = self.state.read().await;
        Ok(AuthoredSurfaces {
            post_ids: state
                .posts
                .values()
                .filter(|p| p.author_id == developer_id)
                .map(|p| p.id)
                .collect(),
            response_ids: state
                .responses
                .values()
                .filter(|r| r.author_id == developer_id)
                .map(|r| r.id)
                .collect(),
            comment_ids: state
                .comments
                .values()
                .filter(|c| c.author_id == developer_id)
                .map(|c| c.id)
                .collect(),
        })
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let mut state = self.state.write().await;
        state.require_developer(post.author_id)?;
        let id = state.allocate_id();
        let post = Post {
            id,
            query: post.query,
            topic: post.topic,
            created_at: Utc::now(),
            author_id: post.author_id,
        };
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn find_post_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.state.read().await.posts.values().cloned().collect())
    }

    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        Ok(self
            .state
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn search_posts(&self, keyword: &str) -> Result<Vec<Post>> {
        let needle = keyword.to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .posts
            .values()
            .filter(|p| {
                contains_ignore_case(&p.query, &needle) || contains_ignore_case(&p.topic, &needle)
            })
            .cloned()
            .collect())
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        let mut state = self.state.write().await;
        match state.posts.get_mut(&post.id) {
            Some(existing) => {
                existing.query = post.query.clone();
                existing.topic = post.topic.clone();
                Ok(existing.clone())
            }
            None => Err(AppError::NotFound(format!(
                "Post not found with ID: {}",
                post.id
            ))),
        }
    }

    async fn delete_posts(&self, ids: &[i64]) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut deleted = 0;
        for id in ids {
            if state.delete_post_cascade(*id) {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn insert_response(&self, response: NewResponse) -> Result<Response> {
        let mut state = self.state.write().await;
        state.require_developer(response.author_id)?;
        if !state.posts.contains_key(&response.post_id) {
            return Err(AppError::NotFound(format!(
                "Post not found with ID: {}",
                response.post_id
            )));
        }
        let id = state.allocate_id();
        let response = Response {
            id,
            answer: response.answer,
            created_at: Utc::now(),
            post_id: response.post_id,
            author_id: response.author_id,
        };
        state.responses.insert(id, response.clone());
        Ok(response)
    }

    async fn find_response_by_id(&self, id: i64) -> Result<Option<Response>> {
        Ok(self.state.read().await.responses.get(&id).cloned())
    }

    async fn list_responses_by_post(&self, post_id: i64) -> Result<Vec<Response>> {
        Ok(self
            .state
            .read()
            .await
            .responses
            .values()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn list_responses_by_author(&self, author_id: i64) -> Result<Vec<Response>> {
        Ok(self
            .state
            .read()
            .await
            .responses
            .values()
            .filter(|r| r.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn update_response(&self, response: &Response) -> Result<Response> {
        let mut state = self.state.write().await;
        match state.responses.get_mut(&response.id) {
            Some(existing) => {
                existing.answer = response.answer.clone();
                Ok(existing.clone())
            }
            None => Err(AppError::NotFound(format!(
                "Response not found with ID: {}",
                response.id
            ))),
        }
    }

    async fn delete_responses(&self, ids: &[i64]) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut deleted = 0;
        for id in ids {
            if state.delete_response_cascade(*id) {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut state = self.state.write().await;
        state.require_developer(comment.author_id)?;
        state.require_target(comment.parent.into())?;
        let id = state.allocate_id();
        let comment = Comment {
            id,
            text: comment.text,
            created_at: Utc::now(),
            author_id: comment.author_id,
            parent: comment.parent,
        };
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn find_comment_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(self
            .state
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.parent == CommentParent::Post(post_id))
            .cloned()
            .collect())
    }

    async fn list_comments_by_response(&self, response_id: i64) -> Result<Vec<Comment>> {
        Ok(self
            .state
            .read()
            .await
            .comments
            .values()
            .filter(|c| c.parent == CommentParent::Response(response_id))
            .cloned()
            .collect())
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Comment> {
        let mut state = self.state.write().await;
        match state.comments.get_mut(&comment.id) {
            Some(existing) => {
                existing.text = comment.text.clone();
                Ok(existing.clone())
            }
            None => Err(AppError::NotFound(format!(
                "Comment not found with ID: {}",
                comment.id
            ))),
        }
    }

    async fn delete_comment(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.delete_comment_cascade(id))
    }

    async fn find_vote_by_id(&self, id: i64) -> Result<Option<Vote>> {
        Ok(self.state.read().await.votes.get(&id).cloned())
    }

    async fn find_vote_by_developer_and_target(
        &self,
        developer_id: i64,
        target: VoteTarget,
    ) -> Result<Option<Vote>> {
        Ok(self
            .state
            .read()
            .await
            .votes
            .values()
            .find(|v| v.developer_id == developer_id && v.target == target)
            .cloned())
    }

    async fn save_vote(&self, vote: NewVote) -> Result<Vote> {
        let mut state = self.state.write().await;
        state.require_developer(vote.developer_id)?;
        state.require_target(vote.target)?;
        let duplicate = state
            .votes
            .values()
            .any(|v| v.developer_id == vote.developer_id && v.target == vote.target);
        if duplicate {
            return Err(AppError::DuplicateVote(vote.target.kind()));
        }
        let id = state.allocate_id();
        let vote = Vote {
            id,
            vote_type: vote.vote_type,
            developer_id: vote.developer_id,
            target: vote.target,
        };
        state.votes.insert(id, vote.clone());
        Ok(vote)
    }

    async fn delete_vote_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.state.write().await.votes.remove(&id).is_some())
    }

    async fn list_votes_by_target(&self, target: VoteTarget) -> Result<Vec<Vote>> {
        Ok(self
            .state
            .read()
            .await
            .votes
            .values()
            .filter(|v| v.target == target)
            .cloned()
            .collect())
    }

    async fn count_votes_by_type_and_comment(
        &self,
        vote_type: VoteType,
        comment_id: i64,
    ) -> Result<i64> {
        let count = self
            .state
            .read()
            .await
            .votes
            .values()
            .filter(|v| v.vote_type == vote_type && v.target == VoteTarget::Comment(comment_id))
            .count();
        Ok(count as i64)
    }

    async fn list_all_votes(&self) -> Result<Vec<Vote>> {
        Ok(self.state.read().await.votes.values().cloned().collect())
    }
}
