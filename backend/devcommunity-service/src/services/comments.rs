/// Comment service - handles comment creation, retrieval, and management
use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::middleware::permissions::authorize_owner;
use crate::models::{
    Comment, CommentView, CreateCommentRequest, NewComment, UpdateCommentRequest,
};
use crate::services::target_resolver::TargetResolver;

fn comment_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Comment not found with ID: {id}"))
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn EntityStore>,
    resolver: TargetResolver,
}

impl CommentService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        let resolver = TargetResolver::new(store.clone());
        Self { store, resolver }
    }

    /// Create a comment on exactly one post or response
    pub async fn create_comment(
        &self,
        author_id: i64,
        request: CreateCommentRequest,
    ) -> Result<CommentView> {
        let request = CreateCommentRequest {
            text: request.text.trim().to_string(),
            ..request
        };
        request.validate()?;

        if self.store.find_developer_by_id(author_id).await?.is_none() {
            return Err(AppError::DeveloperNotFound("Developer not found".to_string()));
        }

        let parent = self
            .resolver
            .resolve_comment_parent(request.post_id, request.response_id)
            .await?;

        let comment = self
            .store
            .insert_comment(NewComment {
                author_id,
                parent,
                text: request.text,
            })
            .await?;

        info!(
            comment_id = comment.id,
            developer_id = author_id,
            "Comment created"
        );
        Ok(comment.into())
    }

    pub async fn get_comment(&self, id: i64) -> Result<CommentView> {
        Ok(self.find(id).await?.into())
    }

    pub async fn comments_by_post(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let comments = self.store.list_comments_by_post(post_id).await?;
        Ok(comments.into_iter().map(CommentView::from).collect())
    }

    pub async fn comments_by_response(&self, response_id: i64) -> Result<Vec<CommentView>> {
        let comments = self.store.list_comments_by_response(response_id).await?;
        Ok(comments.into_iter().map(CommentView::from).collect())
    }

    /// Owner-only text update
    pub async fn update_comment(
        &self,
        id: i64,
        requester_id: i64,
        request: UpdateCommentRequest,
    ) -> Result<CommentView> {
        let request = UpdateCommentRequest {
            text: request.text.trim().to_string(),
        };
        request.validate()?;

        let mut comment = self.find(id).await?;
        authorize_owner(&comment, requester_id)?;

        comment.text = request.text;
        let updated = self.store.update_comment(&comment).await?;
        info!(comment_id = id, developer_id = requester_id, "Comment updated");
        Ok(updated.into())
    }

    /// Owner-only delete; returns the removed comment
    pub async fn delete_comment(&self, id: i64, requester_id: i64) -> Result<CommentView> {
        let comment = self.find(id).await?;
        authorize_owner(&comment, requester_id)?;

        if !self.store.delete_comment(id).await? {
            return Err(comment_not_found(id));
        }

        info!(comment_id = id, developer_id = requester_id, "Comment deleted");
        Ok(comment.into())
    }

    async fn find(&self, id: i64) -> Result<Comment> {
        self.store
            .find_comment_by_id(id)
            .await?
            .ok_or_else(|| comment_not_found(id))
    }
}
