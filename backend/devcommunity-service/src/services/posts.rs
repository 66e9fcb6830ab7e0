/// Post service - handles post creation, retrieval, search and deletion
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::middleware::permissions::authorize_owner;
use crate::models::{normalize_optional, CreatePostRequest, NewPost, Post, UpdatePostRequest};

pub(crate) fn post_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Post not found with ID: {id}"))
}

/// Deduplicate batch ids, rejecting empty batches and non-positive ids
pub(crate) fn batch_ids(ids: &[i64]) -> Result<Vec<i64>> {
    if ids.is_empty() {
        return Err(AppError::Validation("ids must not be empty".to_string()));
    }
    if let Some(bad) = ids.iter().find(|id| **id <= 0) {
        return Err(AppError::Validation(format!(
            "ids must be positive integers, got {bad}"
        )));
    }
    Ok(ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect())
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn EntityStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create_post(&self, author_id: i64, request: CreatePostRequest) -> Result<Post> {
        let request = CreatePostRequest {
            query: request.query.trim().to_string(),
            topic: request.topic.trim().to_string(),
        };
        request.validate()?;

        if self.store.find_developer_by_id(author_id).await?.is_none() {
            return Err(AppError::DeveloperNotFound("Developer not found".to_string()));
        }

        let post = self
            .store
            .insert_post(NewPost {
                author_id,
                query: request.query,
                topic: request.topic,
            })
            .await?;

        info!(post_id = post.id, developer_id = author_id, "Post created");
        Ok(post)
    }

    pub async fn get_post(&self, id: i64) -> Result<Post> {
        self.store
            .find_post_by_id(id)
            .await?
            .ok_or_else(|| post_not_found(id))
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.store.list_posts().await
    }

    pub async fn posts_by_developer(&self, developer_id: i64) -> Result<Vec<Post>> {
        if self.store.find_developer_by_id(developer_id).await?.is_none() {
            return Err(AppError::DeveloperNotFound("Developer not found".to_string()));
        }
        self.store.list_posts_by_author(developer_id).await
    }

    /// Case-insensitive keyword match on query or topic
    pub async fn search_posts(&self, keyword: &str) -> Result<Vec<Post>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::Validation("keyword must not be blank".to_string()));
        }
        self.store.search_posts(keyword).await
    }

    /// Owner-only update; omitted fields keep their previous values
    pub async fn update_post(
        &self,
        id: i64,
        requester_id: i64,
        request: UpdatePostRequest,
    ) -> Result<Post> {
        let request = UpdatePostRequest {
            query: normalize_optional(request.query),
            topic: normalize_optional(request.topic),
        };
        request.validate()?;

        let mut post = self.get_post(id).await?;
        authorize_owner(&post, requester_id)?;

        if let Some(query) = request.query {
            post.query = query;
        }
        if let Some(topic) = request.topic {
            post.topic = topic;
        }

        let updated = self.store.update_post(&post).await?;
        info!(post_id = id, developer_id = requester_id, "Post updated");
        Ok(updated)
    }

    /// Owner-only delete; responses, comments and votes go with it
    pub async fn delete_post(&self, id: i64, requester_id: i64) -> Result<()> {
        let post = self.get_post(id).await?;
        authorize_owner(&post, requester_id)?;

        self.store.delete_posts(&[id]).await?;
        info!(post_id = id, developer_id = requester_id, "Post deleted");
        Ok(())
    }

    /// Delete several posts; nothing is deleted unless the requester owns all of them
    pub async fn delete_posts(&self, ids: &[i64], requester_id: i64) -> Result<u64> {
        let ids = batch_ids(ids)?;

        for id in &ids {
            let post = self.get_post(*id).await?;
            authorize_owner(&post, requester_id)?;
        }

        let deleted = self.store.delete_posts(&ids).await?;
        info!(count = deleted, developer_id = requester_id, "Posts deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_ids_are_deduplicated_and_sorted() {
        assert_eq!(batch_ids(&[3, 1, 3, 2]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn batch_ids_reject_empty_and_negative() {
        assert!(batch_ids(&[]).is_err());
        assert!(batch_ids(&[1, -2]).is_err());
        assert!(batch_ids(&[0]).is_err());
    }
}
