/// Response service - answers to posts
use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::middleware::permissions::authorize_owner;
use crate::models::{CreateResponseRequest, NewResponse, Response, UpdateResponseRequest};
use crate::services::posts::{batch_ids, post_not_found};

fn response_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Response not found with ID: {id}"))
}

#[derive(Clone)]
pub struct ResponseService {
    store: Arc<dyn EntityStore>,
}

impl ResponseService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create_response(
        &self,
        author_id: i64,
        request: CreateResponseRequest,
    ) -> Result<Response> {
        let request = CreateResponseRequest {
            post_id: request.post_id,
            answer: request.answer.trim().to_string(),
        };
        request.validate()?;

        if self.store.find_developer_by_id(author_id).await?.is_none() {
            return Err(AppError::DeveloperNotFound("Developer not found".to_string()));
        }
        if self.store.find_post_by_id(request.post_id).await?.is_none() {
            return Err(post_not_found(request.post_id));
        }

        let response = self
            .store
            .insert_response(NewResponse {
                author_id,
                post_id: request.post_id,
                answer: request.answer,
            })
            .await?;

        info!(
            response_id = response.id,
            post_id = response.post_id,
            developer_id = author_id,
            "Response created"
        );
        Ok(response)
    }

    pub async fn get_response(&self, id: i64) -> Result<Response> {
        self.store
            .find_response_by_id(id)
            .await?
            .ok_or_else(|| response_not_found(id))
    }

    pub async fn responses_by_post(&self, post_id: i64) -> Result<Vec<Response>> {
        if self.store.find_post_by_id(post_id).await?.is_none() {
            return Err(post_not_found(post_id));
        }
        self.store.list_responses_by_post(post_id).await
    }

    pub async fn responses_by_developer(&self, developer_id: i64) -> Result<Vec<Response>> {
        if self.store.find_developer_by_id(developer_id).await?.is_none() {
            return Err(AppError::DeveloperNotFound("Developer not found".to_string()));
        }
        self.store.list_responses_by_author(developer_id).await
    }

    pub async fn update_response(
        &self,
        id: i64,
        requester_id: i64,
        request: UpdateResponseRequest,
    ) -> Result<Response> {
        let request = UpdateResponseRequest {
            answer: request.answer.trim().to_string(),
        };
        request.validate()?;

        let mut response = self.get_response(id).await?;
        authorize_owner(&response, requester_id)?;

        response.answer = request.answer;
        let updated = self.store.update_response(&response).await?;
        info!(response_id = id, developer_id = requester_id, "Response updated");
        Ok(updated)
    }

    pub async fn delete_response(&self, id: i64, requester_id: i64) -> Result<()> {
        let response = self.get_response(id).await?;
        authorize_owner(&response, requester_id)?;

        self.store.delete_responses(&[id]).await?;
        info!(response_id = id, developer_id = requester_id, "Response deleted");
        Ok(())
    }

    /// All-or-nothing batch delete of the requester's responses
    pub async fn delete_responses(&self, ids: &[i64], requester_id: i64) -> Result<u64> {
        let ids = batch_ids(ids)?;

        for id in &ids {
            let response = self.get_response(*id).await?;
            authorize_owner(&response, requester_id)?;
        }

        let deleted = self.store.delete_responses(&ids).await?;
        info!(count = deleted, developer_id = requester_id, "Responses deleted");
        Ok(deleted)
    }
}
