/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::DeveloperId;
use crate::models::{BatchDeleteRequest, CreatePostRequest, UpdatePostRequest};
use crate::services::PostService;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

/// Create a new post
pub async fn create_post(
    service: web::Data<PostService>,
    developer: DeveloperId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = service.create_post(developer.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = service.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn list_posts(service: web::Data<PostService>) -> Result<HttpResponse> {
    let posts = service.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Get posts for a developer
pub async fn get_posts_by_developer(
    service: web::Data<PostService>,
    developer_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let posts = service.posts_by_developer(developer_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn search_posts(
    service: web::Data<PostService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let posts = service.search_posts(&query.keyword).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn update_post(
    service: web::Data<PostService>,
    developer: DeveloperId,
    post_id: web::Path<i64>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = service
        .update_post(post_id.into_inner(), developer.0, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post along with its responses, comments and votes
pub async fn delete_post(
    service: web::Data<PostService>,
    developer: DeveloperId,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service.delete_post(post_id.into_inner(), developer.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_posts(
    service: web::Data<PostService>,
    developer: DeveloperId,
    req: web::Json<BatchDeleteRequest>,
) -> Result<HttpResponse> {
    let deleted = service.delete_posts(&req.ids, developer.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })))
}
