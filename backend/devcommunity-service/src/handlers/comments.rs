/// Comment handlers - HTTP endpoints for comments on posts and responses
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::DeveloperId;
use crate::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::services::CommentService;

pub async fn create_comment(
    service: web::Data<CommentService>,
    developer: DeveloperId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = service.create_comment(developer.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn get_comment(
    service: web::Data<CommentService>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comment = service.get_comment(comment_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comment))
}

pub async fn get_comments_by_post(
    service: web::Data<CommentService>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comments = service.comments_by_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn get_comments_by_response(
    service: web::Data<CommentService>,
    response_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comments = service
        .comments_by_response(response_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn update_comment(
    service: web::Data<CommentService>,
    developer: DeveloperId,
    comment_id: web::Path<i64>,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = service
        .update_comment(comment_id.into_inner(), developer.0, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Returns the removed comment
pub async fn delete_comment(
    service: web::Data<CommentService>,
    developer: DeveloperId,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comment = service
        .delete_comment(comment_id.into_inner(), developer.0)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}
