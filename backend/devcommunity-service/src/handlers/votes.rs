/// Vote handlers - HTTP endpoints for casting and querying votes
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::DeveloperId;
use crate::models::{AddVoteRequest, TargetKind};
use crate::services::VoteService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCountQuery {
    pub vote_type: String,
}

/// Cast a vote as the authenticated developer
pub async fn add_vote(
    service: web::Data<VoteService>,
    developer: DeveloperId,
    req: web::Json<AddVoteRequest>,
) -> Result<HttpResponse> {
    let result = service.add_vote(developer.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(result))
}

pub async fn delete_vote(
    service: web::Data<VoteService>,
    developer: DeveloperId,
    vote_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service.delete_vote(vote_id.into_inner(), developer.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_vote(
    service: web::Data<VoteService>,
    vote_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let vote_id = vote_id.into_inner();
    match service.get_vote(vote_id).await? {
        Some(vote) => Ok(HttpResponse::Ok().json(vote)),
        None => Err(AppError::VoteNotFound(vote_id)),
    }
}

/// `GET /votes/target/{kind}/{id}`, kind is post, response or comment
pub async fn get_votes_by_target(
    service: web::Data<VoteService>,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (kind, target_id) = path.into_inner();
    let kind: TargetKind = kind.parse()?;

    let votes = service.votes_by_target(kind, target_id).await?;
    Ok(HttpResponse::Ok().json(votes))
}

pub async fn count_votes_on_comment(
    service: web::Data<VoteService>,
    comment_id: web::Path<i64>,
    query: web::Query<VoteCountQuery>,
) -> Result<HttpResponse> {
    let count = service
        .count_by_type_and_comment(&query.vote_type, comment_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(count))
}
