/// Response handlers - answers attached to posts
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::DeveloperId;
use crate::models::{BatchDeleteRequest, CreateResponseRequest, UpdateResponseRequest};
use crate::services::ResponseService;

pub async fn create_response(
    service: web::Data<ResponseService>,
    developer: DeveloperId,
    req: web::Json<CreateResponseRequest>,
) -> Result<HttpResponse> {
    let response = service.create_response(developer.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

pub async fn get_response(
    service: web::Data<ResponseService>,
    response_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let response = service.get_response(response_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_responses_by_post(
    service: web::Data<ResponseService>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let responses = service.responses_by_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn get_responses_by_developer(
    service: web::Data<ResponseService>,
    developer_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let responses = service
        .responses_by_developer(developer_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn update_response(
    service: web::Data<ResponseService>,
    developer: DeveloperId,
    response_id: web::Path<i64>,
    req: web::Json<UpdateResponseRequest>,
) -> Result<HttpResponse> {
    let response = service
        .update_response(response_id.into_inner(), developer.0, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn delete_response(
    service: web::Data<ResponseService>,
    developer: DeveloperId,
    response_id: web::Path<i64>,
) -> Result<HttpResponse> {
    service
        .delete_response(response_id.into_inner(), developer.0)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_responses(
    service: web::Data<ResponseService>,
    developer: DeveloperId,
    req: web::Json<BatchDeleteRequest>,
) -> Result<HttpResponse> {
    let deleted = service.delete_responses(&req.ids, developer.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })))
}
