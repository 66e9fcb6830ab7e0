/// Developer handlers - profiles and reputation
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::DeveloperId;
use crate::models::ProfileRequest;
use crate::services::DeveloperService;

pub async fn list_developers(service: web::Data<DeveloperService>) -> Result<HttpResponse> {
    let profiles = service.list_profiles().await?;
    Ok(HttpResponse::Ok().json(profiles))
}

pub async fn get_developer(
    service: web::Data<DeveloperService>,
    developer_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let profile = service.get_profile(developer_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn get_my_profile(
    service: web::Data<DeveloperService>,
    developer: DeveloperId,
) -> Result<HttpResponse> {
    let profile = service.get_profile(developer.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Create the profile of the authenticated developer
pub async fn create_profile(
    service: web::Data<DeveloperService>,
    developer: DeveloperId,
    req: web::Json<ProfileRequest>,
) -> Result<HttpResponse> {
    let profile = service.create_profile(developer.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

pub async fn update_my_profile(
    service: web::Data<DeveloperService>,
    developer: DeveloperId,
    req: web::Json<ProfileRequest>,
) -> Result<HttpResponse> {
    let profile = service.update_profile(developer.0, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn delete_my_profile(
    service: web::Data<DeveloperService>,
    developer: DeveloperId,
) -> Result<HttpResponse> {
    service.delete_developer(developer.0, developer.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_top_developer(service: web::Data<DeveloperService>) -> Result<HttpResponse> {
    let profile = service.top_by_reputation().await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn search_by_skill(
    service: web::Data<DeveloperService>,
    skill: web::Path<String>,
) -> Result<HttpResponse> {
    let profiles = service.search_by_skill(&skill).await?;
    Ok(HttpResponse::Ok().json(profiles))
}
