/// HTTP handlers for devcommunity endpoints
///
/// This module contains handlers for:
/// - Votes: cast, delete, look up and count votes
/// - Developers: profiles with derived reputation
/// - Posts, responses and comments: authored content
/// - Health: unauthenticated probes
///
/// `configure_routes` is mounted inside the authenticated `/api/v1` scope;
/// `health::configure_health` is mounted at the application root.
pub mod comments;
pub mod developers;
pub mod health;
pub mod posts;
pub mod responses;
pub mod votes;

use actix_web::{error, web};

use crate::error::AppError;

/// Register every authenticated route. Literal segments are registered before
/// `{id}` captures so they are matched first.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(
            web::scope("/votes")
                .service(web::resource("").route(web::post().to(votes::add_vote)))
                .route(
                    "/target/{kind}/{target_id}",
                    web::get().to(votes::get_votes_by_target),
                )
                .service(
                    web::resource("/{vote_id}")
                        .route(web::get().to(votes::get_vote))
                        .route(web::delete().to(votes::delete_vote)),
                ),
        )
        .service(
            web::scope("/developers")
                .service(
                    web::resource("")
                        .route(web::get().to(developers::list_developers))
                        .route(web::post().to(developers::create_profile)),
                )
                .service(
                    web::resource("/me")
                        .route(web::get().to(developers::get_my_profile))
                        .route(web::put().to(developers::update_my_profile))
                        .route(web::delete().to(developers::delete_my_profile)),
                )
                .route(
                    "/reputation/max",
                    web::get().to(developers::get_top_developer),
                )
                .route("/skill/{skill}", web::get().to(developers::search_by_skill))
                .route("/{developer_id}", web::get().to(developers::get_developer)),
        )
        .service(
            web::scope("/posts")
                .service(
                    web::resource("")
                        .route(web::get().to(posts::list_posts))
                        .route(web::post().to(posts::create_post)),
                )
                .route("/search", web::get().to(posts::search_posts))
                .route("/batch-delete", web::post().to(posts::delete_posts))
                .route(
                    "/developer/{developer_id}",
                    web::get().to(posts::get_posts_by_developer),
                )
                .service(
                    web::resource("/{post_id}")
                        .route(web::get().to(posts::get_post))
                        .route(web::put().to(posts::update_post))
                        .route(web::delete().to(posts::delete_post)),
                ),
        )
        .service(
            web::scope("/responses")
                .service(web::resource("").route(web::post().to(responses::create_response)))
                .route(
                    "/batch-delete",
                    web::post().to(responses::delete_responses),
                )
                .route(
                    "/post/{post_id}",
                    web::get().to(responses::get_responses_by_post),
                )
                .route(
                    "/developer/{developer_id}",
                    web::get().to(responses::get_responses_by_developer),
                )
                .service(
                    web::resource("/{response_id}")
                        .route(web::get().to(responses::get_response))
                        .route(web::put().to(responses::update_response))
                        .route(web::delete().to(responses::delete_response)),
                ),
        )
        .service(
            web::scope("/comments")
                .service(web::resource("").route(web::post().to(comments::create_comment)))
                .route(
                    "/post/{post_id}",
                    web::get().to(comments::get_comments_by_post),
                )
                .route(
                    "/response/{response_id}",
                    web::get().to(comments::get_comments_by_response),
                )
                .route(
                    "/{comment_id}/votes/count",
                    web::get().to(votes::count_votes_on_comment),
                )
                .service(
                    web::resource("/{comment_id}")
                        .route(web::get().to(comments::get_comment))
                        .route(web::put().to(comments::update_comment))
                        .route(web::delete().to(comments::delete_comment)),
                ),
        );
}

/// Malformed JSON bodies are reported with the standard error payload
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            error::JsonPayloadError::Deserialize(inner) => inner.to_string(),
            other => other.to_string(),
        };
        AppError::Validation(format!("Invalid request body: {message}")).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid path parameter: {err}")).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid query parameter: {err}")).into()
    })
}
