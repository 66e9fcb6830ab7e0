/// Business logic layer for devcommunity-service
///
/// This module provides high-level operations:
/// - Vote service: casting, deleting and querying votes
/// - Reputation: derived reputation over a vote snapshot
/// - Developer, post, response and comment services
///
/// Every service holds the injected `EntityStore`; handlers receive them via `web::Data`.
pub mod comments;
pub mod developers;
pub mod posts;
pub mod reputation;
pub mod responses;
pub mod target_resolver;
pub mod votes;

use std::sync::Arc;

use actix_web::web;

use crate::db::EntityStore;

// Re-export commonly used services
pub use comments::CommentService;
pub use developers::DeveloperService;
pub use posts::PostService;
pub use reputation::{ReputationAggregator, ReputationPolicy};
pub use responses::ResponseService;
pub use target_resolver::TargetResolver;
pub use votes::VoteService;

/// Shared service handles registered as application data
#[derive(Clone)]
pub struct Services {
    pub votes: web::Data<VoteService>,
    pub developers: web::Data<DeveloperService>,
    pub posts: web::Data<PostService>,
    pub responses: web::Data<ResponseService>,
    pub comments: web::Data<CommentService>,
}

impl Services {
    pub fn new(store: Arc<dyn EntityStore>, policy: ReputationPolicy) -> Self {
        let aggregator = ReputationAggregator::new(store.clone(), policy);

        Self {
            votes: web::Data::new(VoteService::new(store.clone())),
            developers: web::Data::new(DeveloperService::new(store.clone(), aggregator)),
            posts: web::Data::new(PostService::new(store.clone())),
            responses: web::Data::new(ResponseService::new(store.clone())),
            comments: web::Data::new(CommentService::new(store)),
        }
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.votes.clone())
            .app_data(self.developers.clone())
            .app_data(self.posts.clone())
            .app_data(self.responses.clone())
            .app_data(self.comments.clone());
    }
}
