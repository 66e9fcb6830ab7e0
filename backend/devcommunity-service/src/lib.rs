/// Devcommunity Service Library
///
/// Backend for a developer Q&A community: developers publish posts, answer
/// them with responses, comment on either, and vote on all three. Reputation
/// is derived from the votes on a developer's content.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Entities, vote targets, projections and request bodies
/// - `services`: Voting core, reputation and content services
/// - `db`: `EntityStore` trait with PostgreSQL and in-memory implementations
/// - `middleware`: JWT authentication, ownership checks and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
