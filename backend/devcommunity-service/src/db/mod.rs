/// Database access layer
///
/// `EntityStore` is the persistence seam used by every service. Two
/// implementations exist:
/// - `PgEntityStore`: PostgreSQL via sqlx, cascades through `ON DELETE CASCADE`
/// - `InMemoryEntityStore`: `RwLock`-guarded maps for local runs and tests
pub mod memory;
pub mod postgres;

pub use memory::InMemoryEntityStore;
pub use postgres::PgEntityStore;

use crate::error::Result;
use crate::models::{
    AuthoredSurfaces, Comment, Developer, NewComment, NewPost, NewResponse, NewVote, Post,
    Response, Vote, VoteTarget, VoteType,
};

#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> Result<()>;

    // ---- developers ----

    async fn find_developer_by_id(&self, id: i64) -> Result<Option<Developer>>;

    /// All developers ordered by id
    async fn list_developers(&self) -> Result<Vec<Developer>>;

    /// Case-insensitive substring match on skill
    async fn search_developers_by_skill(&self, skill: &str) -> Result<Vec<Developer>>;

    /// Insert with a caller-chosen id; fails with `Conflict` if the id is taken
    async fn insert_developer(&self, developer: &Developer) -> Result<Developer>;

    async fn update_developer(&self, developer: &Developer) -> Result<Developer>;

    /// Delete a developer with everything they authored or cast
    async fn delete_developer(&self, id: i64) -> Result<bool>;

    /// Ids of the posts, responses and comments authored by a developer
    async fn authored_surfaces(&self, developer_id: i64) -> Result<AuthoredSurfaces>;

    // ---- posts ----

    async fn insert_post(&self, post: NewPost) -> Result<Post>;

    async fn find_post_by_id(&self, id: i64) -> Result<Option<Post>>;

    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>>;

    /// Case-insensitive match on query or topic
    async fn search_posts(&self, keyword: &str) -> Result<Vec<Post>>;

    async fn update_post(&self, post: &Post) -> Result<Post>;

    /// Delete posts and their dependents atomically; returns rows removed
    async fn delete_posts(&self, ids: &[i64]) -> Result<u64>;

    // ---- responses ----

    async fn insert_response(&self, response: NewResponse) -> Result<Response>;

    async fn find_response_by_id(&self, id: i64) -> Result<Option<Response>>;

    async fn list_responses_by_post(&self, post_id: i64) -> Result<Vec<Response>>;

    async fn list_responses_by_author(&self, author_id: i64) -> Result<Vec<Response>>;

    async fn update_response(&self, response: &Response) -> Result<Response>;

    async fn delete_responses(&self, ids: &[i64]) -> Result<u64>;

    // ---- comments ----

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment>;

    async fn find_comment_by_id(&self, id: i64) -> Result<Option<Comment>>;

    async fn list_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn list_comments_by_response(&self, response_id: i64) -> Result<Vec<Comment>>;

    async fn update_comment(&self, comment: &Comment) -> Result<Comment>;

    async fn delete_comment(&self, id: i64) -> Result<bool>;

    // ---- votes ----

    async fn find_vote_by_id(&self, id: i64) -> Result<Option<Vote>>;

    async fn find_vote_by_developer_and_target(
        &self,
        developer_id: i64,
        target: VoteTarget,
    ) -> Result<Option<Vote>>;

    /// Persist a vote; a second vote for the same (developer, target) fails
    /// with `DuplicateVote`
    async fn save_vote(&self, vote: NewVote) -> Result<Vote>;

    async fn delete_vote_by_id(&self, id: i64) -> Result<bool>;

    async fn list_votes_by_target(&self, target: VoteTarget) -> Result<Vec<Vote>>;

    async fn count_votes_by_type_and_comment(
        &self,
        vote_type: VoteType,
        comment_id: i64,
    ) -> Result<i64>;

    /// Every vote in the store, used for reputation snapshots
    async fn list_all_votes(&self) -> Result<Vec<Vote>>;

    /// Whether the referenced surface exists
    async fn target_exists(&self, target: VoteTarget) -> Result<bool> {
        Ok(match target {
            VoteTarget::Post(id) => self.find_post_by_id(id).await?.is_some(),
            VoteTarget::Response(id) => self.find_response_by_id(id).await?.is_some(),
            VoteTarget::Comment(id) => self.find_comment_by_id(id).await?.is_some(),
        })
    }
}
