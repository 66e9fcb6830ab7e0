use sqlx::PgPool;

use super::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{
    AuthoredSurfaces, Comment, CommentParent, Developer, NewComment, NewPost, NewResponse,
    NewVote, Post, Response, Vote, VoteTarget, VoteType,
};

const DEVELOPER_COLUMNS: &str = "id, name, skill, member_since";
const POST_COLUMNS: &str = "id, query, topic, created_at, author_id";
const RESPONSE_COLUMNS: &str = "id, answer, created_at, post_id, author_id";
const COMMENT_COLUMNS: &str = "id, text, created_at, author_id, post_id, response_id";
const VOTE_COLUMNS: &str = "id, vote_type, developer_id, post_id, response_id, comment_id";

/// Row layout of `comments`; the parent is split over two nullable columns
#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    created_at: chrono::DateTime<chrono::Utc>,
    author_id: i64,
    post_id: Option<i64>,
    response_id: Option<i64>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = AppError;

    fn try_from(row: CommentRow) -> Result<Self> {
        let parent = CommentParent::from_columns(row.post_id, row.response_id).ok_or_else(|| {
            AppError::Internal(format!("comment {} has an invalid parent reference", row.id))
        })?;

        Ok(Comment {
            id: row.id,
            text: row.text,
            created_at: row.created_at,
            author_id: row.author_id,
            parent,
        })
    }
}

/// Row layout of `votes`; exactly one target column is non-null
#[derive(Debug, sqlx::FromRow)]
struct VoteRow {
    id: i64,
    vote_type: String,
    developer_id: i64,
    post_id: Option<i64>,
    response_id: Option<i64>,
    comment_id: Option<i64>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = AppError;

    fn try_from(row: VoteRow) -> Result<Self> {
        let target = VoteTarget::from_columns(row.post_id, row.response_id, row.comment_id)
            .ok_or_else(|| {
                AppError::Internal(format!("vote {} has an invalid target reference", row.id))
            })?;

        Ok(Vote {
            id: row.id,
            vote_type: row.vote_type.parse()?,
            developer_id: row.developer_id,
            target,
        })
    }
}

fn into_comments(rows: Vec<CommentRow>) -> Result<Vec<Comment>> {
    rows.into_iter().map(Comment::try_from).collect()
}

fn into_votes(rows: Vec<VoteRow>) -> Result<Vec<Vote>> {
    rows.into_iter().map(Vote::try_from).collect()
}

/// Column holding the id for a given vote target
fn target_column(target: &VoteTarget) -> &'static str {
    match target {
        VoteTarget::Post(_) => "post_id",
        VoteTarget::Response(_) => "response_id",
        VoteTarget::Comment(_) => "comment_id",
    }
}

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// PostgreSQL-backed `EntityStore`.
///
/// Cascading deletes are carried by the schema's foreign keys; every
/// delete runs inside a transaction.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn delete_by_ids(&self, table: &str, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = ANY($1)"))
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl EntityStore for PgEntityStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_developer_by_id(&self, id: i64) -> Result<Option<Developer>> {
        let developer = sqlx::query_as::<_, Developer>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(developer)
    }

    async fn list_developers(&self) -> Result<Vec<Developer>> {
        let developers = sqlx::query_as::<_, Developer>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(developers)
    }

    async fn search_developers_by_skill(&self, skill: &str) -> Result<Vec<Developer>> {
        let developers = sqlx::query_as::<_, Developer>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers WHERE skill ILIKE $1 ORDER BY id"
        ))
        .bind(like_pattern(skill))
        .fetch_all(&self.pool)
        .await?;

        Ok(developers)
    }

    async fn insert_developer(&self, developer: &Developer) -> Result<Developer> {
        let inserted = sqlx::query_as::<_, Developer>(&format!(
            r#"
            INSERT INTO developers (id, name, skill, member_since)
            VALUES ($1, $2, $3, $4)
            RETURNING {DEVELOPER_COLUMNS}
            "#
        ))
        .bind(developer.id)
        .bind(&developer.name)
        .bind(&developer.skill)
        .bind(developer.member_since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Developer profile already exists for ID: {}",
                developer.id
            )),
            other => other,
        })?;

        Ok(inserted)
    }

    async fn update_developer(&self, developer: &Developer) -> Result<Developer> {
        let updated = sqlx::query_as::<_, Developer>(&format!(
            r#"
            UPDATE developers
            SET name = $2, skill = $3
            WHERE id = $1
            RETURNING {DEVELOPER_COLUMNS}
            "#
        ))
        .bind(developer.id)
        .bind(&developer.name)
        .bind(&developer.skill)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::DeveloperNotFound("Developer not found".to_string()))
    }

    async fn delete_developer(&self, id: i64) -> Result<bool> {
        Ok(self.delete_by_ids("developers", &[id]).await? > 0)
    }

    async fn authored_surfaces(&self, developer_id: i64) -> Result<AuthoredSurfaces> {
        let post_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM posts WHERE author_id = $1 ORDER BY id")
                .bind(developer_id)
                .fetch_all(&self.pool)
                .await?;
        let response_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM responses WHERE author_id = $1 ORDER BY id")
                .bind(developer_id)
                .fetch_all(&self.pool)
                .await?;
        let comment_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM comments WHERE author_id = $1 ORDER BY id")
                .bind(developer_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(AuthoredSurfaces {
            post_ids,
            response_ids,
            comment_ids,
        })
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (query, topic, author_id)
            VALUES ($1, $2, $3)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&post.query)
        .bind(&post.topic)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post_by_id(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1 ORDER BY id"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn search_posts(&self, keyword: &str) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE query ILIKE $1 OR topic ILIKE $1
            ORDER BY id
            "#
        ))
        .bind(like_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn update_post(&self, post: &Post) -> Result<Post> {
        let updated = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET query = $2, topic = $3
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.id)
        .bind(&post.query)
        .bind(&post.topic)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Post not found with ID: {}", post.id)))
    }

    async fn delete_posts(&self, ids: &[i64]) -> Result<u64> {
        self.delete_by_ids("posts", ids).await
    }

    async fn insert_response(&self, response: NewResponse) -> Result<Response> {
        let response = sqlx::query_as::<_, Response>(&format!(
            r#"
            INSERT INTO responses (answer, post_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING {RESPONSE_COLUMNS}
            "#
        ))
        .bind(&response.answer)
        .bind(response.post_id)
        .bind(response.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(response)
    }

    async fn find_response_by_id(&self, id: i64) -> Result<Option<Response>> {
        let response = sqlx::query_as::<_, Response>(&format!(
            "SELECT {RESPONSE_COLUMNS} FROM responses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(response)
    }

    async fn list_responses_by_post(&self, post_id: i64) -> Result<Vec<Response>> {
        let responses = sqlx::query_as::<_, Response>(&format!(
            "SELECT {RESPONSE_COLUMNS} FROM responses WHERE post_id = $1 ORDER BY id"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(responses)
    }

    async fn list_responses_by_author(&self, author_id: i64) -> Result<Vec<Response>> {
        let responses = sqlx::query_as::<_, Response>(&format!(
            "SELECT {RESPONSE_COLUMNS} FROM responses WHERE author_id = $1 ORDER BY id"
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(responses)
    }

    async fn update_response(&self, response: &Response) -> Result<Response> {
        let updated = sqlx::query_as::<_, Response>(&format!(
            r#"
            UPDATE responses
            SET answer = $2
            WHERE id = $1
            RETURNING {RESPONSE_COLUMNS}
            "#
        ))
        .bind(response.id)
        .bind(&response.answer)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| {
            AppError::NotFound(format!("Response not found with ID: {}", response.id))
        })
    }

    async fn delete_responses(&self, ids: &[i64]) -> Result<u64> {
        self.delete_by_ids("responses", ids).await
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment> {
        let (post_id, response_id) = comment.parent.columns();
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO comments (text, author_id, post_id, response_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(&comment.text)
        .bind(comment.author_id)
        .bind(post_id)
        .bind(response_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_comment_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Comment::try_from).transpose()
    }

    async fn list_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY id"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        into_comments(rows)
    }

    async fn list_comments_by_response(&self, response_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE response_id = $1 ORDER BY id"
        ))
        .bind(response_id)
        .fetch_all(&self.pool)
        .await?;

        into_comments(rows)
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            UPDATE comments
            SET text = $2
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(comment.id)
        .bind(&comment.text)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::NotFound(format!(
                "Comment not found with ID: {}",
                comment.id
            ))),
        }
    }

    async fn delete_comment(&self, id: i64) -> Result<bool> {
        Ok(self.delete_by_ids("comments", &[id]).await? > 0)
    }

    async fn find_vote_by_id(&self, id: i64) -> Result<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn find_vote_by_developer_and_target(
        &self,
        developer_id: i64,
        target: VoteTarget,
    ) -> Result<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE developer_id = $1 AND {} = $2",
            target_column(&target)
        ))
        .bind(developer_id)
        .bind(target.id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn save_vote(&self, vote: NewVote) -> Result<Vote> {
        let (post_id, response_id, comment_id) = vote.target.columns();
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            r#"
            INSERT INTO votes (vote_type, developer_id, post_id, response_id, comment_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {VOTE_COLUMNS}
            "#
        ))
        .bind(vote.vote_type.as_str())
        .bind(vote.developer_id)
        .bind(post_id)
        .bind(response_id)
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_vote_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM votes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_votes_by_target(&self, target: VoteTarget) -> Result<Vec<Vote>> {
        let rows = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE {} = $1 ORDER BY id",
            target_column(&target)
        ))
        .bind(target.id())
        .fetch_all(&self.pool)
        .await?;

        into_votes(rows)
    }

    async fn count_votes_by_type_and_comment(
        &self,
        vote_type: VoteType,
        comment_id: i64,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM votes WHERE vote_type = $1 AND comment_id = $2",
        )
        .bind(vote_type.as_str())
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_all_votes(&self) -> Result<Vec<Vote>> {
        let rows = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_votes(rows)
    }
}
