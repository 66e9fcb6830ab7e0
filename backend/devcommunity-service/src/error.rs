/// Error types for devcommunity-service
///
/// Every domain failure is client-facing and maps to one HTTP status and a
/// JSON payload `{"error", "code", "status"}`. Infrastructure failures are
/// logged and reported with a generic message.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::models::TargetKind;

/// Result type for devcommunity-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Unique indexes that enforce one vote per developer per target
const VOTE_UNIQUE_INDEXES: [(&str, TargetKind); 3] = [
    ("uq_votes_developer_post", TargetKind::Post),
    ("uq_votes_developer_response", TargetKind::Response),
    ("uq_votes_developer_comment", TargetKind::Comment),
];

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map a failed reference (default `<table>_<column>_fkey` names) to the
/// not-found error for the row that vanished
fn missing_reference(constraint: &str) -> AppError {
    if constraint.ends_with("_developer_id_fkey") || constraint.ends_with("_author_id_fkey") {
        return AppError::DeveloperNotFound("Developer not found".to_string());
    }

    let kind = if constraint.ends_with("_post_id_fkey") {
        TargetKind::Post
    } else if constraint.ends_with("_response_id_fkey") {
        TargetKind::Response
    } else if constraint.ends_with("_comment_id_fkey") {
        TargetKind::Comment
    } else {
        return AppError::NotFound("Referenced resource not found".to_string());
    };
    AppError::NotFound(format!("{} not found", kind.title()))
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    DeveloperNotFound(String),

    #[error("{} not found with ID: {id}", .kind.title())]
    TargetNotFound { kind: TargetKind, id: i64 },

    #[error("{0}")]
    MissingTarget(String),

    #[error("{0}")]
    AmbiguousTarget(String),

    #[error("You have already voted on this {0}.")]
    DuplicateVote(TargetKind),

    /// Requester does not own the resource
    #[error("{0}")]
    Unauthorized(String),

    /// Missing or invalid bearer token
    #[error("{0}")]
    Unauthenticated(String),

    #[error("Vote not found with ID: {0}")]
    VoteNotFound(i64),

    #[error("Invalid vote type: {0}. Allowed values: UPVOTE, DOWNVOTE")]
    InvalidVoteType(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DeveloperNotFound(_) => "DEVELOPER_NOT_FOUND",
            AppError::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            AppError::MissingTarget(_) => "MISSING_TARGET",
            AppError::AmbiguousTarget(_) => "AMBIGUOUS_TARGET",
            AppError::DuplicateVote(_) => "DUPLICATE_VOTE",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::VoteNotFound(_) => "VOTE_NOT_FOUND",
            AppError::InvalidVoteType(_) => "INVALID_VOTE_TYPE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Short label used for rejection metrics
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::DeveloperNotFound(_) => "developer_not_found",
            AppError::TargetNotFound { .. } => "target_not_found",
            AppError::MissingTarget(_) => "missing_target",
            AppError::AmbiguousTarget(_) => "ambiguous_target",
            AppError::DuplicateVote(_) => "duplicate",
            AppError::Unauthorized(_) | AppError::Unauthenticated(_) => "unauthorized",
            AppError::VoteNotFound(_) => "vote_not_found",
            AppError::InvalidVoteType(_) => "invalid_vote_type",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) | AppError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingTarget(_)
            | AppError::AmbiguousTarget(_)
            | AppError::InvalidVoteType(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::DeveloperNotFound(_)
            | AppError::TargetNotFound { .. }
            | AppError::VoteNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateVote(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = match self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "code": self.code(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or_default();
                if let Some((_, kind)) = VOTE_UNIQUE_INDEXES
                    .iter()
                    .find(|(name, _)| *name == constraint)
                {
                    return AppError::DuplicateVote(*kind);
                }
                return AppError::Conflict(db_err.message().to_string());
            }
            if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                return missing_reference(db_err.constraint().unwrap_or_default());
            }
        }
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_vote_message_names_the_target_kind() {
        assert_eq!(
            AppError::DuplicateVote(TargetKind::Post).to_string(),
            "You have already voted on this post."
        );
        assert_eq!(
            AppError::DuplicateVote(TargetKind::Comment).to_string(),
            "You have already voted on this comment."
        );
    }

    #[test]
    fn target_not_found_message() {
        let err = AppError::TargetNotFound {
            kind: TargetKind::Post,
            id: 100,
        };
        assert_eq!(err.to_string(), "Post not found with ID: 100");
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::MissingTarget("m".into()), StatusCode::BAD_REQUEST),
            (AppError::AmbiguousTarget("a".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidVoteType("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthenticated("t".into()), StatusCode::UNAUTHORIZED),
            (AppError::Unauthorized("u".into()), StatusCode::FORBIDDEN),
            (AppError::VoteNotFound(1), StatusCode::NOT_FOUND),
            (AppError::DuplicateVote(TargetKind::Response), StatusCode::CONFLICT),
            (AppError::Database("d".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
        }
    }

    #[actix_rt::test]
    async fn internal_errors_are_not_leaked() {
        let resp = AppError::Database("password authentication failed".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["code"], "DATABASE_ERROR");
        assert!(!String::from_utf8_lossy(&body).contains("password"));
    }

    #[test]
    fn foreign_key_violations_map_to_not_found() {
        let err = missing_reference("votes_developer_id_fkey");
        assert!(matches!(err, AppError::DeveloperNotFound(_)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = missing_reference("comments_author_id_fkey");
        assert!(matches!(err, AppError::DeveloperNotFound(_)));

        let err = missing_reference("votes_post_id_fkey");
        assert_eq!(err.to_string(), "Post not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        assert_eq!(
            missing_reference("votes_comment_id_fkey").to_string(),
            "Comment not found"
        );
        assert_eq!(
            missing_reference("responses_post_id_fkey").code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn sqlx_row_not_found_maps_to_database_error() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
