/// Data models for devcommunity-service
///
/// This module defines structures for:
/// - Developer: profile of an authenticated user
/// - Post / Response / Comment: the votable surfaces
/// - Vote: a single UPVOTE or DOWNVOTE on exactly one surface
/// - Request bodies and public projections used by the HTTP layer
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::AppError;

// =====================================================================
// Vote type and targets
// =====================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "UPVOTE",
            VoteType::Downvote => "DOWNVOTE",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = AppError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("UPVOTE") {
            Ok(VoteType::Upvote)
        } else if trimmed.eq_ignore_ascii_case("DOWNVOTE") {
            Ok(VoteType::Downvote)
        } else {
            Err(AppError::InvalidVoteType(s.to_string()))
        }
    }
}

/// Kind of surface a vote points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Post,
    Response,
    Comment,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Post => "post",
            TargetKind::Response => "response",
            TargetKind::Comment => "comment",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TargetKind::Post => "Post",
            TargetKind::Response => "Response",
            TargetKind::Comment => "Comment",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" | "posts" => Ok(TargetKind::Post),
            "response" | "responses" => Ok(TargetKind::Response),
            "comment" | "comments" => Ok(TargetKind::Comment),
            other => Err(AppError::Validation(format!(
                "Unknown target kind: {other}. Allowed values: post, response, comment"
            ))),
        }
    }
}

/// The single surface a vote applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    Post(i64),
    Response(i64),
    Comment(i64),
}

impl VoteTarget {
    pub fn new(kind: TargetKind, id: i64) -> Self {
        match kind {
            TargetKind::Post => VoteTarget::Post(id),
            TargetKind::Response => VoteTarget::Response(id),
            TargetKind::Comment => VoteTarget::Comment(id),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            VoteTarget::Post(_) => TargetKind::Post,
            VoteTarget::Response(_) => TargetKind::Response,
            VoteTarget::Comment(_) => TargetKind::Comment,
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            VoteTarget::Post(id) | VoteTarget::Response(id) | VoteTarget::Comment(id) => id,
        }
    }

    /// Split into the (post_id, response_id, comment_id) column layout
    pub fn columns(&self) -> (Option<i64>, Option<i64>, Option<i64>) {
        match *self {
            VoteTarget::Post(id) => (Some(id), None, None),
            VoteTarget::Response(id) => (None, Some(id), None),
            VoteTarget::Comment(id) => (None, None, Some(id)),
        }
    }

    /// Rebuild from the column layout; `None` unless exactly one column is set
    pub fn from_columns(
        post_id: Option<i64>,
        response_id: Option<i64>,
        comment_id: Option<i64>,
    ) -> Option<Self> {
        match (post_id, response_id, comment_id) {
            (Some(id), None, None) => Some(VoteTarget::Post(id)),
            (None, Some(id), None) => Some(VoteTarget::Response(id)),
            (None, None, Some(id)) => Some(VoteTarget::Comment(id)),
            _ => None,
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Parent of a comment: a post or a response, never both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentParent {
    Post(i64),
    Response(i64),
}

impl CommentParent {
    pub fn columns(&self) -> (Option<i64>, Option<i64>) {
        match *self {
            CommentParent::Post(id) => (Some(id), None),
            CommentParent::Response(id) => (None, Some(id)),
        }
    }

    pub fn from_columns(post_id: Option<i64>, response_id: Option<i64>) -> Option<Self> {
        match (post_id, response_id) {
            (Some(id), None) => Some(CommentParent::Post(id)),
            (None, Some(id)) => Some(CommentParent::Response(id)),
            _ => None,
        }
    }
}

impl From<CommentParent> for VoteTarget {
    fn from(parent: CommentParent) -> Self {
        match parent {
            CommentParent::Post(id) => VoteTarget::Post(id),
            CommentParent::Response(id) => VoteTarget::Response(id),
        }
    }
}

// =====================================================================
// Entities
// =====================================================================

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Developer {
    pub id: i64,
    pub name: Option<String>,
    pub skill: Option<String>,
    pub member_since: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub query: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: i64,
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub post_id: i64,
    pub author_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub parent: CommentParent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: i64,
    pub vote_type: VoteType,
    pub developer_id: i64,
    pub target: VoteTarget,
}

// Insert payloads; ids and timestamps are assigned by the store.

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub query: String,
    pub topic: String,
}

#[derive(Debug, Clone)]
pub struct NewResponse {
    pub author_id: i64,
    pub post_id: i64,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: i64,
    pub parent: CommentParent,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NewVote {
    pub developer_id: i64,
    pub vote_type: VoteType,
    pub target: VoteTarget,
}

/// Ids of everything a developer authored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoredSurfaces {
    pub post_ids: Vec<i64>,
    pub response_ids: Vec<i64>,
    pub comment_ids: Vec<i64>,
}

// =====================================================================
// Projections
// =====================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperProfile {
    pub id: i64,
    pub name: Option<String>,
    pub skill: Option<String>,
    pub member_since: NaiveDate,
    pub reputation: i64,
    pub total_posts: usize,
    pub total_comments: usize,
    pub total_responses: usize,
    pub total_votes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub vote_id: i64,
    pub vote_type: VoteType,
    pub developer_id: i64,
    pub developer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<i64>,
}

impl VoteResult {
    pub fn from_vote(vote: &Vote, developer_name: Option<String>) -> Self {
        let (post_id, response_id, comment_id) = vote.target.columns();
        Self {
            vote_id: vote.id,
            vote_type: vote.vote_type,
            developer_id: vote.developer_id,
            developer_name,
            post_id,
            response_id,
            comment_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<i64>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        let (post_id, response_id) = comment.parent.columns();
        Self {
            id: comment.id,
            text: comment.text,
            created_at: comment.created_at,
            author_id: comment.author_id,
            post_id,
            response_id,
        }
    }
}

// =====================================================================
// Request bodies
// =====================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVoteRequest {
    pub vote_type: String,
    /// Optional; must match the authenticated developer when present
    #[serde(default)]
    pub developer_id: Option<i64>,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default, alias = "respId")]
    pub response_id: Option<i64>,
    #[serde(default)]
    pub comment_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub skill: Option<String>,
}

impl ProfileRequest {
    /// Trim fields; blank values are treated as absent
    pub fn normalized(self) -> Self {
        Self {
            name: normalize_optional(self.name),
            skill: normalize_optional(self.skill),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 10000))]
    pub query: String,
    #[validate(length(min = 1, max = 255))]
    pub topic: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 10000))]
    pub query: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponseRequest {
    pub post_id: i64,
    #[validate(length(min = 1, max = 10000))]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponseRequest {
    #[validate(length(min = 1, max = 10000))]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default, alias = "respId")]
    pub response_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteRequest {
    pub ids: Vec<i64>,
}

pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_type_parses_case_insensitively() {
        assert_eq!("upvote".parse::<VoteType>().unwrap(), VoteType::Upvote);
        assert_eq!("  DownVote ".parse::<VoteType>().unwrap(), VoteType::Downvote);
    }

    #[test]
    fn vote_type_rejects_unknown_value() {
        let err = "BOGUS".parse::<VoteType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid vote type: BOGUS. Allowed values: UPVOTE, DOWNVOTE"
        );
    }

    #[test]
    fn vote_type_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&VoteType::Downvote).unwrap(),
            "\"DOWNVOTE\""
        );
    }

    #[test]
    fn target_columns_hold_exactly_one_id() {
        for target in [
            VoteTarget::Post(1),
            VoteTarget::Response(2),
            VoteTarget::Comment(3),
        ] {
            let (p, r, c) = target.columns();
            let set = [p, r, c].iter().filter(|v| v.is_some()).count();
            assert_eq!(set, 1);
            assert_eq!(VoteTarget::from_columns(p, r, c), Some(target));
        }
    }

    #[test]
    fn target_from_columns_rejects_zero_or_many() {
        assert_eq!(VoteTarget::from_columns(None, None, None), None);
        assert_eq!(VoteTarget::from_columns(Some(1), Some(2), None), None);
        assert_eq!(CommentParent::from_columns(Some(1), Some(1)), None);
        assert_eq!(CommentParent::from_columns(None, None), None);
    }

    #[test]
    fn target_kind_accepts_plural_path_segment() {
        assert_eq!("Posts".parse::<TargetKind>().unwrap(), TargetKind::Post);
        assert!("answers".parse::<TargetKind>().is_err());
    }

    #[test]
    fn vote_result_omits_unset_target_columns() {
        let vote = Vote {
            id: 9,
            vote_type: VoteType::Upvote,
            developer_id: 2,
            target: VoteTarget::Comment(7),
        };
        let json = serde_json::to_value(VoteResult::from_vote(&vote, Some("bob".into()))).unwrap();
        assert_eq!(json["voteId"], 9);
        assert_eq!(json["voteType"], "UPVOTE");
        assert_eq!(json["commentId"], 7);
        assert!(json.get("postId").is_none());
    }

    #[test]
    fn profile_request_normalizes_blank_fields() {
        let req = ProfileRequest {
            name: Some("  Ada ".into()),
            skill: Some("   ".into()),
        }
        .normalized();
        assert_eq!(req.name.as_deref(), Some("Ada"));
        assert_eq!(req.skill, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_post_request_requires_text() {
        let req = CreatePostRequest {
            query: String::new(),
            topic: "rust".into(),
        };
        assert!(req.validate().is_err());
    }
}
