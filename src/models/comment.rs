//! Comment model
//!
//! Comments are submitted anonymously against published blogs and wait in
//! `pending` until moderated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comment as listed in the moderation queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub blog_id: String,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    /// Title of the parent blog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_title: Option<String>,
    /// Slug of the parent blog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_slug: Option<String>,
}

/// Approved comment as shown under a blog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicComment {
    pub id: String,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Dashboard row for the latest comments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentComment {
    pub id: String,
    pub author_name: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub blog_title: Option<String>,
}

/// Comment moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    /// Awaiting moderation
    #[default]
    Pending,
    /// Visible under the blog
    Approved,
    /// Hidden
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid comment status: {}", s)),
        }
    }
}

/// Row to insert for a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub blog_id: String,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
}

/// Filters for the moderation list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub status: Option<CommentStatus>,
    pub blog_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_exact() {
        assert_eq!("approved".parse::<CommentStatus>().unwrap(), CommentStatus::Approved);
        assert!("Approved ".parse::<CommentStatus>().is_err());
        assert!("spam".parse::<CommentStatus>().is_err());
        assert_eq!(CommentStatus::default(), CommentStatus::Pending);
    }

    #[test]
    fn test_blog_fields_skipped_when_absent() {
        let comment = Comment {
            id: "c1".into(),
            blog_id: "b1".into(),
            author_name: "Ann".into(),
            author_email: "ann@example.com".into(),
            content: "Nice".into(),
            status: CommentStatus::Pending,
            created_at: Utc::now(),
            blog_title: None,
            blog_slug: None,
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert!(json.get("blog_title").is_none());
        assert_eq!(json["status"], "pending");
    }
}
