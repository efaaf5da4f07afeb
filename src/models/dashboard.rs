//! Dashboard statistics read model

use serde::{Deserialize, Serialize};

use super::{BlogSummary, RecentComment};

/// Aggregate returned by `GET /dashboard/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub blogs: BlogCounts,
    pub comments: CommentCounts,
    pub contacts: ContactCounts,
    pub categories: i64,
    pub tags: i64,
    #[serde(rename = "recentBlogs")]
    pub recent_blogs: Vec<BlogSummary>,
    #[serde(rename = "recentComments")]
    pub recent_comments: Vec<RecentComment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogCounts {
    pub total: i64,
    pub published: i64,
    pub drafts: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCounts {
    pub total: i64,
    pub new_messages: i64,
}
