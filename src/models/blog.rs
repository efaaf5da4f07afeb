//! Blog post model
//!
//! This module provides:
//! - `Blog`, the list/detail read model joined with category and author
//! - `BlogStatus` for publication states
//! - `NewBlog` and `BlogChanges`, the repository write inputs
//! - `BlogFilter` for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{PublicComment, TagRef};

/// Blog post as returned by list and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: String,
    pub title: String,
    /// URL-friendly slug derived from the title
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    /// Public path of the uploaded image, e.g. `/uploads/<file>`
    pub featured_image: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub status: BlogStatus,
    pub author_id: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

impl Blog {
    pub fn is_published(&self) -> bool {
        self.status == BlogStatus::Published
    }
}

/// A blog with its approved comments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDetail {
    #[serde(flatten)]
    pub blog: Blog,
    pub comments: Vec<PublicComment>,
}

/// Short form used by the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: BlogStatus,
    pub created_at: DateTime<Utc>,
}

/// Blog publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    /// Not visible on the public site
    #[default]
    Draft,
    /// Visible on the public site
    Published,
}

impl BlogStatus {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
        }
    }
}

impl fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlogStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(BlogStatus::Draft),
            "published" => Ok(BlogStatus::Published),
            _ => Err(anyhow::anyhow!("Invalid blog status: {}", s)),
        }
    }
}

/// Row to insert for a new blog, with its tag associations
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub category_id: Option<String>,
    pub status: BlogStatus,
    pub author_id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub tag_ids: Vec<String>,
}

/// Partial update of a blog. `None` leaves a column untouched; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub featured_image: Option<Option<String>>,
    pub category_id: Option<Option<String>>,
    pub status: Option<BlogStatus>,
    pub published_at: Option<DateTime<Utc>>,
    /// Replacement tag set; `None` keeps the current associations
    pub tag_ids: Option<Vec<String>>,
}

impl BlogChanges {
    /// Whether any column or the tag set changes
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.content.is_some()
            || self.excerpt.is_some()
            || self.featured_image.is_some()
            || self.category_id.is_some()
            || self.status.is_some()
            || self.published_at.is_some()
            || self.tag_ids.is_some()
    }
}

/// Filters accepted by the blog list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub status: Option<BlogStatus>,
    pub category_slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [BlogStatus::Draft, BlogStatus::Published] {
            assert_eq!(status.as_str().parse::<BlogStatus>().unwrap(), status);
        }
        assert!("archived".parse::<BlogStatus>().is_err());
        assert_eq!(BlogStatus::default(), BlogStatus::Draft);
    }

    #[test]
    fn test_changes_detection() {
        assert!(!BlogChanges::default().has_changes());

        let changes = BlogChanges {
            excerpt: Some(None),
            ..Default::default()
        };
        assert!(changes.has_changes());

        let changes = BlogChanges {
            tag_ids: Some(vec![]),
            ..Default::default()
        };
        assert!(changes.has_changes());
    }

    #[test]
    fn test_detail_flattens_blog_fields() {
        let now = Utc::now();
        let detail = BlogDetail {
            blog: Blog {
                id: "b1".into(),
                title: "Hello".into(),
                slug: "hello".into(),
                content: "body".into(),
                excerpt: None,
                featured_image: None,
                category_id: None,
                category_name: None,
                category_slug: None,
                status: BlogStatus::Published,
                author_id: "u1".into(),
                author_name: Some("Admin".into()),
                author_email: None,
                published_at: Some(now),
                created_at: now,
                updated_at: now,
                tags: vec![],
            },
            comments: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["slug"], "hello");
        assert_eq!(json["status"], "published");
        assert!(json["comments"].is_array());
        assert!(json.get("blog").is_none());
    }
}
