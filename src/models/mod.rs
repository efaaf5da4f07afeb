//! Data models
//!
//! Database entities (User, Blog, Category, Tag, Comment, Contact), the
//! inputs repositories accept, and the read models handlers serialize.

mod blog;
mod category;
mod comment;
mod contact;
mod dashboard;
mod tag;
mod user;

pub use blog::{Blog, BlogChanges, BlogDetail, BlogFilter, BlogStatus, BlogSummary, NewBlog};
pub use category::{Category, CategoryChanges};
pub use comment::{
    Comment, CommentFilter, CommentStatus, NewComment, PublicComment, RecentComment,
};
pub use contact::{Contact, ContactStatus, NewContact};
pub use dashboard::{BlogCounts, CommentCounts, ContactCounts, DashboardStats};
pub use tag::{Tag, TagRef};
pub use user::{User, UserProfile, UserRole};
