//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They are
//! responsible for:
//! - Validating input and mapping it onto repository calls
//! - Enforcing business rules (slugs, publication timestamps, moderation)
//! - Translating storage failures into per-resource error enums

pub mod blog;
pub mod category;
pub mod comment;
pub mod contact;
pub mod dashboard;
pub mod password;
pub mod tag;
pub mod token;
pub mod upload;
pub mod user;

pub use blog::{BlogForm, BlogListQuery, BlogService, BlogServiceError};
pub use category::{CategoryInput, CategoryService, CategoryServiceError};
pub use comment::{CommentInput, CommentListQuery, CommentService, CommentServiceError};
pub use contact::{ContactInput, ContactService, ContactServiceError};
pub use dashboard::DashboardService;
pub use password::{hash_password, verify_password};
pub use tag::{TagInput, TagService, TagServiceError};
pub use token::{Claims, TokenService};
pub use upload::{ImageStore, ImageUpload, UploadError};
pub use user::{LoginInput, LoginResult, NewUserInput, UserService, UserServiceError};
