//! Pure helpers shared by services and handlers

pub mod pagination;
pub mod slug;
pub mod validate;

pub use pagination::{ListParams, PagedResult, Pagination};
pub use slug::generate_slug;
pub use validate::{is_valid_email, non_blank};
