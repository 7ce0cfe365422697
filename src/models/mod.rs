//! Domain models
//!
//! Entities shared by the client, services, and controllers:
//! - `NewsItem` and its pagination envelope
//! - category enumeration and filter sentinel
//! - `User` and role handling

pub mod noticia;
pub mod usuario;

pub use noticia::{
    category_color, Category, CategoryFilter, NewsDraft, NewsItem, PagedNews, Paginated,
    DEFAULT_PAGE_SIZE,
};
pub use usuario::{User, UserRole};
