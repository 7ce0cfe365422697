//! Service layer
//!
//! Stateful cores shared by the screen controllers:
//! - `SessionStore` owns the authenticated user and bearer token
//! - `NewsService` fetches, augments, and caches news listings

pub mod news;
pub mod session;

pub use news::{categories, promotional_item, NewsRepository, NewsService, PROMO_NEWS_ID};
pub use session::{AuthOutcome, SessionStore, SESSION_TOKEN_KEY, SESSION_USER_KEY};
