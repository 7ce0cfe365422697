//! Screen controllers
//!
//! View-state holders for each screen, free of any rendering concern:
//! - `ListingController`: public news listing with pagination and search
//! - `AdminController`: news management, gated to administrators
//! - `AuthFlowController`: combined login/registration flow

pub mod admin;
pub mod auth;
pub mod debounce;
pub mod listing;

pub use admin::{AdminAccessDenied, AdminController, NewsForm, StatusMessage};
pub use auth::{AuthFlowController, AuthMode, Destination};
pub use debounce::Debouncer;
pub use listing::{page_window, ListingController, LoadState, PageEntry};
