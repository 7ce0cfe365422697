//! Vocero - community news client core
//!
//! This library provides the client-side core of the Vocero community news
//! site (news repository, session store, screen controllers) together with
//! the static host that serves the built front end.

pub mod client;
pub mod config;
pub mod controllers;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;
