//! Core library for taskdesk, a client for a task tracker REST API.
//!
//! - `storage`: durable key-value backends (file, keychain, memory)
//! - `auth`: the `SessionStore` holding credentials and the signed-in identity
//! - `api`: the authorized request pipeline and the typed `ApiClient`
//! - `navigation`: the login redirect seam and landing routes
//! - `models`: tasks, users and client-side filters
//! - `prefs`: display theme preference
//! - `config`: on-disk configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;
pub mod prefs;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, AuthPipeline};
pub use auth::{Identity, Session, SessionStore};
pub use config::Config;
pub use navigation::{landing_route, Navigator, Route};
