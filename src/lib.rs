//! Registry of people and their parent relationships.
//!
//! The [`service::RelationshipService`] owns every mutation of parent links
//! and enforces that nobody has more than [`models::MAX_PARENTS`] parents.
//! [`db::Database`] is its SQLite store and [`api`] serves it over HTTP.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod tree_render;
