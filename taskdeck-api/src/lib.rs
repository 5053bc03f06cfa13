//! # Taskdeck API Server Library
//!
//! REST API for the Taskdeck project dashboard: accounts, projects, tasks,
//! the activity feed and dashboard aggregates.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating request extractors
//! - `fields`: Serde helpers for request bodies
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod middleware;
pub mod routes;
