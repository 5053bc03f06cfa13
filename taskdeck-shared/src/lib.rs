//! # Taskdeck Shared Library
//!
//! This crate contains the data layer and authentication primitives used by
//! the Taskdeck API server and its seed tool.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens and the request auth context
//! - `db`: Connection pool, migrations and demo seed data
//! - `models`: Database models and their queries
//! - `stats`: Dashboard arithmetic (completion percentage, pagination window)

pub mod auth;
pub mod db;
pub mod models;
pub mod stats;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
