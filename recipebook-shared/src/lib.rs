//! # Recipebook Shared Library
//!
//! Domain logic and persistence for the Recipebook API: recipes composed of
//! tags and ingredient lines, per-user favorites and shopping carts, the
//! shopping list built from a cart, and author subscriptions.
//!
//! ## Module Organization
//!
//! - `auth`: bearer token validation and the author-or-admin check
//! - `composer`: validated, transactional recipe create/update
//! - `db`: connection pool and migrations
//! - `error`: the domain error type
//! - `models`: database models and queries
//! - `pagination`: page requests and the `{count, results}` envelope
//! - `shopping_list`: cart aggregation and plain-text rendering

pub mod auth;
pub mod composer;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod shopping_list;

/// Current version of the Recipebook shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
