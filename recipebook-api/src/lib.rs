//! # Recipebook API Server Library
//!
//! HTTP surface of the recipe-sharing service: recipes, tags, ingredients,
//! favorites, shopping carts and author subscriptions.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
