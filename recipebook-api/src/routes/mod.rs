/// API route handlers
///
/// Organized by resource:
///
/// - `health`: health check
/// - `tags`, `ingredients`: read-only reference data
/// - `recipes`: recipe list, detail and composition
/// - `recipe_lists`: favorites and shopping cart toggles
/// - `shopping_list`: shopping list download
/// - `subscriptions`: user cards and author subscriptions

pub mod health;
pub mod ingredients;
pub mod recipe_lists;
pub mod recipes;
pub mod shopping_list;
pub mod subscriptions;
pub mod tags;
