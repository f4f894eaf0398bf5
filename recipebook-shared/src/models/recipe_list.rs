/// Per-user recipe memberships: favorites and the shopping cart
///
/// Both lists have the same shape, a `(user_id, recipe_id)` row with a
/// unique constraint, and the same toggle semantics:
///
/// - adding a recipe already in the list is a `Conflict`
/// - removing a recipe not in the list is a `NotFound`
/// - adding a recipe that does not exist is a `NotFound`
///
/// The unique constraint is the arbiter under concurrency: the losing insert
/// of two simultaneous adds fails with a unique violation and is reported
/// as a `Conflict`.
///
/// # Example
///
/// ```no_run
/// use recipebook_shared::models::recipe_list::RecipeList;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let summary = RecipeList::Favorites.add(&pool, 1, 42).await?;
/// assert_eq!(summary.id, 42);
/// RecipeList::Favorites.remove(&pool, 1, 42).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;

use super::recipe::{Recipe, RecipeSummary};
use crate::error::{is_foreign_key_violation, is_unique_violation, DomainError, DomainResult};

/// Which per-user list to operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    /// Backing table
    fn table(&self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping_cart",
        }
    }

    /// Human-readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping cart",
        }
    }

    /// Adds a recipe to the user's list and returns its compact projection
    pub async fn add(&self, pool: &PgPool, user_id: i64, recipe_id: i64) -> DomainResult<RecipeSummary> {
        let summary = Recipe::find_summary(pool, recipe_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("recipe {}", recipe_id)))?;

        let result = sqlx::query(&format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2)",
            self.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(user_id, recipe_id, list = self.label(), "Recipe added to list");
                Ok(summary)
            }
            Err(err) if is_unique_violation(&err) => Err(DomainError::Conflict(format!(
                "recipe {} is already in {}",
                recipe_id,
                self.label()
            ))),
            Err(err) if is_foreign_key_violation(&err) => {
                Err(DomainError::NotFound(format!("recipe {}", recipe_id)))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes a recipe from the user's list
    pub async fn remove(&self, pool: &PgPool, user_id: i64, recipe_id: i64) -> DomainResult<()> {
        if !Recipe::exists(pool, recipe_id).await? {
            return Err(DomainError::NotFound(format!("recipe {}", recipe_id)));
        }

        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            self.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!(
                "recipe {} is not in {}",
                recipe_id,
                self.label()
            )));
        }

        tracing::info!(user_id, recipe_id, list = self.label(), "Recipe removed from list");
        Ok(())
    }

    /// Whether the recipe is in the user's list
    pub async fn contains(&self, pool: &PgPool, user_id: i64, recipe_id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND recipe_id = $2)",
            self.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Number of recipes in the user's list
    pub async fn count_for_user(&self, pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = $1",
            self.table()
        ))
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_distinct() {
        assert_eq!(RecipeList::Favorites.table(), "favorites");
        assert_eq!(RecipeList::ShoppingCart.table(), "shopping_cart");
    }

    #[test]
    fn test_labels() {
        assert_eq!(RecipeList::Favorites.label(), "favorites");
        assert_eq!(RecipeList::ShoppingCart.label(), "shopping cart");
    }
}
