/// Shopping list aggregation
///
/// Collapses the ingredient lines of every recipe in a user's cart into one
/// line per `(ingredient name, measurement unit)`, summing amounts. Lines are
/// ordered by total amount, largest first, then by name and unit.
///
/// The same ingredient in different units stays on separate lines: grams and
/// pieces of garlic do not add up.
///
/// # Example
///
/// ```
/// use recipebook_shared::models::recipe_ingredient::CartLine;
/// use recipebook_shared::shopping_list::{aggregate, render};
///
/// let lines = vec![
///     CartLine { name: "salt".into(), measurement_unit: "g".into(), amount: 5 },
///     CartLine { name: "salt".into(), measurement_unit: "g".into(), amount: 3 },
/// ];
///
/// assert_eq!(render(&aggregate(lines)), "salt: 8 g\n");
/// ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sqlx::PgPool;

use crate::error::{DomainError, DomainResult};
use crate::models::recipe_ingredient::{self, CartLine};
use crate::models::recipe_list::RecipeList;

/// Suggested download name for the rendered list
pub const FILENAME: &str = "shopping_list.txt";

/// One aggregated line of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,

    /// Sum over every cart recipe using this ingredient and unit
    pub amount: i64,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.name, self.amount, self.measurement_unit)
    }
}

/// Groups cart lines by (name, unit), sums them and orders the result
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += i64::from(line.amount);
    }

    // BTreeMap iteration is already (name, unit) ascending; the stable sort
    // keeps that as the tie-breaker
    let mut items: Vec<ShoppingItem> = totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| ShoppingItem {
            name,
            measurement_unit,
            amount,
        })
        .collect();
    items.sort_by(|a, b| b.amount.cmp(&a.amount));
    items
}

/// Renders items as plain text, one `"<name>: <sum> <unit>"` per line
pub fn render(items: &[ShoppingItem]) -> String {
    items.iter().map(|item| format!("{}\n", item)).collect()
}

/// Builds the aggregated shopping list for a user
///
/// # Errors
///
/// Returns `DomainError::EmptyCart` when the user's cart has no recipes.
pub async fn build(pool: &PgPool, user_id: i64) -> DomainResult<Vec<ShoppingItem>> {
    if RecipeList::ShoppingCart.count_for_user(pool, user_id).await? == 0 {
        return Err(DomainError::EmptyCart);
    }

    let lines = recipe_ingredient::list_in_cart(pool, user_id).await?;
    let items = aggregate(lines);

    tracing::debug!(user_id, items = items.len(), "Shopping list built");
    Ok(items)
}

/// Builds and renders the shopping list for a user
pub async fn export(pool: &PgPool, user_id: i64) -> DomainResult<String> {
    let items = build(pool, user_id).await?;
    Ok(render(&items))
}
