/// Ingredient lines: the recipe-ingredient join table with amounts
///
/// A recipe owns its lines. They are never edited in place: recomposing a
/// recipe deletes every line and bulk-inserts the submitted set.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipe_ingredients (
///     recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     ingredient_id BIGINT NOT NULL REFERENCES ingredients(id) ON DELETE RESTRICT,
///     amount INTEGER NOT NULL CHECK (amount > 0),
///     CONSTRAINT unique_recipe_ingredient UNIQUE (recipe_id, ingredient_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

/// One submitted `{id, amount}` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Ingredient ID
    pub id: i64,

    /// Amount in the ingredient's measurement unit
    pub amount: i32,
}

/// An ingredient line joined with its ingredient, as shown on a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredient {
    #[serde(skip)]
    pub recipe_id: i64,

    /// Ingredient ID
    pub id: i64,

    pub name: String,

    pub measurement_unit: String,

    pub amount: i32,
}

/// An ingredient line of a recipe in someone's shopping cart
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Loads the ingredient lines of several recipes in one query
pub async fn list_for_recipes(
    pool: &PgPool,
    recipe_ids: &[i64],
) -> Result<Vec<RecipeIngredient>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RecipeIngredient>(
        r#"
        SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ANY($1)
        ORDER BY i.name
        "#,
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces the whole ingredient-line set of a recipe
///
/// Must run on the connection of the composing transaction.
pub async fn replace_for_recipe(
    conn: &mut PgConnection,
    recipe_id: i64,
    lines: &[IngredientAmount],
) -> Result<(), sqlx::Error> {
    let ingredient_ids: Vec<i64> = lines.iter().map(|line| line.id).collect();
    let amounts: Vec<i32> = lines.iter().map(|line| line.amount).collect();

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, line.ingredient_id, line.amount
        FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS line(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(&ingredient_ids)
    .bind(&amounts)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Every ingredient line of every recipe in the user's shopping cart
pub async fn list_in_cart(pool: &PgPool, user_id: i64) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_cart sc
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}
