/// Ingredient model and database operations
///
/// Ingredients are shared, read-only reference data. They are loaded in bulk
/// with [`Ingredient::import`] (see the `load-ingredients` binary) and never
/// owned by a recipe.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ingredients (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(200) NOT NULL,
///     measurement_unit VARCHAR(200) NOT NULL,
///     CONSTRAINT unique_ingredient_name_unit UNIQUE (name, measurement_unit)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

/// Ingredient reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: i64,

    pub name: String,

    /// Unit amounts of this ingredient are expressed in (e.g. `g`, `ml`)
    pub measurement_unit: String,
}

/// Input for creating an ingredient; also the record format of import files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIngredient {
    pub name: String,
    pub measurement_unit: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows that were inserted
    pub inserted: u64,

    /// Rows skipped because the (name, unit) pair already existed
    pub skipped: u64,
}

/// Escapes `%`, `_` and `\` so user input is matched literally by LIKE
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl Ingredient {
    /// Inserts an ingredient
    pub async fn create(pool: &PgPool, data: CreateIngredient) -> Result<Self, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            RETURNING id, name, measurement_unit
            "#,
        )
        .bind(data.name)
        .bind(data.measurement_unit)
        .fetch_one(pool)
        .await?;

        Ok(ingredient)
    }

    /// Lists ingredients, optionally restricted to names starting with `prefix`
    ///
    /// The prefix match is case-insensitive.
    pub async fn list(pool: &PgPool, prefix: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = prefix
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}%", escape_like(p)));

        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE $1::TEXT IS NULL OR name ILIKE $1
            ORDER BY name, measurement_unit
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Finds an ingredient by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Returns the subset of `ids` that exist
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(found)
    }

    /// Bulk-loads ingredients in a single transaction
    ///
    /// Existing (name, unit) pairs are skipped, so re-running an import is a
    /// no-op.
    pub async fn import(
        pool: &PgPool,
        items: &[CreateIngredient],
    ) -> Result<ImportSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut summary = ImportSummary::default();

        for item in items {
            let result = sqlx::query(
                r#"
                INSERT INTO ingredients (name, measurement_unit)
                VALUES ($1, $2)
                ON CONFLICT (name, measurement_unit) DO NOTHING
                "#,
            )
            .bind(item.name.trim())
            .bind(item.measurement_unit.trim())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                summary.inserted += 1;
            } else {
                summary.skipped += 1;
            }
        }

        tx.commit().await?;

        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "Ingredient import finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_text_unchanged() {
        assert_eq!(escape_like("salt"), "salt");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_import_record_format() {
        let items: Vec<CreateIngredient> = serde_json::from_str(
            r#"[{"name": "salt", "measurement_unit": "g"}, {"name": "milk", "measurement_unit": "ml"}]"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].measurement_unit, "ml");
    }
}
