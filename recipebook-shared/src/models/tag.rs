/// Tag model and the recipe-tag join table
///
/// Tags are read-only reference data with an independent lifecycle. A recipe
/// links to tags through `recipe_tags`; those rows belong to the recipe and
/// are replaced as a whole whenever the recipe is recomposed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(200) NOT NULL UNIQUE,
///     color CHAR(7) NOT NULL UNIQUE,
///     slug VARCHAR(200) NOT NULL UNIQUE
/// );
///
/// CREATE TABLE recipe_tags (
///     recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     tag_id BIGINT NOT NULL REFERENCES tags(id) ON DELETE RESTRICT,
///     CONSTRAINT unique_recipe_tag UNIQUE (recipe_id, tag_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

/// Tag reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,

    /// Display name
    pub name: String,

    /// Hex color, e.g. `#E26C2D`
    pub color: String,

    /// URL-safe unique identifier used by the recipe list filter
    pub slug: String,
}

/// Input for seeding a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// A tag together with the recipe it is attached to
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeTagRow {
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<RecipeTagRow> for Tag {
    fn from(row: RecipeTagRow) -> Self {
        Tag {
            id: row.id,
            name: row.name,
            color: row.color,
            slug: row.slug,
        }
    }
}

impl Tag {
    /// Inserts a tag
    pub async fn create(pool: &PgPool, data: CreateTag) -> Result<Self, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, color, slug)
            VALUES ($1, $2, $3)
            RETURNING id, name, color, slug
            "#,
        )
        .bind(data.name)
        .bind(data.color)
        .bind(data.slug)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    /// Lists all tags ordered by name
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY name")
            .fetch_all(pool)
            .await?;

        Ok(tags)
    }

    /// Finds a tag by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(tag)
    }

    /// Returns the subset of `ids` that exist
    pub async fn existing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(found)
    }

    /// Loads the tags of several recipes in one query
    pub async fn list_for_recipes(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<Vec<RecipeTagRow>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            INNER JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Replaces the whole tag set of a recipe
    ///
    /// Must run on the connection of the composing transaction.
    pub async fn replace_for_recipe(
        conn: &mut PgConnection,
        recipe_id: i64,
        tag_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO recipe_tags (recipe_id, tag_id)
            SELECT $1, UNNEST($2::BIGINT[])
            "#,
        )
        .bind(recipe_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
