/// Recipe model and read queries
///
/// Writes that touch a recipe's composition (its tags and ingredient lines)
/// go through [`crate::composer`], which wraps them in one transaction. This
/// module holds the row-level statements the composer runs and the read
/// side: list and detail queries that compute the viewer-relative flags
/// (`is_favorited`, `is_in_shopping_cart`, author `is_subscribed`) per
/// request.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id BIGSERIAL PRIMARY KEY,
///     author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(200) NOT NULL,
///     text TEXT NOT NULL,
///     image VARCHAR(512) NOT NULL,
///     cooking_time INTEGER NOT NULL CHECK (cooking_time >= 1),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use super::recipe_ingredient::{self, RecipeIngredient};
use super::tag::Tag;
use super::user::AuthorProfile;
use crate::pagination::{PageRequest, Paginated};

/// Recipe row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,

    /// Owner; used for the author-or-admin check
    pub author_id: i64,

    pub name: String,

    /// Free-form instructions
    pub text: String,

    /// Opaque image reference resolved by the image store
    pub image: String,

    /// Unit-agnostic, always >= 1
    pub cooking_time: i32,

    pub created_at: DateTime<Utc>,
}

/// Scalar fields written by the composer
#[derive(Debug, Clone, Copy)]
pub struct RecipeFields<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub cooking_time: i32,

    /// `None` keeps the current image on update
    pub image: Option<&'a str>,
}

/// Compact projection returned by favorite/cart adds and subscription cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Recipe list filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<i64>,

    /// Only recipes carrying at least one of these tag slugs
    pub tags: Vec<String>,

    /// Only recipes the viewer favorited (ignored for anonymous viewers)
    pub is_favorited: bool,

    /// Only recipes in the viewer's cart (ignored for anonymous viewers)
    pub is_in_shopping_cart: bool,
}

/// A recipe joined with its author and the viewer-relative flags
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_email: String,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_is_subscribed: bool,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Full recipe as returned by the list and detail endpoints
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: AuthorProfile,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

const RECIPE_ROW_SELECT: &str = r#"
    SELECT r.id, r.name, r.text, r.image, r.cooking_time, r.created_at,
           u.id AS author_id,
           u.email AS author_email,
           u.username AS author_username,
           u.first_name AS author_first_name,
           u.last_name AS author_last_name,
           EXISTS(
               SELECT 1 FROM subscriptions s
               WHERE s.author_id = u.id AND s.subscriber_id = $1
           ) AS author_is_subscribed,
           EXISTS(
               SELECT 1 FROM favorites f
               WHERE f.recipe_id = r.id AND f.user_id = $1
           ) AS is_favorited,
           EXISTS(
               SELECT 1 FROM shopping_cart c
               WHERE c.recipe_id = r.id AND c.user_id = $1
           ) AS is_in_shopping_cart
    FROM recipes r
    INNER JOIN users u ON u.id = r.author_id
"#;

// $1 viewer, $2 author, $3 tag slugs, $4 favorited only, $5 in cart only
const RECIPE_FILTER_WHERE: &str = r#"
    WHERE ($2::BIGINT IS NULL OR r.author_id = $2)
      AND (cardinality($3::TEXT[]) = 0 OR EXISTS(
               SELECT 1 FROM recipe_tags rt
               INNER JOIN tags t ON t.id = rt.tag_id
               WHERE rt.recipe_id = r.id AND t.slug = ANY($3)
          ))
      AND (NOT $4 OR EXISTS(
               SELECT 1 FROM favorites f
               WHERE f.recipe_id = r.id AND f.user_id = $1
          ))
      AND (NOT $5 OR EXISTS(
               SELECT 1 FROM shopping_cart c
               WHERE c.recipe_id = r.id AND c.user_id = $1
          ))
"#;

impl Recipe {
    /// Inserts the recipe row; composition rows are written separately
    pub async fn insert(
        conn: &mut PgConnection,
        author_id: i64,
        fields: RecipeFields<'_>,
    ) -> Result<Self, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, name, text, image, cooking_time, created_at
            "#,
        )
        .bind(author_id)
        .bind(fields.name)
        .bind(fields.text)
        .bind(fields.image.unwrap_or_default())
        .bind(fields.cooking_time)
        .fetch_one(conn)
        .await?;

        Ok(recipe)
    }

    /// Loads and row-locks a recipe for the rest of the transaction
    ///
    /// Serializes concurrent updates of the same recipe.
    pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, text, image, cooking_time, created_at
            FROM recipes
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(recipe)
    }

    /// Overwrites the scalar fields; the image only when one is supplied
    pub async fn update_fields(
        conn: &mut PgConnection,
        id: i64,
        fields: RecipeFields<'_>,
    ) -> Result<Self, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET name = $2,
                text = $3,
                cooking_time = $4,
                image = COALESCE($5, image)
            WHERE id = $1
            RETURNING id, author_id, name, text, image, cooking_time, created_at
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.text)
        .bind(fields.cooking_time)
        .bind(fields.image)
        .fetch_one(conn)
        .await?;

        Ok(recipe)
    }

    /// Finds a recipe by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, text, image, cooking_time, created_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    /// Finds the compact projection of a recipe
    pub async fn find_summary(pool: &PgPool, id: i64) -> Result<Option<RecipeSummary>, sqlx::Error> {
        let summary = sqlx::query_as::<_, RecipeSummary>(
            "SELECT id, name, image, cooking_time FROM recipes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(summary)
    }

    /// Checks whether a recipe exists
    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    /// Deletes a recipe; tags, lines, favorites and cart entries cascade
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists recipes newest first with their composition, for one viewer
    pub async fn list_detailed(
        pool: &PgPool,
        viewer: Option<i64>,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Paginated<RecipeDetail>, sqlx::Error> {
        // Membership filters only make sense for a known viewer
        let favorited_only = filter.is_favorited && viewer.is_some();
        let cart_only = filter.is_in_shopping_cart && viewer.is_some();

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM recipes r {}",
            RECIPE_FILTER_WHERE
        ))
        .bind(viewer)
        .bind(filter.author)
        .bind(&filter.tags)
        .bind(favorited_only)
        .bind(cart_only)
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "{} {} ORDER BY r.created_at DESC, r.id DESC LIMIT $6 OFFSET $7",
            RECIPE_ROW_SELECT, RECIPE_FILTER_WHERE
        ))
        .bind(viewer)
        .bind(filter.author)
        .bind(&filter.tags)
        .bind(favorited_only)
        .bind(cart_only)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let results = Self::attach_composition(pool, rows).await?;
        Ok(Paginated::new(count, results))
    }

    /// Loads one recipe with its composition, for one viewer
    pub async fn find_detailed(
        pool: &PgPool,
        id: i64,
        viewer: Option<i64>,
    ) -> Result<Option<RecipeDetail>, sqlx::Error> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "{} WHERE r.id = $2",
            RECIPE_ROW_SELECT
        ))
        .bind(viewer)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut details = Self::attach_composition(pool, vec![row]).await?;
        Ok(details.pop())
    }

    /// Lists an author's recipes newest first, optionally capped
    pub async fn list_summaries_by_authors(
        pool: &PgPool,
        author_ids: &[i64],
        per_author_limit: Option<i64>,
    ) -> Result<Vec<(i64, RecipeSummary)>, sqlx::Error> {
        let rows: Vec<(i64, i64, String, String, i32)> = sqlx::query_as(
            r#"
            SELECT author_id, id, name, image, cooking_time
            FROM (
                SELECT author_id, id, name, image, cooking_time,
                       ROW_NUMBER() OVER (
                           PARTITION BY author_id
                           ORDER BY created_at DESC, id DESC
                       ) AS position
                FROM recipes
                WHERE author_id = ANY($1)
            ) ranked
            WHERE $2::BIGINT IS NULL OR position <= $2
            ORDER BY author_id, position
            "#,
        )
        .bind(author_ids)
        .bind(per_author_limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(author_id, id, name, image, cooking_time)| {
                (
                    author_id,
                    RecipeSummary {
                        id,
                        name,
                        image,
                        cooking_time,
                    },
                )
            })
            .collect())
    }

    /// Counts recipes per author
    pub async fn count_by_authors(
        pool: &PgPool,
        author_ids: &[i64],
    ) -> Result<HashMap<i64, i64>, sqlx::Error> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT author_id, COUNT(*)
            FROM recipes
            WHERE author_id = ANY($1)
            GROUP BY author_id
            "#,
        )
        .bind(author_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn attach_composition(
        pool: &PgPool,
        rows: Vec<RecipeRow>,
    ) -> Result<Vec<RecipeDetail>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in Tag::list_for_recipes(pool, &ids).await? {
            tags.entry(row.recipe_id).or_default().push(row.into());
        }

        let mut ingredients: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
        for line in recipe_ingredient::list_for_recipes(pool, &ids).await? {
            ingredients.entry(line.recipe_id).or_default().push(line);
        }

        Ok(rows
            .into_iter()
            .map(|row| RecipeDetail {
                id: row.id,
                tags: tags.remove(&row.id).unwrap_or_default(),
                ingredients: ingredients.remove(&row.id).unwrap_or_default(),
                author: AuthorProfile {
                    id: row.author_id,
                    email: row.author_email,
                    username: row.author_username,
                    first_name: row.author_first_name,
                    last_name: row.author_last_name,
                    is_subscribed: row.author_is_subscribed,
                },
                is_favorited: row.is_favorited,
                is_in_shopping_cart: row.is_in_shopping_cart,
                name: row.name,
                image: row.image,
                text: row.text,
                cooking_time: row.cooking_time,
                created_at: row.created_at,
            })
            .collect())
    }
}
