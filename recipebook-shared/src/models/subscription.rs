/// Subscription graph: which users follow which authors
///
/// A directed edge `subscriber -> author`. Self-edges are rejected both here
/// and by the `no_self_subscription` CHECK constraint; duplicate edges are
/// rejected by the `unique_subscription` constraint.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subscriptions (
///     subscriber_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT unique_subscription UNIQUE (subscriber_id, author_id),
///     CONSTRAINT no_self_subscription CHECK (subscriber_id <> author_id)
/// );
/// ```

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;

use super::recipe::{Recipe, RecipeSummary};
use super::user::{AuthorProfile, User};
use crate::error::{
    is_check_violation, is_foreign_key_violation, is_unique_violation, DomainError, DomainResult,
};
use crate::pagination::{PageRequest, Paginated};

/// A followed author with their recent recipes
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCard {
    #[serde(flatten)]
    pub author: AuthorProfile,

    /// Newest first, capped by `recipes_limit` when one was given
    pub recipes: Vec<RecipeSummary>,

    /// Total number of recipes by the author, regardless of the cap
    pub recipes_count: i64,
}

fn self_subscription() -> DomainError {
    DomainError::Conflict("cannot subscribe to yourself".to_string())
}

/// Subscribes `subscriber_id` to `author_id` and returns the author's card
pub async fn subscribe(
    pool: &PgPool,
    subscriber_id: i64,
    author_id: i64,
    recipes_limit: Option<i64>,
) -> DomainResult<SubscriptionCard> {
    if subscriber_id == author_id {
        return Err(self_subscription());
    }

    if !User::exists(pool, author_id).await? {
        return Err(DomainError::NotFound(format!("user {}", author_id)));
    }

    let result = sqlx::query("INSERT INTO subscriptions (subscriber_id, author_id) VALUES ($1, $2)")
        .bind(subscriber_id)
        .bind(author_id)
        .execute(pool)
        .await;

    match result {
        Ok(_) => {}
        Err(err) if is_unique_violation(&err) => {
            return Err(DomainError::Conflict(format!(
                "already subscribed to user {}",
                author_id
            )));
        }
        Err(err) if is_check_violation(&err) => return Err(self_subscription()),
        Err(err) if is_foreign_key_violation(&err) => {
            return Err(DomainError::NotFound(format!("user {}", author_id)));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(subscriber_id, author_id, "Subscribed to author");

    let author = User::find_profile(pool, author_id, Some(subscriber_id))
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("user {}", author_id)))?;

    let mut cards = build_cards(pool, vec![author], recipes_limit).await?;
    cards
        .pop()
        .ok_or_else(|| DomainError::NotFound(format!("user {}", author_id)))
}

/// Removes the `subscriber_id -> author_id` edge
pub async fn unsubscribe(pool: &PgPool, subscriber_id: i64, author_id: i64) -> DomainResult<()> {
    if subscriber_id == author_id {
        return Err(self_subscription());
    }

    if !User::exists(pool, author_id).await? {
        return Err(DomainError::NotFound(format!("user {}", author_id)));
    }

    let result = sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND author_id = $2")
        .bind(subscriber_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::NotFound(format!(
            "not subscribed to user {}",
            author_id
        )));
    }

    tracing::info!(subscriber_id, author_id, "Unsubscribed from author");
    Ok(())
}

/// Whether `subscriber_id` follows `author_id`
pub async fn is_subscribed(pool: &PgPool, subscriber_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE subscriber_id = $1 AND author_id = $2)",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Lists the authors `subscriber_id` follows, ordered by username
pub async fn list(
    pool: &PgPool,
    subscriber_id: i64,
    page: PageRequest,
    recipes_limit: Option<i64>,
) -> DomainResult<Paginated<SubscriptionCard>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
        .bind(subscriber_id)
        .fetch_one(pool)
        .await?;

    let authors = sqlx::query_as::<_, AuthorProfile>(
        r#"
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
               TRUE AS is_subscribed
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.subscriber_id = $1
        ORDER BY u.username ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(subscriber_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let results = build_cards(pool, authors, recipes_limit).await?;
    Ok(Paginated::new(count, results))
}

async fn build_cards(
    pool: &PgPool,
    authors: Vec<AuthorProfile>,
    recipes_limit: Option<i64>,
) -> Result<Vec<SubscriptionCard>, sqlx::Error> {
    if authors.is_empty() {
        return Ok(Vec::new());
    }

    // A non-positive cap means "no recipes", not "all recipes"
    let recipes_limit = recipes_limit.map(|limit| limit.max(0));

    let ids: Vec<i64> = authors.iter().map(|author| author.id).collect();
    let counts = Recipe::count_by_authors(pool, &ids).await?;

    let mut recipes: HashMap<i64, Vec<RecipeSummary>> = HashMap::new();
    for (author_id, summary) in Recipe::list_summaries_by_authors(pool, &ids, recipes_limit).await? {
        recipes.entry(author_id).or_default().push(summary);
    }

    Ok(authors
        .into_iter()
        .map(|author| SubscriptionCard {
            recipes: recipes.remove(&author.id).unwrap_or_default(),
            recipes_count: counts.get(&author.id).copied().unwrap_or(0),
            author,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_flattens_author() {
        let card = SubscriptionCard {
            author: AuthorProfile {
                id: 7,
                email: "chef@example.com".to_string(),
                username: "chef".to_string(),
                first_name: "Julia".to_string(),
                last_name: "Child".to_string(),
                is_subscribed: true,
            },
            recipes: vec![],
            recipes_count: 12,
        };

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["username"], "chef");
        assert_eq!(json["is_subscribed"], true);
        assert_eq!(json["recipes_count"], 12);
        assert!(json.get("author").is_none());
    }

    #[test]
    fn test_self_subscription_is_conflict() {
        assert!(matches!(self_subscription(), DomainError::Conflict(_)));
    }
}
