//! # Ingredient loader
//!
//! Imports reference ingredients from a JSON file:
//!
//! ```json
//! [
//!   { "name": "salt", "measurement_unit": "g" },
//!   { "name": "milk", "measurement_unit": "ml" }
//! ]
//! ```
//!
//! Pairs that already exist are skipped, so the import can be re-run.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://... cargo run -p recipebook-api --bin load-ingredients -- data/ingredients.json
//! ```

use anyhow::Context;
use recipebook_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use recipebook_shared::models::ingredient::{CreateIngredient, Ingredient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn parse_ingredients(raw: &str) -> anyhow::Result<Vec<CreateIngredient>> {
    let items: Vec<CreateIngredient> =
        serde_json::from_str(raw).context("Expected a JSON array of {name, measurement_unit}")?;

    if let Some(position) = items
        .iter()
        .position(|item| item.name.trim().is_empty() || item.measurement_unit.trim().is_empty())
    {
        anyhow::bail!("Entry {} has an empty name or measurement unit", position);
    }

    Ok(items)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "load_ingredients=info,recipebook_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .context("Usage: load-ingredients <path/to/ingredients.json>")?;

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;
    let items = parse_ingredients(&raw)?;
    tracing::info!(path = %path, count = items.len(), "Loaded ingredient file");

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;
    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 2,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let summary = Ingredient::import(&pool, &items).await?;
    println!(
        "Imported {} ingredients ({} already present)",
        summary.inserted, summary.skipped
    );

    close_pool(pool).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredients() {
        let items = parse_ingredients(r#"[{"name": "salt", "measurement_unit": "g"}]"#).unwrap();
        assert_eq!(
            items,
            vec![CreateIngredient {
                name: "salt".to_string(),
                measurement_unit: "g".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_rejects_blank_fields() {
        let err = parse_ingredients(r#"[{"name": " ", "measurement_unit": "g"}]"#).unwrap_err();
        assert!(err.to_string().contains("Entry 0"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_ingredients(r#"{"name": "salt"}"#).is_err());
    }
}
