/// Recipe composer: validated, atomic creation and recomposition of recipes
///
/// A recipe is a parent row plus two owned child sets: its tags and its
/// ingredient lines. The composer is the only writer of those sets.
///
/// 1. [`validate`] checks the submitted shape (cooking time, amounts,
///    duplicates) and then that every referenced tag and ingredient exists.
///    Nothing is written until it succeeds.
/// 2. [`create`] and [`update`] persist a [`ValidatedRecipe`] inside one
///    transaction. Update deletes both child sets and bulk-inserts the new
///    ones, so a recipe never ends up with a partial composition.
///
/// Authorization ("author or administrator") is the caller's job; see
/// [`crate::auth::authorization`].
///
/// # Example
///
/// ```no_run
/// use recipebook_shared::composer::{self, RecipeInput};
/// use recipebook_shared::models::recipe_ingredient::IngredientAmount;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let input = RecipeInput {
///     name: "Porridge".to_string(),
///     text: "Boil oats in milk.".to_string(),
///     cooking_time: 10,
///     image: Some("recipes/porridge.png".to_string()),
///     tags: vec![1],
///     ingredients: vec![IngredientAmount { id: 5, amount: 200 }],
/// };
///
/// let validated = composer::validate(&pool, input).await?;
/// let recipe = composer::create(&pool, &validated, 42).await?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{
    is_check_violation, is_foreign_key_violation, DomainError, DomainResult, FieldViolation,
};
use crate::models::ingredient::Ingredient;
use crate::models::recipe::{Recipe, RecipeFields};
use crate::models::recipe_ingredient::{self, IngredientAmount};
use crate::models::tag::Tag;

/// Recipe submission as received from a client
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,

    #[validate(range(min = 1, message = "Cooking time must be at least 1"))]
    pub cooking_time: i32,

    /// Required on create; on update `None` keeps the current image
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "At least one tag is required"))]
    pub tags: Vec<i64>,

    #[serde(default)]
    #[validate(length(min = 1, message = "At least one ingredient is required"))]
    pub ingredients: Vec<IngredientAmount>,
}

/// A recipe submission that passed every check
///
/// Only [`validate`] constructs one, so persisting unchecked input does not
/// type-check.
#[derive(Debug, Clone)]
pub struct ValidatedRecipe {
    name: String,
    text: String,
    cooking_time: i32,
    image: Option<String>,
    tags: Vec<i64>,
    ingredients: Vec<IngredientAmount>,
}

impl ValidatedRecipe {
    fn fields(&self) -> RecipeFields<'_> {
        RecipeFields {
            name: &self.name,
            text: &self.text,
            cooking_time: self.cooking_time,
            image: self.image.as_deref(),
        }
    }
}

/// Shape checks that need no database access
fn shape_violations(input: &RecipeInput) -> Vec<FieldViolation> {
    let mut violations = match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => match DomainError::from(errors) {
            DomainError::Validation(violations) => violations,
            _ => Vec::new(),
        },
    };

    let mut push = |field: &str, message: &str| {
        violations.push(FieldViolation {
            field: field.to_string(),
            message: message.to_string(),
        })
    };

    if !input.name.is_empty() && input.name.trim().is_empty() {
        push("name", "Name must not be blank");
    }

    if !input.text.is_empty() && input.text.trim().is_empty() {
        push("text", "Text must not be blank");
    }

    if matches!(&input.image, Some(image) if image.trim().is_empty()) {
        push("image", "Image must not be empty");
    }

    if input.ingredients.iter().any(|line| line.amount <= 0) {
        push("ingredients", "Amount must be greater than 0");
    }

    let mut seen = HashSet::new();
    if !input.ingredients.iter().all(|line| seen.insert(line.id)) {
        push("ingredients", "duplicate ingredient");
    }

    let mut seen = HashSet::new();
    if !input.tags.iter().all(|id| seen.insert(*id)) {
        push("tags", "duplicate tag");
    }

    violations
}

/// First id in `wanted` that is not in `found`
fn first_missing(wanted: &[i64], found: &[i64]) -> Option<i64> {
    let found: HashSet<i64> = found.iter().copied().collect();
    wanted.iter().copied().find(|id| !found.contains(id))
}

/// Validates a submission before anything is written
///
/// # Errors
///
/// - `Validation` for shape problems (all of them, collected)
/// - `NotFound` for the first unknown tag or ingredient
pub async fn validate(pool: &PgPool, input: RecipeInput) -> DomainResult<ValidatedRecipe> {
    let violations = shape_violations(&input);
    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "Recipe input rejected");
        return Err(DomainError::Validation(violations));
    }

    let found = Tag::existing_ids(pool, &input.tags).await?;
    if let Some(id) = first_missing(&input.tags, &found) {
        return Err(DomainError::NotFound(format!("tag {}", id)));
    }

    let ids: Vec<i64> = input.ingredients.iter().map(|line| line.id).collect();
    let found = Ingredient::existing_ids(pool, &ids).await?;
    if let Some(id) = first_missing(&ids, &found) {
        return Err(DomainError::NotFound(format!("ingredient {}", id)));
    }

    Ok(ValidatedRecipe {
        name: input.name,
        text: input.text,
        cooking_time: input.cooking_time,
        image: input.image,
        tags: input.tags,
        ingredients: input.ingredients,
    })
}

/// Translates constraint failures raised while writing a composition
///
/// A tag or ingredient deleted between validation and commit surfaces as a
/// foreign-key violation.
fn write_error(err: sqlx::Error) -> DomainError {
    if is_foreign_key_violation(&err) {
        DomainError::NotFound("referenced tag or ingredient".to_string())
    } else if is_check_violation(&err) {
        DomainError::invalid("recipe", "Value out of range")
    } else {
        DomainError::Database(err)
    }
}

/// Creates a recipe with its tags and ingredient lines in one transaction
pub async fn create(pool: &PgPool, validated: &ValidatedRecipe, author_id: i64) -> DomainResult<Recipe> {
    if validated.image.is_none() {
        return Err(DomainError::invalid("image", "Image is required"));
    }

    let mut tx = pool.begin().await?;

    let recipe = Recipe::insert(&mut *tx, author_id, validated.fields())
        .await
        .map_err(write_error)?;
    Tag::replace_for_recipe(&mut *tx, recipe.id, &validated.tags)
        .await
        .map_err(write_error)?;
    recipe_ingredient::replace_for_recipe(&mut *tx, recipe.id, &validated.ingredients)
        .await
        .map_err(write_error)?;

    tx.commit().await?;

    tracing::info!(
        recipe_id = recipe.id,
        author_id,
        tags = validated.tags.len(),
        ingredients = validated.ingredients.len(),
        "Recipe created"
    );
    Ok(recipe)
}

/// Recomposes an existing recipe in one transaction
///
/// Locks the recipe row, replaces both child sets wholesale and overwrites
/// the scalar fields (the image only when one was submitted).
pub async fn update(pool: &PgPool, recipe_id: i64, validated: &ValidatedRecipe) -> DomainResult<Recipe> {
    let mut tx = pool.begin().await?;

    if Recipe::lock(&mut *tx, recipe_id).await?.is_none() {
        return Err(DomainError::NotFound(format!("recipe {}", recipe_id)));
    }

    Tag::replace_for_recipe(&mut *tx, recipe_id, &validated.tags)
        .await
        .map_err(write_error)?;
    recipe_ingredient::replace_for_recipe(&mut *tx, recipe_id, &validated.ingredients)
        .await
        .map_err(write_error)?;
    let recipe = Recipe::update_fields(&mut *tx, recipe_id, validated.fields())
        .await
        .map_err(write_error)?;

    tx.commit().await?;

    tracing::info!(recipe_id, "Recipe updated");
    Ok(recipe)
}

/// Deletes a recipe; its tags, lines, favorites and cart entries cascade
pub async fn delete(pool: &PgPool, recipe_id: i64) -> DomainResult<()> {
    if !Recipe::delete(pool, recipe_id).await? {
        return Err(DomainError::NotFound(format!("recipe {}", recipe_id)));
    }

    tracing::info!(recipe_id, "Recipe deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RecipeInput {
        RecipeInput {
            name: "Tomato soup".to_string(),
            text: "Simmer and blend.".to_string(),
            cooking_time: 30,
            image: Some("recipes/soup.png".to_string()),
            tags: vec![1, 2],
            ingredients: vec![
                IngredientAmount { id: 5, amount: 3 },
                IngredientAmount { id: 6, amount: 1 },
            ],
        }
    }

    fn fields(violations: &[FieldViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_input_has_no_violations() {
        assert!(shape_violations(&input()).is_empty());
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let mut input = input();
        input.ingredients = vec![
            IngredientAmount { id: 5, amount: 3 },
            IngredientAmount { id: 5, amount: 4 },
        ];

        let violations = shape_violations(&input);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "ingredients");
        assert_eq!(violations[0].message, "duplicate ingredient");
    }

    #[test]
    fn test_non_positive_cooking_time_rejected() {
        for cooking_time in [0, -5] {
            let mut input = input();
            input.cooking_time = cooking_time;
            assert_eq!(fields(&shape_violations(&input)), vec!["cooking_time"]);
        }
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let mut input = input();
        input.ingredients[1].amount = 0;
        assert_eq!(fields(&shape_violations(&input)), vec!["ingredients"]);
    }

    #[test]
    fn test_empty_lists_rejected() {
        let mut input = input();
        input.tags.clear();
        input.ingredients.clear();
        assert_eq!(fields(&shape_violations(&input)), vec!["ingredients", "tags"]);
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut input = input();
        input.tags = vec![1, 1];
        assert_eq!(fields(&shape_violations(&input)), vec!["tags"]);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut input = input();
        input.name = "   ".to_string();
        assert_eq!(fields(&shape_violations(&input)), vec!["name"]);

        input.name = String::new();
        assert_eq!(fields(&shape_violations(&input)), vec!["name"]);
    }

    #[test]
    fn test_name_too_long_rejected() {
        let mut input = input();
        input.name = "a".repeat(201);
        assert_eq!(fields(&shape_violations(&input)), vec!["name"]);
    }

    #[test]
    fn test_missing_image_is_allowed_by_shape_checks() {
        let mut input = input();
        input.image = None;
        assert!(shape_violations(&input).is_empty());

        input.image = Some(" ".to_string());
        assert_eq!(fields(&shape_violations(&input)), vec!["image"]);
    }

    #[test]
    fn test_first_missing() {
        assert_eq!(first_missing(&[1, 2, 3], &[3, 1]), Some(2));
        assert_eq!(first_missing(&[1, 2], &[2, 1]), None);
        assert_eq!(first_missing(&[], &[]), None);
    }

    #[test]
    fn test_write_error_passes_other_errors_through() {
        assert!(matches!(
            write_error(sqlx::Error::PoolTimedOut),
            DomainError::Database(_)
        ));
    }
}
