/// Database models and their queries
///
/// # Models
///
/// - `user`: externally provisioned accounts and the public author card
/// - `tag`: reference tags attached to recipes
/// - `ingredient`: reference ingredients with a measurement unit
/// - `recipe`: recipes and the viewer-relative read queries
/// - `recipe_ingredient`: ingredient lines (recipe, ingredient, amount)
/// - `recipe_list`: favorites and shopping cart memberships
/// - `subscription`: the subscriber -> author graph
///
/// # Example
///
/// ```no_run
/// use recipebook_shared::models::recipe::{Recipe, RecipeFilter};
/// use recipebook_shared::pagination::PageRequest;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), sqlx::Error> {
/// let filter = RecipeFilter {
///     tags: vec!["breakfast".to_string()],
///     ..Default::default()
/// };
///
/// let page = Recipe::list_detailed(&pool, None, &filter, PageRequest::new(None, None, 6)).await?;
/// println!("{} breakfast recipes", page.count);
/// # Ok(())
/// # }
/// ```

pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod recipe_list;
pub mod subscription;
pub mod tag;
pub mod user;
