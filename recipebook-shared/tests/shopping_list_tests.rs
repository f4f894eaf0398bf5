/// Database-backed tests for shopping list export
///
/// Run with: cargo test --test shopping_list_tests

mod common;

use recipebook_shared::error::DomainError;
use recipebook_shared::models::recipe_ingredient::IngredientAmount;
use recipebook_shared::models::recipe_list::RecipeList;
use recipebook_shared::shopping_list;

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let pool = common::setup().await.expect("Failed to set up database");
    let user = common::create_user(&pool).await;

    let err = shopping_list::export(&pool, user.id).await.unwrap_err();
    assert!(matches!(err, DomainError::EmptyCart));
}

#[tokio::test]
async fn test_lines_are_summed_across_recipes() {
    let pool = common::setup().await.expect("Failed to set up database");
    let user = common::create_user(&pool).await;
    let salt = common::create_ingredient(&pool, "salt", "g").await;
    let water = common::create_ingredient(&pool, "water", "ml").await;

    let soup = common::create_recipe(
        &pool,
        user.id,
        vec![
            IngredientAmount { id: salt.id, amount: 5 },
            IngredientAmount { id: water.id, amount: 500 },
        ],
    )
    .await;
    let bread = common::create_recipe(&pool, user.id, vec![IngredientAmount { id: salt.id, amount: 3 }]).await;

    RecipeList::ShoppingCart.add(&pool, user.id, soup.id).await.unwrap();
    RecipeList::ShoppingCart.add(&pool, user.id, bread.id).await.unwrap();

    let text = shopping_list::export(&pool, user.id).await.unwrap();
    assert_eq!(
        text,
        format!("{}: 500 ml\n{}: 8 g\n", water.name, salt.name)
    );
}

#[tokio::test]
async fn test_other_users_carts_are_ignored() {
    let pool = common::setup().await.expect("Failed to set up database");
    let alice = common::create_user(&pool).await;
    let bob = common::create_user(&pool).await;
    let rice = common::create_ingredient(&pool, "rice", "g").await;
    let recipe = common::create_recipe(&pool, alice.id, vec![IngredientAmount { id: rice.id, amount: 200 }]).await;

    RecipeList::ShoppingCart.add(&pool, alice.id, recipe.id).await.unwrap();
    RecipeList::ShoppingCart.add(&pool, bob.id, recipe.id).await.unwrap();

    let items = shopping_list::build(&pool, alice.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].amount, 200);
}
