/// Integration tests for the Recipebook API
///
/// These tests drive the full router:
/// - recipe create, read, update and delete with authorization
/// - favorites and shopping cart toggles
/// - shopping list download
/// - author subscriptions

mod common;

use axum::http::{header, Method, StatusCode};
use common::TestContext;
use recipebook_shared::models::user::UserRole;
use serde_json::{json, Value};

async fn recipe_body(ctx: &TestContext, amounts: &[(&str, &str, i32)]) -> Value {
    let tag = common::create_tag(&ctx.db).await.unwrap();

    let mut ingredients = Vec::new();
    for (name, unit, amount) in amounts {
        let ingredient = common::create_ingredient(&ctx.db, name, unit).await.unwrap();
        ingredients.push(json!({ "id": ingredient.id, "amount": amount }));
    }

    json!({
        "name": "Integration pie",
        "text": "Bake it.",
        "cooking_time": 45,
        "image": "recipes/pie.png",
        "tags": [tag.id],
        "ingredients": ingredients
    })
}

async fn create_recipe(ctx: &TestContext, body: Value) -> Value {
    let response = ctx.send_as_user(Method::POST, "/api/recipes", Some(body)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["database"], "connected");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_and_read_recipe() {
    let ctx = TestContext::new().await.unwrap();
    let body = recipe_body(&ctx, &[("flour", "g", 300), ("eggs", "pcs", 2)]).await;

    let created = create_recipe(&ctx, body).await;
    assert_eq!(created["author"]["id"], ctx.user.id);
    assert_eq!(created["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(created["is_favorited"], false);

    let uri = format!("/api/recipes/{}", created["id"]);
    let anonymous = ctx.send(Method::GET, &uri, None, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
    assert_eq!(anonymous.json()["name"], "Integration pie");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let ctx = TestContext::new().await.unwrap();
    let body = recipe_body(&ctx, &[("flour", "g", 300)]).await;

    let response = ctx.send(Method::POST, "/api/recipes", None, Some(body)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_invalid_recipe_is_unprocessable() {
    let ctx = TestContext::new().await.unwrap();
    let mut body = recipe_body(&ctx, &[("flour", "g", 300)]).await;
    body["cooking_time"] = json!(0);

    let response = ctx.send_as_user(Method::POST, "/api/recipes", Some(body)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let json = response.json();
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["details"][0]["field"], "cooking_time");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let ctx = TestContext::new().await.unwrap();
    let mut body = recipe_body(&ctx, &[("flour", "g", 300)]).await;
    body["cooking_time"] = json!("soon");

    let response = ctx.send_as_user(Method::POST, "/api/recipes", Some(body)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let json = response.json();
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["details"][0]["field"], "body");

    // No body and no content type
    let response = ctx.send_as_user(Method::POST, "/api/recipes", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "bad_request");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_only_author_or_admin_may_modify() {
    let ctx = TestContext::new().await.unwrap();
    let body = recipe_body(&ctx, &[("flour", "g", 300)]).await;
    let created = create_recipe(&ctx, body.clone()).await;
    let uri = format!("/api/recipes/{}", created["id"]);

    let (stranger, stranger_token) = ctx.other_user(UserRole::User).await.unwrap();
    let response = ctx.send(Method::PATCH, &uri, Some(&stranger_token), Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = ctx.send(Method::DELETE, &uri, Some(&stranger_token), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let (admin, admin_token) = ctx.other_user(UserRole::Admin).await.unwrap();
    let mut renamed = body;
    renamed["name"] = json!("Renamed by admin");
    let response = ctx.send(Method::PATCH, &uri, Some(&admin_token), Some(renamed)).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(response.json()["name"], "Renamed by admin");

    let response = ctx.send_as_user(Method::DELETE, &uri, None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx.send(Method::GET, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    recipebook_shared::models::user::User::delete(&ctx.db, stranger.id).await.unwrap();
    recipebook_shared::models::user::User::delete(&ctx.db, admin.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_favorite_toggle() {
    let ctx = TestContext::new().await.unwrap();
    let body = recipe_body(&ctx, &[("flour", "g", 300)]).await;
    let created = create_recipe(&ctx, body).await;
    let uri = format!("/api/recipes/{}/favorite", created["id"]);

    let response = ctx.send_as_user(Method::POST, &uri, None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let summary = response.json();
    assert_eq!(summary["id"], created["id"]);
    assert_eq!(summary["cooking_time"], 45);

    let response = ctx.send_as_user(Method::POST, &uri, None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let detail = ctx
        .send_as_user(Method::GET, &format!("/api/recipes/{}", created["id"]), None)
        .await;
    assert_eq!(detail.json()["is_favorited"], true);

    let list = ctx
        .send_as_user(Method::GET, "/api/recipes?is_favorited=1", None)
        .await;
    assert_eq!(list.json()["count"], 1);

    let response = ctx.send_as_user(Method::DELETE, &uri, None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx.send_as_user(Method::DELETE, &uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_shopping_list_download() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send_as_user(Method::GET, "/api/recipes/download_shopping_cart", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let salt = common::create_ingredient(&ctx.db, "salt", "g").await.unwrap();
    let tag = common::create_tag(&ctx.db).await.unwrap();
    for amount in [5, 3] {
        let created = create_recipe(
            &ctx,
            json!({
                "name": "Salty",
                "text": "Add salt.",
                "cooking_time": 5,
                "image": "recipes/salty.png",
                "tags": [tag.id],
                "ingredients": [{ "id": salt.id, "amount": amount }]
            }),
        )
        .await;

        let uri = format!("/api/recipes/{}/shopping_cart", created["id"]);
        let response = ctx.send_as_user(Method::POST, &uri, None).await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = ctx
        .send_as_user(Method::GET, "/api/recipes/download_shopping_cart", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert!(response.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("shopping_list.txt"));
    assert_eq!(response.text(), format!("{}: 8 g\n", salt.name));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_subscriptions() {
    let ctx = TestContext::new().await.unwrap();
    let (author, author_token) = ctx.other_user(UserRole::User).await.unwrap();

    let own = format!("/api/users/{}/subscribe", ctx.user.id);
    let response = ctx.send_as_user(Method::POST, &own, None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let body = recipe_body(&ctx, &[("rice", "g", 100)]).await;
    let response = ctx
        .send(Method::POST, "/api/recipes", Some(&author_token), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let uri = format!("/api/users/{}/subscribe", author.id);
    let response = ctx.send_as_user(Method::POST, &uri, None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let card = response.json();
    assert_eq!(card["id"], author.id);
    assert_eq!(card["is_subscribed"], true);
    assert_eq!(card["recipes_count"], 1);

    let response = ctx.send_as_user(Method::POST, &uri, None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = ctx
        .send_as_user(Method::GET, "/api/users/subscriptions?recipes_limit=0", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 0);
    assert_eq!(page["results"][0]["recipes_count"], 1);

    let response = ctx.send_as_user(Method::DELETE, &uri, None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx.send_as_user(Method::DELETE, &uri, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    recipebook_shared::models::user::User::delete(&ctx.db, author.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_reference_data() {
    let ctx = TestContext::new().await.unwrap();
    let tag = common::create_tag(&ctx.db).await.unwrap();
    let ingredient = common::create_ingredient(&ctx.db, "nutmeg", "g").await.unwrap();

    let response = ctx.send(Method::GET, &format!("/api/tags/{}", tag.id), None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["slug"], tag.slug);

    let uri = format!("/api/ingredients?name={}", &ingredient.name[..6]);
    let response = ctx.send(Method::GET, &uri, None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let found = response.json();
    assert!(found
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["id"] == ingredient.id));

    let response = ctx.send(Method::GET, "/api/ingredients/0", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}
