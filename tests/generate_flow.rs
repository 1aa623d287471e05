//! End-to-end request flow against a mock recipe service.

use dish_go::generator::{
    HttpRecipeApi, NO_INGREDIENTS_MESSAGE, Notice, RecipeGenerator, RecordingNotifier,
};
use dish_go::types::{CookingRequest, Difficulty};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> CookingRequest {
    CookingRequest {
        text: Some("tomato, onion".into()),
        recipe_count: Some(3),
        ..Default::default()
    }
}

fn generator_for(
    server: &MockServer,
) -> (RecipeGenerator<HttpRecipeApi, Arc<RecordingNotifier>>, Arc<RecordingNotifier>) {
    let api = HttpRecipeApi::new(&server.uri(), None).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    (RecipeGenerator::with_notifier(api, notifier.clone()), notifier)
}

async fn respond_with(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn success_populates_recipes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"text": "tomato, onion", "recipeCount": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": [{
                "title": "Tomato Soup",
                "difficulty": "easy",
                "cookingTime": 20,
                "ingredients": ["tomato", "onion"],
                "instructions": ["1. Chop", "2. Simmer"]
            }],
            "cached": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (generator, notifier) = generator_for(&server);
    let response = generator.generate(&request()).await.unwrap();

    assert!(response.is_success());
    let state = generator.state();
    assert_eq!(state.recipes.len(), 1);
    assert_eq!(state.recipes[0].title, "Tomato Soup");
    assert_eq!(state.recipes[0].difficulty, Difficulty::Easy);
    assert_eq!(state.recipes[0].cooking_time, 20);
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert!(!state.cached);
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn cached_success_notifies() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        200,
        json!({"success": true, "message": "ok", "data": [], "cached": true}),
    )
    .await;

    let (generator, notifier) = generator_for(&server);
    generator.generate(&request()).await.unwrap();

    assert!(generator.cached());
    assert_eq!(
        notifier.notices(),
        vec![Notice::Info("Served from cache".into())]
    );
}

#[tokio::test]
async fn no_ingredients_error_uses_fixed_message() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        422,
        json!({
            "success": false,
            "message": "nothing found",
            "code": "NO_INGREDIENTS",
            "errors": [{"path": "image", "message": "empty"}]
        }),
    )
    .await;

    let (generator, notifier) = generator_for(&server);
    let response = generator.generate(&request()).await.unwrap();

    assert!(!response.is_success());
    assert_eq!(generator.error().as_deref(), Some(NO_INGREDIENTS_MESSAGE));
    assert!(!generator.loading());
    assert_eq!(
        notifier.notices(),
        vec![Notice::Error("An error occurred".into())]
    );
}

#[tokio::test]
async fn validation_errors_are_joined() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        400,
        json!({
            "success": false,
            "message": "Validation failed",
            "errors": [
                {"path": "text", "message": "too short"},
                {"path": "recipeCount", "message": "invalid"}
            ]
        }),
    )
    .await;

    let (generator, _) = generator_for(&server);
    generator.generate(&request()).await;

    assert_eq!(
        generator.error().as_deref(),
        Some("input error: too short, invalid")
    );
}

#[tokio::test]
async fn non_json_body_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let (generator, notifier) = generator_for(&server);
    assert!(generator.generate(&request()).await.is_none());

    let error = generator.error().unwrap();
    assert!(error.starts_with("invalid response body"), "{error}");
    assert!(!generator.loading());
    assert_eq!(
        notifier.notices(),
        vec![Notice::Error("Connection error".into())]
    );
}

#[tokio::test]
async fn timeout_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cooking"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "ok", "data": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let api = HttpRecipeApi::new(&server.uri(), Some(Duration::from_millis(100))).unwrap();
    let generator = RecipeGenerator::with_notifier(api, RecordingNotifier::new());

    assert!(generator.generate(&request()).await.is_none());
    assert!(generator.error().is_some_and(|e| !e.is_empty()));
    assert!(!generator.loading());
    assert!(generator.recipes().is_empty());
}

#[tokio::test]
async fn reset_error_keeps_recipes() {
    let server = MockServer::start().await;
    let (generator, _) = generator_for(&server);

    Mock::given(method("POST"))
        .and(path("/cooking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": [{
                "title": "Omelette",
                "difficulty": "普通",
                "cookingTime": 10,
                "ingredients": ["egg"],
                "instructions": ["1. Whisk"]
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    generator.generate(&request()).await.unwrap();
    assert_eq!(generator.recipes()[0].difficulty, Difficulty::Normal);

    respond_with(&server, 500, json!({"success": false, "message": "boom"})).await;
    generator.generate(&request()).await.unwrap();
    assert_eq!(generator.error().as_deref(), Some("boom"));
    assert_eq!(generator.recipes().len(), 1);

    generator.reset_error();
    assert_eq!(generator.error(), None);
    assert_eq!(generator.recipes()[0].title, "Omelette");
}
