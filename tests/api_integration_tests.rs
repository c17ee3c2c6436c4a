use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, Method, Request, StatusCode,
    },
    Router,
};
use foodgram::config::Config;
use foodgram::models::{IngredientAmount, LineItem, NewUser, RecipeInput};
use foodgram::server::{router, AppState};
use foodgram::shopping_list::{aggregate, shopping_list_filename};
use foodgram::storage::{ListKind, Store};
use serde_json::{json, Value};
use std::path::PathBuf;
use tower::ServiceExt;

const FONT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fonts");

struct TestApp {
    app: Router,
    store: Store,
    token: String,
    other_token: String,
    user_id: i64,
    flour: i64,
    eggs: i64,
    tag: i64,
}

fn test_config(font_dir: &str) -> Config {
    let mut config = Config::from_lookup(|_| None).expect("default config");
    config.font_dir = PathBuf::from(font_dir);
    config
}

fn create_user(store: &Store, username: &str) -> (i64, String) {
    let (user, token) = store
        .create_user(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
        })
        .unwrap();
    (user.id, token)
}

fn setup_with_font_dir(font_dir: &str) -> TestApp {
    let store = Store::open_in_memory().unwrap();
    let (user_id, token) = create_user(&store, "cook");
    let (_, other_token) = create_user(&store, "guest");

    store.insert_ingredient("flour", "g").unwrap();
    store.insert_ingredient("eggs", "pcs").unwrap();
    let all = store.ingredients(None).unwrap();
    let flour = all.iter().find(|i| i.name == "flour").unwrap().id;
    let eggs = all.iter().find(|i| i.name == "eggs").unwrap().id;
    let tag = store.create_tag("Baking", "#E26C2D", "baking").unwrap().id;

    let app = router(AppState::new(store.clone(), test_config(font_dir)));
    TestApp {
        app,
        store,
        token,
        other_token,
        user_id,
        flour,
        eggs,
        tag,
    }
}

fn setup() -> TestApp {
    setup_with_font_dir(FONT_DIR)
}

impl TestApp {
    fn recipe(&self, name: &str, flour: i64, eggs: i64) -> i64 {
        self.store
            .create_recipe(
                self.user_id,
                &RecipeInput {
                    ingredients: vec![
                        IngredientAmount { id: self.flour, amount: flour },
                        IngredientAmount { id: self.eggs, amount: eggs },
                    ],
                    tags: vec![self.tag],
                    name: name.to_string(),
                    text: "Mix and bake.".to_string(),
                    cooking_time: 40,
                },
            )
            .unwrap()
            .id
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, HeaderMap, Vec<u8>) {
        self.send_raw(method, uri, token, body.map(|body| body.to_string())).await
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("response body is JSON")
}

#[tokio::test]
async fn test_download_shopping_cart_aggregates_cart() {
    let t = setup();
    let bread = t.recipe("Bread", 200, 3);
    let cake = t.recipe("Cake", 300, 1);
    t.store.add_to_list(ListKind::ShoppingCart, t.user_id, bread).unwrap();
    t.store.add_to_list(ListKind::ShoppingCart, t.user_id, cake).unwrap();

    let (status, headers, body) = t
        .send(Method::GET, "/api/recipes/download_shopping_cart/", Some(&t.token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "application/pdf");
    assert!(body.starts_with(b"%PDF-"));

    let expected = aggregate(&[LineItem::new("flour", "g", 500), LineItem::new("eggs", "pcs", 4)]);
    let disposition = headers[CONTENT_DISPOSITION].to_str().unwrap();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"{}\"", shopping_list_filename(&expected))
    );
}

#[tokio::test]
async fn test_download_empty_cart_still_returns_pdf() {
    let t = setup();
    let (status, headers, body) = t
        .send(Method::GET, "/api/recipes/download_shopping_cart/", Some(&t.token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(b"%PDF-"));
    let disposition = headers[CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("shopping_list_"));
}

#[tokio::test]
async fn test_download_with_missing_font_is_server_error() {
    let t = setup_with_font_dir("/definitely/not/a/font/dir");
    let bread = t.recipe("Bread", 200, 3);
    t.store.add_to_list(ListKind::ShoppingCart, t.user_id, bread).unwrap();

    let (status, headers, body) = t
        .send(Method::GET, "/api/recipes/download_shopping_cart/", Some(&t.token), None)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers.get(CONTENT_DISPOSITION).is_none());
    assert_eq!(json_body(&body), json!({ "detail": "Internal server error" }));
}

#[tokio::test]
async fn test_download_requires_authentication() {
    let t = setup();
    let (status, _, _) = t
        .send(Method::GET, "/api/recipes/download_shopping_cart/", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = t
        .send(Method::GET, "/api/recipes/download_shopping_cart/", Some("wrong-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_duplicate_add_and_missing_remove() {
    let t = setup();
    let bread = t.recipe("Bread", 200, 3);
    let uri = format!("/api/recipes/{bread}/shopping_cart/");

    let (status, _, body) = t.send(Method::POST, &uri, Some(&t.token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json_body(&body), json!({ "id": bread, "name": "Bread", "cooking_time": 40 }));

    let (status, _, body) = t.send(Method::POST, &uri, Some(&t.token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&body),
        json!({ "errors": "Recipe is already in the shopping cart" })
    );

    let (status, _, _) = t.send(Method::DELETE, &uri, Some(&t.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = t.send(Method::DELETE, &uri, Some(&t.token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "errors": "Recipe is not in the shopping cart" }));
}

#[tokio::test]
async fn test_favorite_missing_recipe_is_not_found() {
    let t = setup();
    let (status, _, _) = t
        .send(Method::POST, "/api/recipes/999/favorite/", Some(&t.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_recipe_and_filter_by_cart() {
    let t = setup();
    let payload = json!({
        "ingredients": [{ "id": t.flour, "amount": 250 }, { "id": t.eggs, "amount": 2 }],
        "tags": [t.tag],
        "name": "Pancakes",
        "text": "Whisk and fry.",
        "cooking_time": 15
    });
    let (status, _, body) = t.send(Method::POST, "/api/recipes/", Some(&t.token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = json_body(&body);
    assert_eq!(created["author"]["username"], "cook");
    assert_eq!(created["ingredients"][0]["amount"], 250);
    let pancakes = created["id"].as_i64().unwrap();

    t.recipe("Bread", 200, 3);

    let (_, _, body) = t
        .send(Method::POST, &format!("/api/recipes/{pancakes}/shopping_cart/"), Some(&t.token), None)
        .await;
    assert_eq!(json_body(&body)["name"], "Pancakes");

    let (status, _, body) = t
        .send(Method::GET, "/api/recipes/?is_in_shopping_cart=1", Some(&t.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let page = json_body(&body);
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["name"], "Pancakes");
    assert_eq!(page["results"][0]["is_in_shopping_cart"], true);

    let (_, _, body) = t.send(Method::GET, "/api/recipes/?tags=baking", None, None).await;
    assert_eq!(json_body(&body)["count"], 2);
}

#[tokio::test]
async fn test_create_recipe_validation_error() {
    let t = setup();
    let payload = json!({
        "ingredients": [],
        "tags": [t.tag],
        "name": "Air",
        "text": "Nothing.",
        "cooking_time": 1
    });
    let (status, _, body) = t.send(Method::POST, "/api/recipes/", Some(&t.token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["errors"].is_string());
}

#[tokio::test]
async fn test_create_recipe_negative_amount_is_bad_request() {
    let t = setup();
    let payload = json!({
        "ingredients": [{ "id": t.flour, "amount": -5 }],
        "tags": [t.tag],
        "name": "Debt cake",
        "text": "Give flour back.",
        "cooking_time": 10
    });
    let (status, _, body) = t.send(Method::POST, "/api/recipes/", Some(&t.token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&body),
        json!({ "errors": format!("Amount for ingredient {} must be at least 1", t.flour) })
    );
}

#[tokio::test]
async fn test_negative_cooking_time_is_bad_request() {
    let t = setup();
    let payload = json!({
        "ingredients": [{ "id": t.flour, "amount": 100 }],
        "tags": [t.tag],
        "name": "Time travel",
        "text": "Done before you start.",
        "cooking_time": -1
    });
    let (status, _, body) = t.send(Method::POST, "/api/recipes/", Some(&t.token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "errors": "Cooking time must be at least 1 minute" }));

    let bread = t.recipe("Bread", 200, 3);
    let (status, _, body) = t
        .send(
            Method::PATCH,
            &format!("/api/recipes/{bread}/"),
            Some(&t.token),
            Some(json!({ "cooking_time": -1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["errors"].is_string());
}

#[tokio::test]
async fn test_malformed_recipe_body_is_bad_request() {
    let t = setup();
    let (status, _, body) = t
        .send_raw(
            Method::POST,
            "/api/recipes/",
            Some(&t.token),
            Some("{\"name\": \"Broken\",".to_string()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "errors": "Request body is not valid JSON" }));

    let (status, _, body) = t
        .send(Method::POST, "/api/recipes/", Some(&t.token), Some(json!({ "name": "No fields" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = json_body(&body)["errors"].as_str().unwrap().to_string();
    assert_eq!(errors, "Request body has missing or invalid fields");
    assert!(!errors.contains("deserialize"));
}

#[tokio::test]
async fn test_only_author_can_patch() {
    let t = setup();
    let bread = t.recipe("Bread", 200, 3);
    let uri = format!("/api/recipes/{bread}/");

    let (status, _, _) = t
        .send(Method::PATCH, &uri, Some(&t.other_token), Some(json!({ "name": "Stolen" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = t
        .send(Method::PATCH, &uri, Some(&t.token), Some(json!({ "name": "Rye bread" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["name"], "Rye bread");
}

#[tokio::test]
async fn test_ingredients_are_read_only() {
    let t = setup();
    let (status, _, body) = t.send(Method::GET, "/api/ingredients/?name=fl", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!([{ "id": t.flour, "name": "flour", "measurement_unit": "g" }]));

    let (status, _, _) = t
        .send(
            Method::POST,
            "/api/ingredients/",
            Some(&t.token),
            Some(json!({ "name": "salt", "measurement_unit": "g" })),
        )
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_tags_endpoints() {
    let t = setup();
    let (status, _, body) = t.send(Method::GET, "/api/tags/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)[0]["slug"], "baking");

    let (status, _, _) = t.send(Method::GET, "/api/tags/999/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
