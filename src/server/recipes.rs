use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Utc};
use tracing::info;

use super::auth::{CurrentUser, MaybeUser};
use super::body::ApiJson;
use super::{run_blocking, with_store, SharedState};
use crate::error::AppError;
use crate::models::{Page, Recipe, RecipeFilter, RecipeInput, RecipePatch, RecipeSummary};
use crate::shopping_list::{export_shopping_list, shopping_list_for_user, RenderOptions};
use crate::storage::ListKind;

fn parse_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid value for '{key}': {value}")))
}

/// Builds a recipe filter from raw query pairs. `tags` may repeat.
pub fn filter_from_query(pairs: &[(String, String)]) -> Result<RecipeFilter, AppError> {
    let mut filter = RecipeFilter::default();
    for (key, value) in pairs {
        match key.as_str() {
            "tags" => filter.tags.push(value.clone()),
            "author" => filter.author = Some(parse_number(key, value)?),
            "is_favorited" => filter.is_favorited = parse_flag(value),
            "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(value),
            "page" => filter.page = parse_number(key, value)?,
            "limit" => filter.limit = parse_number(key, value)?,
            _ => {}
        }
    }
    Ok(filter)
}

pub async fn list_recipes(
    State(state): State<SharedState>,
    viewer: MaybeUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<Recipe>>, AppError> {
    let filter = filter_from_query(&pairs)?;
    let viewer = viewer.id();
    let page = with_store(&state, move |store| store.recipes(&filter, viewer)).await?;
    Ok(Json(page))
}

pub async fn create_recipe(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<RecipeInput>,
) -> Result<(StatusCode, Json<Recipe>), AppError> {
    let recipe = with_store(&state, move |store| store.create_recipe(user.id, &input)).await?;
    info!("User {} created recipe {}", recipe.author.username, recipe.id);
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn get_recipe(
    State(state): State<SharedState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<Recipe>, AppError> {
    let viewer = viewer.id();
    let recipe = with_store(&state, move |store| store.recipe(id, viewer)).await?;
    Ok(Json(recipe))
}

pub async fn update_recipe(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<RecipePatch>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = with_store(&state, move |store| store.update_recipe(id, user.id, &patch)).await?;
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    with_store(&state, move |store| store.delete_recipe(id, user.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to_list(
    state: SharedState,
    kind: ListKind,
    user_id: i64,
    recipe_id: i64,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    let summary = with_store(&state, move |store| store.add_to_list(kind, user_id, recipe_id)).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn remove_from_list(
    state: SharedState,
    kind: ListKind,
    user_id: i64,
    recipe_id: i64,
) -> Result<StatusCode, AppError> {
    with_store(&state, move |store| store.remove_from_list(kind, user_id, recipe_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    add_to_list(state, ListKind::Favorite, user.id, id).await
}

pub async fn remove_favorite(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from_list(state, ListKind::Favorite, user.id, id).await
}

pub async fn add_to_cart(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    add_to_list(state, ListKind::ShoppingCart, user.id, id).await
}

pub async fn remove_from_cart(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from_list(state, ListKind::ShoppingCart, user.id, id).await
}

/// Aggregates the caller's cart and sends it back as a PDF attachment.
///
/// The document is rendered completely before anything is written, so a
/// failed render becomes a plain 500 and never a truncated download.
pub async fn download_shopping_cart(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let year = Utc::now().year();
    let username = user.username.clone();

    let export = run_blocking(move || {
        let list = shopping_list_for_user(&state.store, user.id)?;
        let options = RenderOptions {
            title: &state.config.list_title,
            font: &state.config.font,
            font_size: state.config.font_size,
            year,
        };
        Ok(export_shopping_list(&list, &state.fonts, &options)?)
    })
    .await?;

    info!(
        "Rendered {} ({} bytes) for user {username}",
        export.filename,
        export.bytes.len()
    );

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.bytes,
    )
        .into_response())
}
