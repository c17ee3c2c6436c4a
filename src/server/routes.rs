use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{with_store, SharedState};
use crate::error::AppError;
use crate::models::{Ingredient, Tag};

pub async fn list_tags(State(state): State<SharedState>) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = with_store(&state, |store| store.tags()).await?;
    Ok(Json(tags))
}

pub async fn get_tag(State(state): State<SharedState>, Path(id): Path<i64>) -> Result<Json<Tag>, AppError> {
    let tag = with_store(&state, move |store| store.tag(id)).await?;
    Ok(Json(tag))
}

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// Lists ingredients; `?name=` keeps those whose name starts with the given text.
pub async fn list_ingredients(
    State(state): State<SharedState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let ingredients = with_store(&state, move |store| store.ingredients(query.name.as_deref())).await?;
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Ingredient>, AppError> {
    let ingredient = with_store(&state, move |store| store.ingredient(id)).await?;
    Ok(Json(ingredient))
}
