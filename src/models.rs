use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// An ingredient as it appears inside a recipe, with the amount that recipe needs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

#[derive(Debug, Serialize, Clone)]
pub struct Recipe {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: User,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub text: String,
    pub cooking_time: u32,
    pub pub_date: DateTime<Utc>,
}

/// Short form returned when a recipe is added to favorites or the cart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub cooking_time: u32,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i64,
}

/// Recipe payload. Numbers are signed so that out-of-range values reach
/// validation instead of failing deserialization.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecipeInput {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RecipePatch {
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i64>>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Vec<String>,
    pub author: Option<i64>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize, Clone)]
pub struct Page<T> {
    pub count: u64,
    pub results: Vec<T>,
}

/// One (ingredient, unit, amount) fact drawn from a recipe in a user's cart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: u32) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}
