//! Recipe CRUD and listing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};

use super::catalog::{fetch_tags_for_recipe, fetch_user};
use super::{Store, StoreError, StoreResult};
use crate::models::{IngredientAmount, Page, Recipe, RecipeFilter, RecipeIngredient, RecipeInput, RecipePatch};

pub const DEFAULT_PAGE_SIZE: u32 = 6;
/// Upper bound for ingredient amounts and cooking times.
pub const MAX_QUANTITY: i64 = 32_767;

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::Invalid(message.into())
}

fn validate(conn: &Connection, input: &RecipeInput) -> StoreResult<()> {
    if input.name.trim().is_empty() {
        return Err(invalid("Recipe name must not be empty"));
    }
    if input.text.trim().is_empty() {
        return Err(invalid("Recipe text must not be empty"));
    }
    if input.cooking_time < 1 {
        return Err(invalid("Cooking time must be at least 1 minute"));
    }
    if input.cooking_time > MAX_QUANTITY {
        return Err(invalid(format!("Cooking time must not exceed {MAX_QUANTITY} minutes")));
    }

    if input.ingredients.is_empty() {
        return Err(invalid("A recipe needs at least one ingredient"));
    }
    let mut seen = HashSet::new();
    for item in &input.ingredients {
        if item.amount < 1 {
            return Err(invalid(format!("Amount for ingredient {} must be at least 1", item.id)));
        }
        if item.amount > MAX_QUANTITY {
            return Err(invalid(format!(
                "Amount for ingredient {} must not exceed {MAX_QUANTITY}",
                item.id
            )));
        }
        if !seen.insert(item.id) {
            return Err(invalid(format!("Ingredient {} is listed more than once", item.id)));
        }
        if !row_exists(conn, "SELECT 1 FROM ingredients WHERE id = ?1", item.id)? {
            return Err(invalid(format!("Ingredient {} does not exist", item.id)));
        }
    }

    if input.tags.is_empty() {
        return Err(invalid("A recipe needs at least one tag"));
    }
    let mut seen = HashSet::new();
    for tag_id in &input.tags {
        if !seen.insert(*tag_id) {
            return Err(invalid(format!("Tag {tag_id} is listed more than once")));
        }
        if !row_exists(conn, "SELECT 1 FROM tags WHERE id = ?1", *tag_id)? {
            return Err(invalid(format!("Tag {tag_id} does not exist")));
        }
    }

    Ok(())
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> StoreResult<bool> {
    Ok(conn.query_row(sql, params![id], |_| Ok(())).optional()?.is_some())
}

fn write_ingredients(conn: &Connection, recipe_id: i64, ingredients: &[IngredientAmount]) -> StoreResult<()> {
    conn.execute("DELETE FROM recipe_ingredients WHERE recipe_id = ?1", params![recipe_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?1, ?2, ?3)",
    )?;
    for item in ingredients {
        stmt.execute(params![recipe_id, item.id, item.amount])?;
    }
    Ok(())
}

fn write_tags(conn: &Connection, recipe_id: i64, tags: &[i64]) -> StoreResult<()> {
    conn.execute("DELETE FROM recipe_tags WHERE recipe_id = ?1", params![recipe_id])?;
    let mut stmt = conn.prepare("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)")?;
    for tag_id in tags {
        stmt.execute(params![recipe_id, tag_id])?;
    }
    Ok(())
}

fn fetch_recipe_ingredients(conn: &Connection, recipe_id: i64) -> StoreResult<Vec<RecipeIngredient>> {
    let mut stmt = conn.prepare(
        r#"SELECT i.id, i.name, i.measurement_unit, ri.amount
           FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id
           WHERE ri.recipe_id = ?1
           ORDER BY ri.id"#,
    )?;
    let ingredients = stmt
        .query_map(params![recipe_id], |row| {
            Ok(RecipeIngredient {
                id: row.get(0)?,
                name: row.get(1)?,
                measurement_unit: row.get(2)?,
                amount: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ingredients)
}

fn is_listed(conn: &Connection, table: &str, user_id: Option<i64>, recipe_id: i64) -> StoreResult<bool> {
    let Some(user_id) = user_id else {
        return Ok(false);
    };
    let sql = format!("SELECT 1 FROM {table} WHERE user_id = ?1 AND recipe_id = ?2");
    Ok(conn
        .query_row(&sql, params![user_id, recipe_id], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Loads a recipe with its author, tags, ingredients and the viewer's list flags.
pub(crate) fn fetch_recipe(conn: &Connection, id: i64, viewer: Option<i64>) -> StoreResult<Recipe> {
    let base = conn
        .query_row(
            "SELECT author_id, name, text, cooking_time, pub_date FROM recipes WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, DateTime<Utc>>(4)?,
                ))
            },
        )
        .optional()?;
    let Some((author_id, name, text, cooking_time, pub_date)) = base else {
        return Err(StoreError::not_found("Recipe", id));
    };

    Ok(Recipe {
        id,
        tags: fetch_tags_for_recipe(conn, id)?,
        author: fetch_user(conn, author_id)?,
        ingredients: fetch_recipe_ingredients(conn, id)?,
        is_favorited: is_listed(conn, "favorites", viewer, id)?,
        is_in_shopping_cart: is_listed(conn, "shopping_cart", viewer, id)?,
        name,
        text,
        cooking_time,
        pub_date,
    })
}

fn fetch_author_id(conn: &Connection, id: i64) -> StoreResult<i64> {
    conn.query_row("SELECT author_id FROM recipes WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?
        .ok_or_else(|| StoreError::not_found("Recipe", id))
}

impl Store {
    pub fn create_recipe(&self, author_id: i64, input: &RecipeInput) -> StoreResult<Recipe> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        validate(&tx, input)?;

        tx.execute(
            "INSERT INTO recipes (author_id, name, text, cooking_time, pub_date) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![author_id, input.name.trim(), input.text, input.cooking_time, Utc::now()],
        )?;
        let recipe_id = tx.last_insert_rowid();
        write_ingredients(&tx, recipe_id, &input.ingredients)?;
        write_tags(&tx, recipe_id, &input.tags)?;

        let recipe = fetch_recipe(&tx, recipe_id, Some(author_id))?;
        tx.commit()?;
        Ok(recipe)
    }

    pub fn recipe(&self, id: i64, viewer: Option<i64>) -> StoreResult<Recipe> {
        let conn = self.lock()?;
        fetch_recipe(&conn, id, viewer)
    }

    /// Lists recipes newest first, filtered and paginated.
    ///
    /// `is_favorited` / `is_in_shopping_cart` only make sense for a known
    /// viewer; an anonymous caller asking for them gets an empty page.
    pub fn recipes(&self, filter: &RecipeFilter, viewer: Option<i64>) -> StoreResult<Page<Recipe>> {
        let conn = self.lock()?;

        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if !filter.tags.is_empty() {
            let placeholders = vec!["?"; filter.tags.len()].join(", ");
            clauses.push(format!(
                "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN ({placeholders}))"
            ));
            values.extend(filter.tags.iter().cloned().map(Value::Text));
        }
        if let Some(author) = filter.author {
            clauses.push("r.author_id = ?".to_string());
            values.push(Value::Integer(author));
        }
        for (wanted, table) in [
            (filter.is_favorited, "favorites"),
            (filter.is_in_shopping_cart, "shopping_cart"),
        ] {
            if !wanted {
                continue;
            }
            let Some(user_id) = viewer else {
                return Ok(Page { count: 0, results: Vec::new() });
            };
            clauses.push(format!("r.id IN (SELECT recipe_id FROM {table} WHERE user_id = ?)"));
            values.push(Value::Integer(user_id));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM recipes r {where_sql}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let limit = if filter.limit == 0 { DEFAULT_PAGE_SIZE } else { filter.limit };
        let page = filter.page.max(1);
        values.push(Value::Integer(i64::from(limit)));
        values.push(Value::Integer(i64::from(page - 1) * i64::from(limit)));

        let mut stmt = conn.prepare(&format!(
            "SELECT r.id FROM recipes r {where_sql} ORDER BY r.pub_date DESC, r.id DESC LIMIT ? OFFSET ?"
        ))?;
        let ids = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let results = ids
            .into_iter()
            .map(|id| fetch_recipe(&conn, id, viewer))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page {
            count: count as u64,
            results,
        })
    }

    /// Applies a partial update. Only the author may change a recipe.
    pub fn update_recipe(&self, id: i64, user_id: i64, patch: &RecipePatch) -> StoreResult<Recipe> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let current = fetch_recipe(&tx, id, Some(user_id))?;
        if current.author.id != user_id {
            return Err(StoreError::NotAuthor(id));
        }

        let merged = RecipeInput {
            ingredients: patch.ingredients.clone().unwrap_or_else(|| {
                current
                    .ingredients
                    .iter()
                    .map(|i| IngredientAmount {
                        id: i.id,
                        amount: i64::from(i.amount),
                    })
                    .collect()
            }),
            tags: patch
                .tags
                .clone()
                .unwrap_or_else(|| current.tags.iter().map(|t| t.id).collect()),
            name: patch.name.clone().unwrap_or(current.name),
            text: patch.text.clone().unwrap_or(current.text),
            cooking_time: patch.cooking_time.unwrap_or(i64::from(current.cooking_time)),
        };
        validate(&tx, &merged)?;

        tx.execute(
            "UPDATE recipes SET name = ?1, text = ?2, cooking_time = ?3 WHERE id = ?4",
            params![merged.name.trim(), merged.text, merged.cooking_time, id],
        )?;
        if patch.ingredients.is_some() {
            write_ingredients(&tx, id, &merged.ingredients)?;
        }
        if patch.tags.is_some() {
            write_tags(&tx, id, &merged.tags)?;
        }

        let recipe = fetch_recipe(&tx, id, Some(user_id))?;
        tx.commit()?;
        Ok(recipe)
    }

    pub fn delete_recipe(&self, id: i64, user_id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        if fetch_author_id(&conn, id)? != user_id {
            return Err(StoreError::NotAuthor(id));
        }
        conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
        Ok(())
    }
}
