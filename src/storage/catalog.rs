//! Users, tags and the ingredient catalogue.

use rand::{distributions::Alphanumeric, Rng};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use super::{Store, StoreError, StoreResult};
use crate::models::{Ingredient, NewUser, Tag, User};

const TOKEN_LENGTH: usize = 40;

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        slug: row.get(3)?,
    })
}

fn ingredient_from_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        name: row.get(1)?,
        measurement_unit: row.get(2)?,
    })
}

pub(crate) fn fetch_user(conn: &Connection, id: i64) -> StoreResult<User> {
    conn.query_row(
        "SELECT id, username, email, first_name, last_name FROM users WHERE id = ?1",
        params![id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("User", id))
}

pub(crate) fn fetch_tags_for_recipe(conn: &Connection, recipe_id: i64) -> StoreResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        r#"SELECT t.id, t.name, t.color, t.slug
           FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
           WHERE rt.recipe_id = ?1
           ORDER BY t.id"#,
    )?;
    let tags = stmt
        .query_map(params![recipe_id], tag_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Store {
    /// Creates a user and returns it together with its freshly generated API token.
    pub fn create_user(&self, new_user: &NewUser) -> StoreResult<(User, String)> {
        let conn = self.lock()?;
        let token = generate_token();
        conn.execute(
            "INSERT INTO users (username, email, first_name, last_name, token) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new_user.username,
                new_user.email,
                new_user.first_name,
                new_user.last_name,
                token
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Invalid(format!(
                    "A user with username '{}' or email '{}' already exists",
                    new_user.username, new_user.email
                ))
            } else {
                e.into()
            }
        })?;
        let user = fetch_user(&conn, conn.last_insert_rowid())?;
        Ok((user, token))
    }

    pub fn user(&self, id: i64) -> StoreResult<User> {
        let conn = self.lock()?;
        fetch_user(&conn, id)
    }

    pub fn user_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                "SELECT id, username, email, first_name, last_name FROM users WHERE token = ?1",
                params![token],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_username(&self, username: &str) -> StoreResult<User> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, username, email, first_name, last_name FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("User", username))
    }

    pub fn create_tag(&self, name: &str, color: &str, slug: &str) -> StoreResult<Tag> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tags (name, color, slug) VALUES (?1, ?2, ?3)",
            params![name, color, slug],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Invalid(format!("Tag '{name}' or slug '{slug}' already exists"))
            } else {
                e.into()
            }
        })?;
        Ok(Tag {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            color: color.to_string(),
            slug: slug.to_string(),
        })
    }

    pub fn tags(&self) -> StoreResult<Vec<Tag>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, color, slug FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], tag_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    pub fn tag(&self, id: i64) -> StoreResult<Tag> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, color, slug FROM tags WHERE id = ?1",
            params![id],
            tag_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("Tag", id))
    }

    /// Inserts an ingredient unless the same (name, unit) pair already exists.
    ///
    /// Returns `true` when a row was actually added.
    pub fn insert_ingredient(&self, name: &str, measurement_unit: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO ingredients (name, measurement_unit) VALUES (?1, ?2)",
            params![name, measurement_unit],
        )?;
        Ok(changed > 0)
    }

    /// Lists ingredients, optionally restricted to names starting with `prefix`
    /// (case-insensitive for ASCII).
    pub fn ingredients(&self, prefix: Option<&str>) -> StoreResult<Vec<Ingredient>> {
        let conn = self.lock()?;
        let pattern = format!("{}%", escape_like(prefix.unwrap_or("")));
        let mut stmt = conn.prepare(
            r#"SELECT id, name, measurement_unit FROM ingredients
               WHERE name LIKE ?1 ESCAPE '\'
               ORDER BY name, id"#,
        )?;
        let ingredients = stmt
            .query_map(params![pattern], ingredient_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ingredients)
    }

    pub fn ingredient(&self, id: i64) -> StoreResult<Ingredient> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?1",
            params![id],
            ingredient_from_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("Ingredient", id))
    }
}
