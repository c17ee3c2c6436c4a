//! Per-user favorite and shopping-cart lists.

use rusqlite::{params, Connection, OptionalExtension};

use super::recipes::fetch_recipe;
use super::{Store, StoreError, StoreResult};
use crate::models::{LineItem, RecipeSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Favorite,
    ShoppingCart,
}

impl ListKind {
    fn table(self) -> &'static str {
        match self {
            ListKind::Favorite => "favorites",
            ListKind::ShoppingCart => "shopping_cart",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListKind::Favorite => "favorites",
            ListKind::ShoppingCart => "the shopping cart",
        }
    }
}

fn entry_exists(conn: &Connection, kind: ListKind, user_id: i64, recipe_id: i64) -> StoreResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE user_id = ?1 AND recipe_id = ?2", kind.table());
    Ok(conn
        .query_row(&sql, params![user_id, recipe_id], |_| Ok(()))
        .optional()?
        .is_some())
}

impl Store {
    /// Adds a recipe to one of the user's lists.
    ///
    /// Adding a recipe that is already on the list is an error, not a no-op.
    pub fn add_to_list(&self, kind: ListKind, user_id: i64, recipe_id: i64) -> StoreResult<RecipeSummary> {
        let conn = self.lock()?;
        let recipe = fetch_recipe(&conn, recipe_id, Some(user_id))?;
        if entry_exists(&conn, kind, user_id, recipe_id)? {
            return Err(StoreError::AlreadyListed(kind));
        }
        conn.execute(
            &format!("INSERT INTO {} (user_id, recipe_id) VALUES (?1, ?2)", kind.table()),
            params![user_id, recipe_id],
        )?;
        Ok(RecipeSummary::from(&recipe))
    }

    /// Removes a recipe from one of the user's lists; removing an absent entry is an error.
    pub fn remove_from_list(&self, kind: ListKind, user_id: i64, recipe_id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        fetch_recipe(&conn, recipe_id, Some(user_id))?;
        let removed = conn.execute(
            &format!("DELETE FROM {} WHERE user_id = ?1 AND recipe_id = ?2", kind.table()),
            params![user_id, recipe_id],
        )?;
        if removed == 0 {
            return Err(StoreError::NotListed(kind));
        }
        Ok(())
    }

    /// Every ingredient line of every recipe in the user's cart, in cart
    /// insertion order and then recipe ingredient order.
    pub fn cart_line_items(&self, user_id: i64) -> StoreResult<Vec<LineItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"SELECT i.name, i.measurement_unit, ri.amount
               FROM shopping_cart c
               JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
               JOIN ingredients i ON i.id = ri.ingredient_id
               WHERE c.user_id = ?1
               ORDER BY c.id, ri.id"#,
        )?;
        let items = stmt
            .query_map(params![user_id], |row| {
                Ok(LineItem {
                    name: row.get(0)?,
                    measurement_unit: row.get(1)?,
                    amount: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}
