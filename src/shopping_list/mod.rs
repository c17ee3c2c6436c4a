//! Shopping list: merge the ingredients of every recipe in a user's cart and
//! export the result as a PDF with a content-derived filename.

pub mod aggregator;
pub mod filename;
pub mod layout;
pub mod renderer;

pub use aggregator::{aggregate, AggregatedIngredient, ShoppingList};
pub use filename::shopping_list_filename;
pub use renderer::{render_shopping_list, FontSource, RenderError, RenderOptions};

use crate::storage::{Store, StoreResult};

/// Rendered shopping list ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ShoppingListExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Aggregates everything currently in the user's cart.
pub fn shopping_list_for_user(store: &Store, user_id: i64) -> StoreResult<ShoppingList> {
    let line_items = store.cart_line_items(user_id)?;
    Ok(aggregate(&line_items))
}

pub fn export_shopping_list(
    list: &ShoppingList,
    fonts: &FontSource,
    options: &RenderOptions<'_>,
) -> Result<ShoppingListExport, RenderError> {
    let bytes = render_shopping_list(list, fonts, options)?;
    Ok(ShoppingListExport {
        filename: shopping_list_filename(list),
        bytes,
    })
}
