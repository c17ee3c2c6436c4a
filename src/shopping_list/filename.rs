use md5::{Digest, Md5};

use super::aggregator::ShoppingList;

const FILENAME_PREFIX: &str = "shopping_list_";
const HASH_LENGTH: usize = 5;

/// Short content fingerprint of a shopping list: the first five hex digits of
/// the MD5 of its canonical string form. Not an integrity check.
pub fn content_hash(list: &ShoppingList) -> String {
    let mut hasher = Md5::new();
    hasher.update(list.canonical_string().as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(HASH_LENGTH);
    hex
}

pub fn shopping_list_filename(list: &ShoppingList) -> String {
    format!("{FILENAME_PREFIX}{}.pdf", content_hash(list))
}
