use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::LineItem;

/// Identity under which cart lines are merged.
///
/// The unit is part of the key: "flour" in grams and "flour" in cups stay on
/// separate lines instead of being summed into a meaningless number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngredientKey {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AggregatedIngredient {
    pub name: String,
    pub measurement_unit: String,
    pub amount: u64,
}

/// Summed ingredient amounts for everything in a cart, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingList {
    items: IndexMap<IngredientKey, u64>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one line. A new ingredient is appended at the end; a known one
    /// keeps its position and accumulates the amount.
    pub fn add(&mut self, item: &LineItem) {
        let key = IngredientKey {
            name: item.name.clone(),
            measurement_unit: item.measurement_unit.clone(),
        };
        *self.items.entry(key).or_insert(0) += u64::from(item.amount);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn amount_of(&self, name: &str, measurement_unit: &str) -> Option<u64> {
        self.items
            .iter()
            .find(|(key, _)| key.name == name && key.measurement_unit == measurement_unit)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = AggregatedIngredient> + '_ {
        self.items.iter().map(|(key, amount)| AggregatedIngredient {
            name: key.name.clone(),
            measurement_unit: key.measurement_unit.clone(),
            amount: *amount,
        })
    }

    /// Canonical string form: a JSON array of the entries in list order.
    pub fn canonical_string(&self) -> String {
        let entries: Vec<AggregatedIngredient> = self.iter().collect();
        serde_json::to_string(&entries).unwrap_or_default()
    }
}

impl<'a> FromIterator<&'a LineItem> for ShoppingList {
    fn from_iter<I: IntoIterator<Item = &'a LineItem>>(iter: I) -> Self {
        let mut list = ShoppingList::new();
        for item in iter {
            list.add(item);
        }
        list
    }
}

/// Merges cart line-items into a shopping list.
pub fn aggregate(line_items: &[LineItem]) -> ShoppingList {
    line_items.iter().collect()
}
