use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::model::ShortfallTable;

/// Ingredients still to buy, as quantity text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroceryList {
    items: IndexMap<String, String>,
}

impl GroceryList {
    pub fn from_shortfall(shortfall: &ShortfallTable) -> Self {
        let items = shortfall
            .iter()
            .filter(|(_, quantity)| quantity.magnitude() > 0.0)
            .map(|(ingredient, quantity)| (ingredient.clone(), quantity.to_string()))
            .collect();
        Self { items }
    }

    pub fn get(&self, ingredient: &str) -> Option<&str> {
        self.items.get(ingredient).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .iter()
            .map(|(ingredient, quantity)| (ingredient.as_str(), quantity.as_str()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
