use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{GampError, Result};
use crate::units::{Quantity, UnitRegistry};

/// Rating given to recipes whose definition omits one
pub const DEFAULT_RATING: i64 = 3;
pub const MAX_RATING: i64 = 3;

/// Summed requirement per ingredient for a meal plan
pub type DemandTable = BTreeMap<String, Quantity>;

/// What is still to buy per ingredient, positive entries only
pub type ShortfallTable = BTreeMap<String, Quantity>;

/// Recorded stock per ingredient, as read back from a worksheet
pub type InventoryTable = BTreeMap<String, InventoryEntry>;

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub have: Quantity,
    pub need: Quantity,
}

/// A named, rated list of ingredient quantities plus free-text steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub name: String,
    pub rating: i64,
    /// Ingredient name to quantity literal, in definition order
    pub ingredients: IndexMap<String, String>,
    pub steps: Vec<String>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rating: DEFAULT_RATING,
            ingredients: IndexMap::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_rating(mut self, rating: i64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_ingredient(mut self, name: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.ingredients.insert(name.into(), quantity.into());
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn has_valid_rating(&self) -> bool {
        (0..=MAX_RATING).contains(&self.rating)
    }

    /// Parse every quantity literal of the recipe.
    ///
    /// Unit-less literals adopt `default_unit` when given and stay
    /// dimensionless otherwise. The first literal that fails to parse aborts
    /// with the recipe and ingredient attached.
    pub fn ingredient_quantities(
        &self,
        registry: &UnitRegistry,
        default_unit: Option<&str>,
    ) -> Result<IndexMap<String, Quantity>> {
        self.ingredients
            .iter()
            .map(|(ingredient, text)| {
                let parsed = match default_unit {
                    Some(unit) => registry.parse_with_default(text, unit),
                    None => registry.parse(text),
                };
                parsed
                    .map(|quantity| (ingredient.clone(), quantity))
                    .map_err(|e| GampError::InRecipe {
                        recipe: self.name.clone(),
                        ingredient: ingredient.clone(),
                        source: Box::new(e),
                    })
            })
            .collect()
    }

    /// Recipe definition YAML that [`crate::parse_recipe`] reads back
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.rating, MAX_RATING)?;
        for (i, (ingredient, quantity)) in self.ingredients.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{ingredient} {quantity}")?;
        }
        Ok(())
    }
}

/// Ordered slots (a day, a meal, ...) each naming one recipe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealPlan {
    slots: IndexMap<String, String>,
}

impl MealPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML mapping of tag to recipe name. An empty document is an
    /// empty plan.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: Option<Mapping> = serde_yaml::from_str(text)?;
        let mut plan = MealPlan::new();
        for (tag, recipe) in raw.unwrap_or_default() {
            let tag = scalar_text(&tag)
                .ok_or_else(|| GampError::MealPlan(format!("tag {tag:?} is not a scalar")))?;
            let recipe = scalar_text(&recipe)
                .ok_or_else(|| GampError::MealPlan(format!("entry '{tag}' must name a recipe")))?;
            plan.insert(tag, recipe);
        }
        Ok(plan)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    /// Assign `recipe` to `tag`, replacing what the slot held before
    pub fn insert(&mut self, tag: impl Into<String>, recipe: impl Into<String>) {
        self.slots.insert(tag.into(), recipe.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots
            .iter()
            .map(|(tag, recipe)| (tag.as_str(), recipe.as_str()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Into<String>, R: Into<String>> FromIterator<(T, R)> for MealPlan {
    fn from_iter<I: IntoIterator<Item = (T, R)>>(iter: I) -> Self {
        let mut plan = MealPlan::new();
        for (tag, recipe) in iter {
            plan.insert(tag, recipe);
        }
        plan
    }
}

/// Text of a YAML scalar; numbers and booleans are rendered as written
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_display() {
        let recipe = Recipe::new("pancakes")
            .with_rating(2)
            .with_ingredient("flour", "2 cups")
            .with_ingredient("egg", "2");

        assert_eq!(recipe.to_string(), "pancakes (2/3): flour 2 cups, egg 2");
    }

    #[test]
    fn test_rating_range() {
        assert!(Recipe::new("a").has_valid_rating());
        assert!(Recipe::new("a").with_rating(0).has_valid_rating());
        assert!(!Recipe::new("a").with_rating(4).has_valid_rating());
        assert!(!Recipe::new("a").with_rating(-1).has_valid_rating());
    }

    #[test]
    fn test_ingredient_quantities_with_default_unit() {
        let registry = UnitRegistry::new();
        let recipe = Recipe::new("stew")
            .with_ingredient("beef", "500")
            .with_ingredient("stock", "2 cups");

        let plain = recipe.ingredient_quantities(&registry, None).unwrap();
        assert!(plain["beef"].is_dimensionless());

        let defaulted = recipe.ingredient_quantities(&registry, Some("g")).unwrap();
        assert_eq!(defaulted["beef"].unit(), "g");
        assert_eq!(defaulted["stock"].unit(), "cup");
    }

    #[test]
    fn test_ingredient_quantities_error_names_recipe_and_ingredient() {
        let registry = UnitRegistry::new();
        let recipe = Recipe::new("stew").with_ingredient("beef", "a lot");

        let err = recipe.ingredient_quantities(&registry, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Recipe 'stew', ingredient 'beef': Malformed quantity: 'a lot'"
        );
    }

    #[test]
    fn test_meal_plan_keeps_order_and_accepts_non_string_tags() {
        let plan = MealPlan::from_yaml_str(
            "monday: pasta\n1: soup\n2024-01-03: pasta\n",
        )
        .unwrap();

        let entries: Vec<_> = plan.iter().collect();
        assert_eq!(
            entries,
            vec![("monday", "pasta"), ("1", "soup"), ("2024-01-03", "pasta")]
        );
    }

    #[test]
    fn test_empty_meal_plan() {
        assert!(MealPlan::from_yaml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_meal_plan_rejects_nested_entries() {
        assert!(MealPlan::from_yaml_str("monday:\n  - pasta\n").is_err());
    }
}
