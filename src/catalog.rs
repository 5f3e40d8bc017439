use std::fmt;
use std::path::Path;

use indexmap::IndexSet;
use log::{info, warn};

use crate::error::Result;
use crate::model::Recipe;
use crate::units::UnitRegistry;

/// One problem found in a recipe
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    UnknownIngredient(String),
    /// Ingredient name and the literal that failed to parse
    InvalidQuantity(String, String),
    RatingOutOfRange(i64),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::UnknownIngredient(name) => write!(f, "invalid ingredient: {name}"),
            ValidationIssue::InvalidQuantity(name, text) => {
                write!(f, "invalid quantity for {name}: '{text}'")
            }
            ValidationIssue::RatingOutOfRange(value) => {
                write!(f, "rating {value} is outside 0..=3")
            }
        }
    }
}

/// The authoritative, ordered set of ingredient names
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    names: IndexSet<String>,
}

impl IngredientCatalog {
    /// Build from names; repeated names are dropped, first occurrence wins
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for name in names {
            let name = name.into();
            if catalog.names.contains(&name) {
                warn!("Ingredient '{}' is listed more than once", name);
                continue;
            }
            catalog.names.insert(name);
        }
        catalog
    }

    /// Parse a YAML list of strings
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let names: Option<Vec<String>> = serde_yaml::from_str(text)?;
        Ok(Self::new(names.unwrap_or_default()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let catalog = Self::from_yaml_str(&std::fs::read_to_string(path)?)?;
        info!(
            "Loaded {} ingredients from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Every problem with `recipe`, in a stable order: the rating first, then
    /// each ingredient in definition order. Never stops at the first issue.
    pub fn validate(&self, recipe: &Recipe, registry: &UnitRegistry) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !recipe.has_valid_rating() {
            issues.push(ValidationIssue::RatingOutOfRange(recipe.rating));
        }

        for (name, text) in &recipe.ingredients {
            if !self.is_known(name) {
                issues.push(ValidationIssue::UnknownIngredient(name.clone()));
            }
            if registry.parse(text).is_err() {
                issues.push(ValidationIssue::InvalidQuantity(name.clone(), text.clone()));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> IngredientCatalog {
        IngredientCatalog::new(["flour", "sugar", "egg"])
    }

    #[test]
    fn test_is_known_is_case_sensitive() {
        let catalog = catalog();

        assert!(catalog.is_known("flour"));
        assert!(!catalog.is_known("Flour"));
        assert!(!catalog.is_known("butter"));
    }

    #[test]
    fn test_duplicates_are_dropped_in_order() {
        let catalog = IngredientCatalog::from_yaml_str("- salt\n- pepper\n- salt\n").unwrap();

        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["salt", "pepper"]);
    }

    #[test]
    fn test_catalog_rejects_non_string_entries() {
        assert!(IngredientCatalog::from_yaml_str("- salt\n- [a, b]\n").is_err());
    }

    #[test]
    fn test_valid_recipe_has_no_issues() {
        let registry = UnitRegistry::new();
        let recipe = Recipe::new("cake")
            .with_ingredient("flour", "2 cups")
            .with_ingredient("egg", "3");

        assert!(catalog().validate(&recipe, &registry).is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let registry = UnitRegistry::new();
        let recipe = Recipe::new("cake")
            .with_rating(5)
            .with_ingredient("flour", "2 cups")
            .with_ingredient("butter", "100 g")
            .with_ingredient("sugar", "a handful")
            .with_ingredient("vanilla", "2 drops");

        let issues = catalog().validate(&recipe, &registry);

        assert_eq!(
            issues,
            vec![
                ValidationIssue::RatingOutOfRange(5),
                ValidationIssue::UnknownIngredient("butter".to_string()),
                ValidationIssue::InvalidQuantity("sugar".to_string(), "a handful".to_string()),
                ValidationIssue::UnknownIngredient("vanilla".to_string()),
                ValidationIssue::InvalidQuantity("vanilla".to_string(), "2 drops".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_does_not_mutate_recipe() {
        let registry = UnitRegistry::new();
        let recipe = Recipe::new("cake").with_ingredient("butter", "1");
        let before = recipe.clone();

        let _ = catalog().validate(&recipe, &registry);
        assert_eq!(recipe, before);
    }
}
