use std::path::PathBuf;

use log::{info, warn};

use crate::aggregator::{Aggregator, Warning};
use crate::catalog::{IngredientCatalog, ValidationIssue};
use crate::config::GampConfig;
use crate::error::{GampError, ParseIssue, Result};
use crate::grocery::GroceryList;
use crate::model::{DemandTable, MealPlan, Recipe};
use crate::reconciler::Reconciler;
use crate::store::RecipeStore;
use crate::units::UnitRegistry;
use crate::worksheet::Worksheet;

/// Validation outcome of one stored recipe
#[derive(Debug, Clone)]
pub struct RecipeReport {
    pub recipe: String,
    pub path: Option<PathBuf>,
    pub issues: Vec<ValidationIssue>,
}

impl RecipeReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Worksheet generated for a meal plan plus the warnings raised on the way
#[derive(Debug, Clone)]
pub struct WorksheetResult {
    pub worksheet: Worksheet,
    pub warnings: Vec<Warning>,
}

/// Everything a run needs: units, valid ingredients and recipes.
///
/// Built once by the caller and passed by reference.
#[derive(Debug)]
pub struct Kitchen {
    registry: UnitRegistry,
    catalog: IngredientCatalog,
    store: RecipeStore,
    default_unit: Option<String>,
    load_issues: Vec<ParseIssue>,
}

impl Kitchen {
    /// Creates a new builder for a kitchen
    ///
    /// # Example
    /// ```
    /// use gamp::{Kitchen, Recipe};
    ///
    /// let kitchen = Kitchen::builder()
    ///     .recipe(Recipe::new("toast").with_ingredient("bread", "2"))
    ///     .ingredients(["bread"])
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(kitchen.recipes().len(), 1);
    /// ```
    pub fn builder() -> KitchenBuilder {
        KitchenBuilder::default()
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }

    pub fn recipes(&self) -> &RecipeStore {
        &self.store
    }

    pub fn default_unit(&self) -> Option<&str> {
        self.default_unit.as_deref()
    }

    /// Recipe files that could not be read while building
    pub fn load_issues(&self) -> &[ParseIssue] {
        &self.load_issues
    }

    /// Check every recipe against the catalog and the unit table
    ///
    /// # Errors
    /// [`crate::GampError::EmptyCatalog`] when no recipes are loaded.
    pub fn validate_recipes(&self) -> Result<Vec<RecipeReport>> {
        self.store.ensure_not_empty()?;

        Ok(self
            .store
            .stored()
            .map(|stored| RecipeReport {
                recipe: stored.recipe.name.clone(),
                path: stored.path.clone(),
                issues: self.catalog.validate(&stored.recipe, &self.registry),
            })
            .collect())
    }

    fn aggregator(&self) -> Result<Aggregator<'_>> {
        let aggregator = Aggregator::new(&self.registry);
        match &self.default_unit {
            Some(unit) => aggregator.with_default_unit(unit),
            None => Ok(aggregator),
        }
    }

    /// Demand of the meal plan as a worksheet with a blank `have` column
    pub fn worksheet(&self, plan: &MealPlan) -> Result<WorksheetResult> {
        let aggregation = self.aggregator()?.aggregate(plan, &self.store)?;
        info!(
            "Meal plan with {} slots needs {} ingredients",
            plan.len(),
            aggregation.demand.len()
        );

        Ok(WorksheetResult {
            worksheet: Worksheet::from_demand(&aggregation.demand),
            warnings: aggregation.warnings,
        })
    }

    /// What a filled-in worksheet says is still to buy
    pub fn grocery_list(&self, worksheet: &Worksheet) -> Result<GroceryList> {
        let inventory = worksheet.to_inventory(&self.registry)?;
        let demand: DemandTable = inventory
            .iter()
            .map(|(ingredient, entry)| (ingredient.clone(), entry.need.clone()))
            .collect();

        let shortfall = Reconciler::new(&self.registry).reconcile(&demand, &inventory)?;
        Ok(GroceryList::from_shortfall(&shortfall))
    }
}

/// Builder for configuring a [`Kitchen`]
///
/// Explicit recipes and ingredients are used as given; otherwise they are
/// loaded from the configured paths.
#[derive(Debug, Default)]
pub struct KitchenBuilder {
    config: GampConfig,
    registry: Option<UnitRegistry>,
    ingredients: Option<Vec<String>>,
    recipes: Option<Vec<Recipe>>,
}

impl KitchenBuilder {
    /// Take paths, default unit and unit definitions from a loaded configuration
    pub fn config(mut self, config: GampConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ingredients_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ingredients_path = path.into();
        self
    }

    pub fn recipe_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.recipe_dir = dir.into();
        self
    }

    pub fn default_unit(mut self, unit: impl Into<String>) -> Self {
        self.config.default_unit = Some(unit.into());
        self
    }

    /// Use this registry instead of one built from the configuration
    pub fn registry(mut self, registry: UnitRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use these ingredient names instead of loading the catalog file
    pub fn ingredients<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients
            .get_or_insert_with(Vec::new)
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a recipe; once any is added the recipe directory is not read
    pub fn recipe(mut self, recipe: Recipe) -> Self {
        self.recipes.get_or_insert_with(Vec::new).push(recipe);
        self
    }

    /// Add several recipes; passing none still keeps the directory unread
    pub fn recipes(mut self, recipes: impl IntoIterator<Item = Recipe>) -> Self {
        self.recipes.get_or_insert_with(Vec::new).extend(recipes);
        self
    }

    /// Build the kitchen, reading whatever was not given explicitly
    ///
    /// # Errors
    /// Returns an error if:
    /// - the configured units or aliases conflict
    /// - the default unit is unknown
    /// - the catalog file or recipe directory cannot be read
    pub fn build(self) -> Result<Kitchen> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => self.config.registry()?,
        };

        let default_unit = match &self.config.default_unit {
            Some(unit) => Some(
                registry
                    .resolve(unit)
                    .ok_or_else(|| GampError::InvalidUnit(unit.clone()))?
                    .to_string(),
            ),
            None => None,
        };

        let catalog = match self.ingredients {
            Some(names) => IngredientCatalog::new(names),
            None => IngredientCatalog::load(&self.config.ingredients_path)?,
        };

        let (store, load_issues) = match self.recipes {
            Some(recipes) => (recipes.into_iter().collect::<RecipeStore>(), Vec::new()),
            None => RecipeStore::load_dir(&self.config.recipe_dir)?,
        };
        for issue in &load_issues {
            warn!("{}", issue);
        }

        Ok(Kitchen {
            registry,
            catalog,
            store,
            default_unit,
            load_issues,
        })
    }
}
