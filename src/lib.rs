pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod grocery;
pub mod kitchen;
pub mod model;
pub mod reconciler;
pub mod store;
pub mod units;
pub mod worksheet;

pub use aggregator::{Aggregation, Aggregator, RecipeLookup, Warning};
pub use catalog::{IngredientCatalog, ValidationIssue};
pub use config::GampConfig;
pub use error::{GampError, ParseIssue};
pub use grocery::GroceryList;
pub use kitchen::{Kitchen, KitchenBuilder, RecipeReport, WorksheetResult};
pub use model::{
    DemandTable, InventoryEntry, InventoryTable, MealPlan, Recipe, ShortfallTable,
};
pub use reconciler::Reconciler;
pub use store::{parse_recipe, RecipeStore};
pub use units::{Dimension, Quantity, UnitRegistry};
pub use worksheet::Worksheet;

/// Sum the ingredient demand of a meal plan.
///
/// Bare numbers adopt `default_unit` when one is given.
pub fn aggregate<L>(
    registry: &UnitRegistry,
    plan: &MealPlan,
    lookup: &L,
    default_unit: Option<&str>,
) -> error::Result<Aggregation>
where
    L: RecipeLookup + ?Sized,
{
    let aggregator = Aggregator::new(registry);
    let aggregator = match default_unit {
        Some(unit) => aggregator.with_default_unit(unit)?,
        None => aggregator,
    };
    aggregator.aggregate(plan, lookup)
}

/// What is left to buy once `inventory` is subtracted from `demand`
pub fn reconcile(
    registry: &UnitRegistry,
    demand: &DemandTable,
    inventory: &InventoryTable,
) -> error::Result<ShortfallTable> {
    Reconciler::new(registry).reconcile(demand, inventory)
}

/// Every problem with `recipe`, without stopping at the first
pub fn validate(
    catalog: &IngredientCatalog,
    recipe: &Recipe,
    registry: &UnitRegistry,
) -> Vec<ValidationIssue> {
    catalog.validate(recipe, registry)
}
