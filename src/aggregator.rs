//! Summing ingredient demand across a meal plan.
//!
//! Every slot of the plan contributes the full ingredient list of its recipe
//! (a recipe planned twice counts twice). Per ingredient the contributions are
//! brought to one unit:
//!
//! - if they all use the same unit, the demand keeps that unit;
//! - otherwise everything is converted to the canonical unit of the shared
//!   dimension (`g`, `ml`, or the bare count).
//!
//! Contributions are summed smallest first, so the demand table does not
//! depend on the order of the meal plan.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use log::{debug, warn};

use crate::error::{GampError, Result};
use crate::model::{DemandTable, MealPlan, Recipe};
use crate::units::{Quantity, UnitRegistry, DIMENSIONLESS};

/// Source of recipes by name
pub trait RecipeLookup {
    fn recipe(&self, name: &str) -> Option<&Recipe>;
}

impl RecipeLookup for HashMap<String, Recipe> {
    fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.get(name)
    }
}

impl RecipeLookup for BTreeMap<String, Recipe> {
    fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.get(name)
    }
}

/// Recoverable problem met while aggregating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A meal plan slot names a recipe the lookup does not know
    UnknownRecipe(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownRecipe(name) => write!(f, "unknown recipe: {name}"),
        }
    }
}

/// Demand table of one meal plan plus the warnings raised building it
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub demand: DemandTable,
    pub warnings: Vec<Warning>,
}

pub struct Aggregator<'a> {
    registry: &'a UnitRegistry,
    default_unit: Option<String>,
}

impl<'a> Aggregator<'a> {
    /// Aggregator that leaves unit-less literals dimensionless
    pub fn new(registry: &'a UnitRegistry) -> Self {
        Self {
            registry,
            default_unit: None,
        }
    }

    /// Unit-less literals such as `"3"` are read in `unit`.
    ///
    /// Fails with [`GampError::InvalidUnit`] when the registry does not know it.
    pub fn with_default_unit(mut self, unit: &str) -> Result<Self> {
        let symbol = self
            .registry
            .resolve(unit)
            .ok_or_else(|| GampError::InvalidUnit(unit.to_string()))?;
        self.default_unit = Some(symbol.to_string());
        Ok(self)
    }

    pub fn default_unit(&self) -> Option<&str> {
        self.default_unit.as_deref()
    }

    /// Sum the ingredient demand of every recipe the meal plan names.
    ///
    /// Unknown recipes are skipped with a warning. Unparseable literals and
    /// ingredients used with incompatible units abort the aggregation.
    pub fn aggregate<L>(&self, plan: &MealPlan, lookup: &L) -> Result<Aggregation>
    where
        L: RecipeLookup + ?Sized,
    {
        let mut contributions: BTreeMap<String, Vec<Quantity>> = BTreeMap::new();
        let mut warnings = Vec::new();

        for (tag, name) in plan.iter() {
            let Some(recipe) = lookup.recipe(name) else {
                warn!("Meal plan slot '{}' names unknown recipe '{}'", tag, name);
                warnings.push(Warning::UnknownRecipe(name.to_string()));
                continue;
            };

            debug!("Adding '{}' for slot '{}'", recipe.name, tag);
            let quantities = recipe.ingredient_quantities(self.registry, self.default_unit())?;
            for (ingredient, quantity) in quantities {
                contributions.entry(ingredient).or_default().push(quantity);
            }
        }

        let demand = contributions
            .into_iter()
            .map(|(ingredient, quantities)| {
                let total = self
                    .sum(&quantities)
                    .map_err(|e| e.for_ingredient(&ingredient))?;
                Ok((ingredient, total))
            })
            .collect::<Result<DemandTable>>()?;

        Ok(Aggregation { demand, warnings })
    }

    fn sum(&self, quantities: &[Quantity]) -> Result<Quantity> {
        let target = self.target_unit(quantities)?;

        let mut converted = quantities
            .iter()
            .map(|quantity| self.registry.convert(quantity, &target))
            .collect::<Result<Vec<_>>>()?;
        converted.sort_by(|a, b| a.magnitude().total_cmp(&b.magnitude()));

        let zero = self.registry.zero(&target)?;
        converted
            .iter()
            .try_fold(zero, |total, quantity| self.registry.add(&total, quantity))
    }

    /// Unit the contributions of one ingredient are summed in
    fn target_unit(&self, quantities: &[Quantity]) -> Result<String> {
        let units: BTreeSet<&str> = quantities.iter().map(Quantity::unit).collect();

        let mut iter = units.iter();
        let Some(first) = iter.next() else {
            return Ok(DIMENSIONLESS.to_string());
        };
        if units.len() == 1 {
            return Ok(first.to_string());
        }

        let dimension = self.registry.dimension_of(first)?;
        for unit in iter {
            if self.registry.dimension_of(unit)? != dimension {
                return Err(GampError::IncompatibleDimension {
                    ingredient: None,
                    from: first.to_string(),
                    to: unit.to_string(),
                });
            }
        }

        self.registry
            .canonical_unit(dimension)
            .map(str::to_string)
            .ok_or_else(|| GampError::InvalidUnit(dimension.to_string()))
    }
}
