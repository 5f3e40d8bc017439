use log::debug;

use crate::error::Result;
use crate::model::{DemandTable, InventoryTable, ShortfallTable};
use crate::units::UnitRegistry;

/// Differences smaller than this fraction of the need count as covered
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Computes what is left to buy once recorded stock is taken into account
pub struct Reconciler<'a> {
    registry: &'a UnitRegistry,
}

impl<'a> Reconciler<'a> {
    pub fn new(registry: &'a UnitRegistry) -> Self {
        Self { registry }
    }

    /// `need - have` for every demanded ingredient where that is positive.
    ///
    /// Missing stock counts as zero. Stock is converted to the unit of the
    /// need, which is also the unit of the result; stock recorded for
    /// ingredients nobody needs is ignored.
    pub fn reconcile(
        &self,
        demand: &DemandTable,
        inventory: &InventoryTable,
    ) -> Result<ShortfallTable> {
        let mut shortfall = ShortfallTable::new();

        for (ingredient, need) in demand {
            let have = match inventory.get(ingredient) {
                Some(entry) => self
                    .registry
                    .convert(&entry.have, need.unit())
                    .map_err(|e| e.for_ingredient(ingredient))?,
                None => self.registry.zero(need.unit())?,
            };

            let missing = self
                .registry
                .sub(need, &have)
                .map_err(|e| e.for_ingredient(ingredient))?;
            if missing.magnitude() > need.magnitude().abs() * RELATIVE_TOLERANCE {
                shortfall.insert(ingredient.clone(), missing);
            } else {
                debug!("'{}' is covered: need {}, have {}", ingredient, need, have);
            }
        }

        Ok(shortfall)
    }
}
