//! Units, quantities and the registry that relates them.
//!
//! Every [`Quantity`] carries the canonical symbol of a unit known to a
//! [`UnitRegistry`]. Aliases (`cups`, `tbs`, `L`, ...) are resolved when text
//! is parsed, so two quantities in the same unit always carry the same symbol.
//! Quantities of the same [`Dimension`] convert through a fixed factor
//! relative to the dimension's canonical unit.

mod quantity;
mod registry;
mod table;

use std::fmt;

use serde::Deserialize;

pub use quantity::Quantity;
pub use registry::{UnitDef, UnitRegistry};

/// Symbol of the unit that bare numbers carry
pub const DIMENSIONLESS: &str = "";

/// Physical kind of a unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub enum Dimension {
    Mass,
    Volume,
    /// Plain counts, including bare numbers
    Count,
    /// A family of units declared in configuration (cans, sticks, ...)
    Custom(String),
}

impl Dimension {
    pub fn name(&self) -> &str {
        match self {
            Dimension::Mass => "mass",
            Dimension::Volume => "volume",
            Dimension::Count => "count",
            Dimension::Custom(name) => name,
        }
    }
}

impl From<&str> for Dimension {
    fn from(name: &str) -> Self {
        match name {
            "mass" => Dimension::Mass,
            "volume" => Dimension::Volume,
            "count" => Dimension::Count,
            other => Dimension::Custom(other.to_string()),
        }
    }
}

impl From<String> for Dimension {
    fn from(name: String) -> Self {
        Dimension::from(name.as_str())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
