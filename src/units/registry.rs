use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;

use super::quantity::split_magnitude;
use super::table::BUILTIN_UNITS;
use super::{Dimension, Quantity, DIMENSIONLESS};
use crate::error::{GampError, Result};

/// One entry of the unit table
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    pub symbol: String,
    pub dimension: Dimension,
    /// Size of one unit expressed in the dimension's canonical unit
    pub factor: f64,
}

/// Table of known units and aliases, with parsing and arithmetic on top.
///
/// Build it once, then share it by reference; nothing mutates it after setup.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDef>,
    aliases: HashMap<String, String>,
    canonical: HashMap<Dimension, String>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    /// Registry preloaded with the built-in mass, volume and count units
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (symbol, dimension, factor, aliases) in BUILTIN_UNITS {
            registry
                .insert_unit(symbol, Dimension::from(*dimension), *factor)
                .and_then(|_| {
                    aliases
                        .iter()
                        .try_for_each(|alias| registry.define_alias(alias, symbol))
                })
                .unwrap_or_else(|e| unreachable!("built-in unit table is consistent: {e}"));
        }
        registry
    }

    /// Registry with no units at all, not even the dimensionless one
    pub fn empty() -> Self {
        Self {
            units: HashMap::new(),
            aliases: HashMap::new(),
            canonical: HashMap::new(),
        }
    }

    /// Register a unit.
    ///
    /// `factor` is the size of one unit in the canonical unit of `dimension`.
    /// The first unit registered for a dimension becomes its canonical unit and
    /// must have a factor of 1.
    pub fn define_unit(
        &mut self,
        symbol: &str,
        dimension: Dimension,
        factor: f64,
    ) -> Result<()> {
        if symbol.trim() != symbol || symbol.is_empty() {
            return Err(GampError::UnitDefinition(format!(
                "unit symbol '{symbol}' must be non-empty without surrounding whitespace"
            )));
        }
        self.insert_unit(symbol, dimension, factor)
    }

    fn insert_unit(&mut self, symbol: &str, dimension: Dimension, factor: f64) -> Result<()> {
        if self.resolve(symbol).is_some() {
            return Err(GampError::UnitDefinition(format!(
                "'{symbol}' is already defined"
            )));
        }
        if !(factor.is_finite() && factor > 0.0) {
            return Err(GampError::UnitDefinition(format!(
                "factor of '{symbol}' must be a positive number, got {factor}"
            )));
        }
        if !self.canonical.contains_key(&dimension) {
            if factor != 1.0 {
                return Err(GampError::UnitDefinition(format!(
                    "'{symbol}' is the first {dimension} unit and must have factor 1"
                )));
            }
            self.canonical.insert(dimension.clone(), symbol.to_string());
        }

        debug!("Defined unit '{}' ({}, x{})", symbol, dimension, factor);
        self.units.insert(
            symbol.to_string(),
            UnitDef {
                symbol: symbol.to_string(),
                dimension,
                factor,
            },
        );
        Ok(())
    }

    /// Make `alias` resolve to the unit `target` (itself possibly an alias)
    pub fn define_alias(&mut self, alias: &str, target: &str) -> Result<()> {
        let symbol = self
            .resolve(target)
            .ok_or_else(|| GampError::InvalidUnit(target.to_string()))?
            .to_string();
        if alias.is_empty() || self.units.contains_key(alias) {
            return Err(GampError::UnitDefinition(format!(
                "alias '{alias}' would shadow a unit"
            )));
        }
        if let Some(existing) = self.aliases.get(alias) {
            if *existing != symbol {
                return Err(GampError::UnitDefinition(format!(
                    "alias '{alias}' already points to '{existing}'"
                )));
            }
        }
        self.aliases.insert(alias.to_string(), symbol);
        Ok(())
    }

    /// Canonical symbol for a unit symbol or alias. Case-sensitive.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some(def) = self.units.get(name) {
            return Some(&def.symbol);
        }
        self.aliases.get(name).map(String::as_str)
    }

    pub fn unit(&self, name: &str) -> Result<&UnitDef> {
        self.resolve(name)
            .and_then(|symbol| self.units.get(symbol))
            .ok_or_else(|| GampError::InvalidUnit(name.to_string()))
    }

    pub fn dimension_of(&self, name: &str) -> Result<&Dimension> {
        Ok(&self.unit(name)?.dimension)
    }

    pub fn canonical_unit(&self, dimension: &Dimension) -> Option<&str> {
        self.canonical.get(dimension).map(String::as_str)
    }

    /// Quantity of `magnitude` in `unit`, with the unit resolved and checked
    pub fn quantity(&self, magnitude: f64, unit: &str) -> Result<Quantity> {
        let def = self.unit(unit)?;
        Ok(Quantity::new(magnitude, def.symbol.as_str()))
    }

    pub fn zero(&self, unit: &str) -> Result<Quantity> {
        self.quantity(0.0, unit)
    }

    /// Parse `"2 cups"`, `"1 1/2 tbsp"`, `"250g"` or a bare `"3"`.
    ///
    /// A bare number is dimensionless.
    pub fn parse(&self, text: &str) -> Result<Quantity> {
        self.parse_inner(text, None)
    }

    /// Like [`parse`](Self::parse), but a bare number adopts `default_unit`
    pub fn parse_with_default(&self, text: &str, default_unit: &str) -> Result<Quantity> {
        let default_unit = self
            .resolve(default_unit)
            .ok_or_else(|| GampError::InvalidUnit(default_unit.to_string()))?;
        self.parse_inner(text, Some(default_unit))
    }

    fn parse_inner(&self, text: &str, default_unit: Option<&str>) -> Result<Quantity> {
        let (magnitude, unit_text) = split_magnitude(text)
            .ok_or_else(|| GampError::MalformedQuantity(text.trim().to_string()))?;

        if unit_text.is_empty() {
            let unit = match default_unit {
                Some(unit) => unit,
                None => self
                    .resolve(DIMENSIONLESS)
                    .ok_or_else(|| GampError::InvalidUnit(DIMENSIONLESS.to_string()))?,
            };
            return Ok(Quantity::new(magnitude, unit));
        }

        let unit = self
            .resolve(unit_text)
            .ok_or_else(|| GampError::InvalidUnit(unit_text.to_string()))?;
        Ok(Quantity::new(magnitude, unit))
    }

    /// Express `quantity` in `target`.
    ///
    /// Fails with [`GampError::IncompatibleDimension`] when the units belong to
    /// different dimensions.
    pub fn convert(&self, quantity: &Quantity, target: &str) -> Result<Quantity> {
        let source = self.unit(quantity.unit())?;
        let target = self.unit(target)?;

        if source.symbol == target.symbol {
            return Ok(quantity.clone());
        }
        if source.dimension != target.dimension {
            return Err(GampError::IncompatibleDimension {
                ingredient: None,
                from: source.symbol.clone(),
                to: target.symbol.clone(),
            });
        }

        Ok(Quantity::new(
            quantity.magnitude() * source.factor / target.factor,
            target.symbol.as_str(),
        ))
    }

    /// Sum of both quantities, in the unit of `lhs`
    pub fn add(&self, lhs: &Quantity, rhs: &Quantity) -> Result<Quantity> {
        let rhs = self.convert(rhs, lhs.unit())?;
        Ok(Quantity::new(lhs.magnitude() + rhs.magnitude(), lhs.unit()))
    }

    /// Difference `lhs - rhs`, in the unit of `lhs`
    pub fn sub(&self, lhs: &Quantity, rhs: &Quantity) -> Result<Quantity> {
        let rhs = self.convert(rhs, lhs.unit())?;
        Ok(Quantity::new(lhs.magnitude() - rhs.magnitude(), lhs.unit()))
    }

    pub fn compare(&self, lhs: &Quantity, rhs: &Quantity) -> Result<Ordering> {
        let rhs = self.convert(rhs, lhs.unit())?;
        Ok(lhs.magnitude().total_cmp(&rhs.magnitude()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_parse_resolves_aliases() {
        let registry = UnitRegistry::new();

        let quantity = registry.parse("2 cups").unwrap();
        assert_eq!(quantity.magnitude(), 2.0);
        assert_eq!(quantity.unit(), "cup");

        assert_eq!(registry.parse("1 tbs").unwrap().unit(), "tbsp");
        assert_eq!(registry.parse("1.5 L").unwrap().unit(), "l");
        assert_eq!(registry.parse("8 fl oz").unwrap().unit(), "floz");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let registry = UnitRegistry::new();

        assert!(matches!(
            registry.parse("2 CUPS"),
            Err(GampError::InvalidUnit(unit)) if unit == "CUPS"
        ));
    }

    #[test]
    fn test_parse_bare_number_is_dimensionless() {
        let registry = UnitRegistry::new();

        let quantity = registry.parse("3").unwrap();
        assert!(quantity.is_dimensionless());
        assert_eq!(registry.dimension_of(quantity.unit()).unwrap(), &Dimension::Count);
    }

    #[test]
    fn test_parse_with_default_only_applies_to_bare_numbers() {
        let registry = UnitRegistry::new();

        assert_eq!(registry.parse_with_default("3", "g").unwrap().unit(), "g");
        assert_eq!(registry.parse_with_default("3 cups", "g").unwrap().unit(), "cup");
        assert_eq!(registry.parse_with_default("3", "grams").unwrap().unit(), "g");
        assert!(matches!(
            registry.parse_with_default("3", "bushel"),
            Err(GampError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        let registry = UnitRegistry::new();

        assert!(matches!(
            registry.parse("2 handfuls"),
            Err(GampError::InvalidUnit(unit)) if unit == "handfuls"
        ));
        assert!(matches!(
            registry.parse("to taste"),
            Err(GampError::MalformedQuantity(_))
        ));
        assert!(matches!(registry.parse(""), Err(GampError::MalformedQuantity(_))));
    }

    #[test]
    fn test_convert_identity() {
        let registry = UnitRegistry::new();

        for text in ["2 cups", "0.3 kg", "7", "1 dozen", "12.5 ml"] {
            let quantity = registry.parse(text).unwrap();
            let converted = registry.convert(&quantity, quantity.unit()).unwrap();
            assert_eq!(converted, quantity);
        }
    }

    #[test]
    fn test_convert_within_dimension() {
        let registry = UnitRegistry::new();

        let kilos = registry.parse("0.3 kg").unwrap();
        let grams = registry.convert(&kilos, "g").unwrap();
        assert!(approx(grams.magnitude(), 300.0));
        assert_eq!(grams.unit(), "g");

        let tbsp = registry.parse("3 tsp").unwrap();
        assert!(approx(registry.convert(&tbsp, "tbsp").unwrap().magnitude(), 1.0));

        let dozen = registry.parse("2 dozen").unwrap();
        assert_eq!(registry.convert(&dozen, "").unwrap().magnitude(), 24.0);
    }

    #[test]
    fn test_convert_across_dimensions_fails() {
        let registry = UnitRegistry::new();
        let cups = registry.parse("1 cup").unwrap();

        match registry.convert(&cups, "g") {
            Err(GampError::IncompatibleDimension { ingredient, from, to }) => {
                assert_eq!(ingredient, None);
                assert_eq!(from, "cup");
                assert_eq!(to, "g");
            }
            other => panic!("Expected IncompatibleDimension, got {:?}", other),
        }
    }

    #[test]
    fn test_add_is_commutative_after_normalizing() {
        let registry = UnitRegistry::new();
        let pairs = [("2 cups", "100 ml"), ("1 lb", "250 g"), ("1 dozen", "3")];

        for (a, b) in pairs {
            let a = registry.parse(a).unwrap();
            let b = registry.parse(b).unwrap();
            let ab = registry.add(&a, &b).unwrap();
            let ba = registry.add(&b, &a).unwrap();
            let ab = registry.convert(&ab, ba.unit()).unwrap();
            assert!(approx(ab.magnitude(), ba.magnitude()));
        }
    }

    #[test]
    fn test_add_keeps_left_unit() {
        let registry = UnitRegistry::new();
        let sum = registry
            .add(&registry.parse("2 cups").unwrap(), &registry.parse("1 cup").unwrap())
            .unwrap();

        assert_eq!(sum.magnitude(), 3.0);
        assert_eq!(sum.unit(), "cup");
    }

    #[test]
    fn test_sub_and_compare() {
        let registry = UnitRegistry::new();
        let need = registry.parse("500 g").unwrap();
        let have = registry.parse("0.3 kg").unwrap();

        let diff = registry.sub(&need, &have).unwrap();
        assert!(approx(diff.magnitude(), 200.0));
        assert_eq!(diff.unit(), "g");
        assert_eq!(registry.compare(&need, &have).unwrap(), Ordering::Greater);
        assert!(registry.compare(&need, &registry.parse("1 cup").unwrap()).is_err());
    }

    #[test]
    fn test_define_custom_units() {
        let mut registry = UnitRegistry::new();
        registry.define_unit("stick", Dimension::Mass, 113.0).unwrap();
        registry.define_unit("can", Dimension::from("can"), 1.0).unwrap();
        registry.define_alias("cans", "can").unwrap();
        registry.define_alias("sticks", "stick").unwrap();

        let butter = registry.parse("2 sticks").unwrap();
        assert_eq!(registry.convert(&butter, "g").unwrap().magnitude(), 226.0);
        assert_eq!(registry.canonical_unit(&Dimension::from("can")), Some("can"));
        assert!(registry.convert(&registry.parse("1 cans").unwrap(), "g").is_err());
    }

    #[test]
    fn test_define_rejects_conflicts() {
        let mut registry = UnitRegistry::new();

        assert!(registry.define_unit("g", Dimension::Mass, 1.0).is_err());
        assert!(registry.define_unit("tbs", Dimension::Volume, 15.0).is_err());
        assert!(registry.define_unit("pinch", Dimension::Mass, 0.0).is_err());
        assert!(registry.define_unit("jar", Dimension::from("jar"), 2.0).is_err());
        assert!(registry.define_alias("cup", "ml").is_err());
        assert!(registry.define_alias("cups", "ml").is_err());
        assert!(registry.define_alias("handful", "nothing").is_err());
    }

    #[test]
    fn test_empty_registry_has_no_dimensionless_unit() {
        let registry = UnitRegistry::empty();

        assert!(matches!(registry.parse("3"), Err(GampError::InvalidUnit(_))));
    }
}
