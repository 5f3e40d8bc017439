use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::units::{Dimension, UnitRegistry};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct GampConfig {
    /// YAML list of valid ingredient names
    #[serde(default = "default_ingredients_path")]
    pub ingredients_path: PathBuf,
    /// Directory holding one YAML file per recipe
    #[serde(default = "default_recipe_dir")]
    pub recipe_dir: PathBuf,
    /// Unit for quantity literals written as a bare number.
    /// Bare numbers stay dimensionless when unset.
    #[serde(default)]
    pub default_unit: Option<String>,
    /// Extra spellings for known units
    #[serde(default)]
    pub aliases: Vec<AliasConfig>,
    /// Units added to the built-in table
    #[serde(default)]
    pub units: Vec<UnitConfig>,
}

/// A unit added to the registry
#[derive(Debug, Deserialize, Clone)]
pub struct UnitConfig {
    pub symbol: String,
    /// `mass`, `volume`, `count`, or the name of a new dimension
    pub dimension: Dimension,
    /// Size of one unit in the canonical unit of its dimension
    /// (`g`, `ml`, a bare count); a new dimension's first unit must use 1
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Another spelling for a known unit. Matched case-sensitively.
#[derive(Debug, Deserialize, Clone)]
pub struct AliasConfig {
    pub alias: String,
    pub unit: String,
}

impl Default for GampConfig {
    fn default() -> Self {
        Self {
            ingredients_path: default_ingredients_path(),
            recipe_dir: default_recipe_dir(),
            default_unit: None,
            aliases: Vec::new(),
            units: Vec::new(),
        }
    }
}

// Default value functions
fn default_ingredients_path() -> PathBuf {
    PathBuf::from("./ingredients.yaml")
}

fn default_recipe_dir() -> PathBuf {
    PathBuf::from("./recipes")
}

fn default_factor() -> f64 {
    1.0
}

impl GampConfig {
    /// Load configuration from `gamp.toml` and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with GAMP__ prefix
    /// 2. gamp.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: GAMP__DEFAULT_UNIT
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }

    /// Same as [`load`](Self::load) with an explicit, required config file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_config(Some(path.as_ref()))
    }

    /// Built-in units extended with the configured units and aliases
    pub fn registry(&self) -> Result<UnitRegistry> {
        let mut registry = UnitRegistry::new();
        for unit in &self.units {
            registry.define_unit(&unit.symbol, unit.dimension.clone(), unit.factor)?;
            for alias in &unit.aliases {
                registry.define_alias(alias, &unit.symbol)?;
            }
        }
        for AliasConfig { alias, unit } in &self.aliases {
            registry.define_alias(alias, unit)?;
        }
        Ok(registry)
    }
}

/// Load configuration from an optional file and environment variables
///
/// Without an explicit path `gamp.toml` in the current directory is used when
/// present. Environment variables use `__` between nested keys.
pub fn load_config(path: Option<&Path>) -> Result<GampConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("gamp").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("GAMP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let config = GampConfig::default();
        assert_eq!(config.ingredients_path, PathBuf::from("./ingredients.yaml"));
        assert_eq!(config.recipe_dir, PathBuf::from("./recipes"));
        assert!(config.default_unit.is_none());
        assert!(config.units.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
recipe_dir = "meals"
default_unit = "g"

[[aliases]]
alias = "Tbsp"
unit = "tbsp"

[[units]]
symbol = "stick"
dimension = "mass"
factor = 113.0
aliases = ["sticks"]

[[units]]
symbol = "can"
dimension = "can"
"#
        )
        .unwrap();

        let config = GampConfig::load_from(file.path()).unwrap();
        assert_eq!(config.recipe_dir, PathBuf::from("meals"));
        assert_eq!(config.ingredients_path, PathBuf::from("./ingredients.yaml"));
        assert_eq!(config.default_unit.as_deref(), Some("g"));
        assert_eq!(config.units[1].dimension, Dimension::from("can"));

        let registry = config.registry().unwrap();
        assert_eq!(registry.parse("2 Tbsp").unwrap().unit(), "tbsp");
        assert_eq!(
            registry
                .convert(&registry.parse("2 sticks").unwrap(), "g")
                .unwrap()
                .magnitude(),
            226.0
        );
        assert_eq!(registry.parse("3 can").unwrap().unit(), "can");
    }

    #[test]
    fn test_registry_rejects_bad_alias() {
        let mut config = GampConfig::default();
        config.aliases.push(AliasConfig {
            alias: "handful".to_string(),
            unit: "fistful".to_string(),
        });

        assert!(config.registry().is_err());
    }
}
