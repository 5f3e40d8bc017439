use thiserror::Error;

/// Errors that can occur while parsing quantities, loading definitions
/// or computing demand and shortfall tables
#[derive(Error, Debug)]
pub enum GampError {
    /// Unit symbol is not in the registry
    #[error("Invalid unit: '{0}'")]
    InvalidUnit(String),

    /// Conversion or arithmetic across units of different dimensions
    #[error("{}", describe_mismatch(.ingredient.as_deref(), .from, .to))]
    IncompatibleDimension {
        ingredient: Option<String>,
        from: String,
        to: String,
    },

    /// Unit table entry or alias cannot be registered
    #[error("Invalid unit definition: {0}")]
    UnitDefinition(String),

    /// Text cannot be read as a number or a number followed by a unit
    #[error("Malformed quantity: '{0}'")]
    MalformedQuantity(String),

    /// Failure while reading one ingredient of one recipe
    #[error("Recipe '{recipe}', ingredient '{ingredient}': {source}")]
    InRecipe {
        recipe: String,
        ingredient: String,
        #[source]
        source: Box<GampError>,
    },

    /// An operation needs at least one recipe but none were loaded
    #[error("No recipes found")]
    EmptyCatalog,

    /// Recipe definition failed schema validation
    #[error(transparent)]
    Parse(#[from] ParseIssue),

    /// Meal plan document is not a mapping of tag to recipe name
    #[error("Invalid meal plan: {0}")]
    MealPlan(String),

    /// Inventory worksheet is malformed
    #[error("Worksheet line {line}: {message}")]
    Worksheet { line: usize, message: String },

    /// Two worksheet rows name the same ingredient
    #[error("Ingredient '{0}' is listed more than once")]
    DuplicateIngredient(String),

    /// A worksheet row whose quantities cannot be read
    #[error("Worksheet row '{ingredient}': {source}")]
    WorksheetRow {
        ingredient: String,
        #[source]
        source: Box<GampError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl GampError {
    /// Attach an ingredient name to a dimension mismatch that has none yet
    pub fn for_ingredient(self, name: &str) -> Self {
        match self {
            GampError::IncompatibleDimension {
                ingredient: None,
                from,
                to,
            } => GampError::IncompatibleDimension {
                ingredient: Some(name.to_string()),
                from,
                to,
            },
            other => other,
        }
    }
}

fn describe_mismatch(ingredient: Option<&str>, from: &str, to: &str) -> String {
    let from = display_unit(from);
    let to = display_unit(to);
    match ingredient {
        Some(name) => format!("Incompatible units for '{name}': {from} and {to}"),
        None => format!("Incompatible units: {from} and {to}"),
    }
}

fn display_unit(unit: &str) -> &str {
    if unit.is_empty() {
        "(dimensionless)"
    } else {
        unit
    }
}

/// A recipe definition that could not be read into a [`crate::Recipe`]
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid recipe '{origin}': {message}")]
pub struct ParseIssue {
    /// Source identifier, usually the file stem
    pub origin: String,
    pub message: String,
}

impl ParseIssue {
    pub fn new(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = GampError> = std::result::Result<T, E>;
