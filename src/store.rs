//! Recipe definitions and the in-memory store they are loaded into.
//!
//! A definition is a YAML mapping:
//!
//! ```yaml
//! rating: 2
//! ingredients:
//!   flour: 2 cups
//!   egg: 3
//! steps:
//!   - Mix
//!   - Bake
//! ```
//!
//! The recipe name is the optional `name` field, otherwise the source
//! identifier (the file stem when loading a directory). Files written by
//! older versions start with a `!recipe` tag, which is accepted and ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_yaml::Value;

use crate::aggregator::RecipeLookup;
use crate::error::{GampError, ParseIssue, Result};
use crate::model::{scalar_text, Recipe, DEFAULT_RATING};

const LEGACY_TAG: &str = "!recipe";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeDefinition {
    name: Option<String>,
    rating: Option<i64>,
    #[serde(default)]
    ingredients: IndexMap<String, Value>,
    #[serde(default)]
    steps: Vec<String>,
}

/// Parse one recipe definition.
///
/// `origin` names the definition in issues and becomes the recipe name when
/// the definition has no `name` field.
pub fn parse_recipe(origin: &str, text: &str) -> std::result::Result<Recipe, ParseIssue> {
    let body = strip_legacy_tag(text);
    let definition: RecipeDefinition =
        serde_yaml::from_str(body).map_err(|e| ParseIssue::new(origin, e.to_string()))?;

    let mut ingredients = IndexMap::with_capacity(definition.ingredients.len());
    for (ingredient, literal) in definition.ingredients {
        let literal = scalar_text(&literal).ok_or_else(|| {
            ParseIssue::new(
                origin,
                format!("quantity of '{ingredient}' must be a string or a number"),
            )
        })?;
        ingredients.insert(ingredient, literal);
    }

    let name = match definition.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => origin.to_string(),
    };

    Ok(Recipe {
        name,
        rating: definition.rating.unwrap_or(DEFAULT_RATING),
        ingredients,
        steps: definition.steps,
    })
}

fn strip_legacy_tag(text: &str) -> &str {
    let trimmed = text.trim_start();
    let trimmed = trimmed.strip_prefix("---").unwrap_or(trimmed).trim_start();
    match trimmed.strip_prefix(LEGACY_TAG) {
        // "!recipe" must be a whole token, not the start of "!recipes"
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => text,
    }
}

/// A loaded recipe and where it came from
#[derive(Debug, Clone)]
pub struct StoredRecipe {
    pub path: Option<PathBuf>,
    pub recipe: Recipe,
}

/// Recipes keyed by name
#[derive(Debug, Clone, Default)]
pub struct RecipeStore {
    recipes: BTreeMap<String, StoredRecipe>,
}

impl RecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.yaml`/`*.yml` file of `dir`, in file name order.
    ///
    /// Definitions that fail to parse are returned as issues and skipped; only
    /// I/O failures abort the load.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<(Self, Vec<ParseIssue>)> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.retain(|path| {
            path.is_file()
                && matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("yaml" | "yml")
                )
        });
        paths.sort();

        let mut store = Self::new();
        let mut issues = Vec::new();
        for path in paths {
            let origin = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = std::fs::read_to_string(&path)?;

            match parse_recipe(&origin, &text) {
                Ok(recipe) => {
                    debug!("Loaded recipe '{}' from {}", recipe.name, path.display());
                    store.insert_from(recipe, Some(path));
                }
                Err(issue) => {
                    warn!("Skipping {}: {}", path.display(), issue.message);
                    issues.push(issue);
                }
            }
        }

        info!("Loaded {} recipes from {}", store.len(), dir.display());
        Ok((store, issues))
    }

    pub fn insert(&mut self, recipe: Recipe) {
        self.insert_from(recipe, None);
    }

    fn insert_from(&mut self, recipe: Recipe, path: Option<PathBuf>) {
        if let Some(previous) = self.recipes.get(&recipe.name) {
            warn!(
                "Recipe '{}' defined more than once, {} replaces {}",
                recipe.name,
                describe_path(path.as_deref()),
                describe_path(previous.path.as_deref()),
            );
        }
        self.recipes
            .insert(recipe.name.clone(), StoredRecipe { path, recipe });
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name).map(|stored| &stored.recipe)
    }

    pub fn stored(&self) -> impl Iterator<Item = &StoredRecipe> {
        self.recipes.values()
    }

    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values().map(|stored| &stored.recipe)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Precondition for operations that make no sense without recipes
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            Err(GampError::EmptyCatalog)
        } else {
            Ok(())
        }
    }
}

impl FromIterator<Recipe> for RecipeStore {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        let mut store = RecipeStore::new();
        for recipe in iter {
            store.insert(recipe);
        }
        store
    }
}

impl RecipeLookup for RecipeStore {
    fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.get(name)
    }
}

fn describe_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<memory>".to_string())
}
