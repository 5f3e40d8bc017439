/// Built-in units as (symbol, dimension, factor to canonical unit, aliases).
///
/// The first entry of each dimension has factor 1 and is its canonical unit.
/// Volumes use US customary measures.
pub(super) const BUILTIN_UNITS: &[(&str, &str, f64, &[&str])] = &[
    // mass
    ("g", "mass", 1.0, &["gram", "grams"]),
    ("mg", "mass", 0.001, &["milligram", "milligrams"]),
    ("kg", "mass", 1000.0, &["kilogram", "kilograms"]),
    ("oz", "mass", 28.349523125, &["ounce", "ounces"]),
    ("lb", "mass", 453.59237, &["lbs", "pound", "pounds"]),
    // volume
    ("ml", "volume", 1.0, &["mL", "milliliter", "milliliters", "millilitre", "millilitres"]),
    ("l", "volume", 1000.0, &["L", "liter", "liters", "litre", "litres"]),
    ("tsp", "volume", 4.92892159375, &["teaspoon", "teaspoons"]),
    ("tbsp", "volume", 14.78676478125, &["tbs", "tablespoon", "tablespoons"]),
    ("floz", "volume", 29.5735295625, &["fl oz", "fl_oz", "fluid_ounce", "fluid_ounces"]),
    ("cup", "volume", 236.5882365, &["cups"]),
    ("pint", "volume", 473.176473, &["pints", "pt"]),
    ("quart", "volume", 946.352946, &["quarts", "qt"]),
    ("gallon", "volume", 3785.411784, &["gallons", "gal"]),
    // count
    ("", "count", 1.0, &[]),
    ("dozen", "count", 12.0, &[]),
];
