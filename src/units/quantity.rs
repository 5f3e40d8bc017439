use std::fmt;

use super::DIMENSIONLESS;

/// A magnitude paired with the canonical symbol of its unit
///
/// Quantities are produced by [`super::UnitRegistry`], which guarantees the
/// unit symbol is known. The textual form is `"<magnitude> <unit>"`, or just
/// the magnitude when dimensionless, and parses back to the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    magnitude: f64,
    unit: String,
}

impl Quantity {
    pub(crate) fn new(magnitude: f64, unit: impl Into<String>) -> Self {
        // avoid rendering "-0"
        let magnitude = if magnitude == 0.0 { 0.0 } else { magnitude };
        Self {
            magnitude,
            unit: unit.into(),
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit == DIMENSIONLESS
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit)
        }
    }
}

/// Split leading numeric text from the unit text that follows it.
///
/// Accepts integers, decimals (`0.5`, `.5`), fractions (`1/2`) and mixed
/// numbers (`1 1/2`). Returns `None` when there is no leading number, the
/// number is malformed or a denominator is zero.
pub(crate) fn split_magnitude(text: &str) -> Option<(f64, &str)> {
    let text = text.trim();
    let (first, mut rest) = take_number(text)?;
    let mut value = parse_number(first)?;

    if is_whole(first) && rest.starts_with(char::is_whitespace) {
        if let Some((fraction, after)) = take_number(rest.trim_start()) {
            if fraction.contains('/') {
                value += parse_number(fraction)?;
                rest = after;
            }
        }
    }

    Some((value, rest.trim()))
}

fn take_number(text: &str) -> Option<(&str, &str)> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '/'))
        .unwrap_or(text.len());
    if end == 0 {
        None
    } else {
        Some(text.split_at(end))
    }
}

fn is_whole(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit())
}

fn parse_number(token: &str) -> Option<f64> {
    match token.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = parse_decimal(numerator)?;
            let denominator = parse_decimal(denominator)?;
            if denominator == 0.0 {
                None
            } else {
                Some(numerator / denominator)
            }
        }
        None => parse_decimal(token),
    }
}

fn parse_decimal(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}
