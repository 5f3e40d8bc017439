//! The inventory worksheet: a CSV file with columns `ingredient,have,need`.
//!
//! It is generated from a demand table with the `have` column blank, filled in
//! by hand, then read back as an [`InventoryTable`].

use std::collections::HashMap;
use std::path::Path;

use log::info;

use crate::error::{GampError, Result};
use crate::model::{DemandTable, InventoryEntry, InventoryTable};
use crate::units::UnitRegistry;

pub const HEADER: [&str; 3] = ["ingredient", "have", "need"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetRow {
    pub ingredient: String,
    /// Blank until filled in
    pub have: String,
    pub need: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worksheet {
    pub rows: Vec<WorksheetRow>,
}

impl Worksheet {
    /// One row per demanded ingredient with nothing recorded as on hand
    pub fn from_demand(demand: &DemandTable) -> Self {
        let rows = demand
            .iter()
            .map(|(ingredient, need)| WorksheetRow {
                ingredient: ingredient.clone(),
                have: String::new(),
                need: need.to_string(),
            })
            .collect();
        Self { rows }
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_record(&mut out, &HEADER);
        for row in &self.rows {
            push_record(
                &mut out,
                &[row.ingredient.as_str(), row.have.as_str(), row.need.as_str()],
            );
        }
        out
    }

    /// Read worksheet CSV. Columns are located by header name, so they may be
    /// reordered and extra columns are ignored. Each ingredient may appear on
    /// one row only.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let records = parse_records(text)?;
        let mut records = records
            .into_iter()
            .filter(|(_, fields)| !(fields.len() == 1 && fields[0].trim().is_empty()));

        let (_, header) = records.next().ok_or(GampError::Worksheet {
            line: 1,
            message: "missing header".to_string(),
        })?;
        let column = |name: &str| {
            header
                .iter()
                .position(|field| field.trim() == name)
                .ok_or_else(|| GampError::Worksheet {
                    line: 1,
                    message: format!("missing '{name}' column"),
                })
        };
        let (ingredient_col, have_col, need_col) =
            (column("ingredient")?, column("have")?, column("need")?);

        let mut rows = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (line, fields) in records {
            let field = |index: usize| {
                fields
                    .get(index)
                    .map(|f| f.trim().to_string())
                    .unwrap_or_default()
            };
            let ingredient = field(ingredient_col);
            if ingredient.is_empty() {
                return Err(GampError::Worksheet {
                    line,
                    message: "empty ingredient".to_string(),
                });
            }
            if let Some(first) = seen.insert(ingredient.clone(), line) {
                return Err(GampError::Worksheet {
                    line,
                    message: format!("'{ingredient}' is already listed on line {first}"),
                });
            }
            rows.push(WorksheetRow {
                ingredient,
                have: field(have_col),
                need: field(need_col),
            });
        }

        Ok(Self { rows })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_csv())?;
        info!("Wrote {} worksheet rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Parse every row into an inventory entry.
    ///
    /// A blank `have` is zero. A bare number in `have` is read in the unit of
    /// the same row's `need`. Two rows for one ingredient are an error.
    pub fn to_inventory(&self, registry: &UnitRegistry) -> Result<InventoryTable> {
        let mut inventory = InventoryTable::new();

        for row in &self.rows {
            if inventory.contains_key(&row.ingredient) {
                return Err(GampError::DuplicateIngredient(row.ingredient.clone()));
            }
            let need = registry
                .parse(&row.need)
                .map_err(|e| in_row(&row.ingredient, e))?;
            let have = if row.have.is_empty() {
                registry.zero(need.unit())
            } else {
                registry.parse_with_default(&row.have, need.unit())
            }
            .map_err(|e| in_row(&row.ingredient, e))?;

            inventory.insert(row.ingredient.clone(), InventoryEntry { have, need });
        }

        Ok(inventory)
    }
}

fn in_row(ingredient: &str, source: GampError) -> GampError {
    GampError::WorksheetRow {
        ingredient: ingredient.to_string(),
        source: Box::new(source),
    }
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Split CSV text into records, each tagged with the line it starts on
fn parse_records(text: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(GampError::Worksheet {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_demand_leaves_have_blank() {
        let registry = UnitRegistry::new();
        let demand: DemandTable = [
            ("sugar".to_string(), registry.parse("500 g").unwrap()),
            ("egg".to_string(), registry.parse("6").unwrap()),
        ]
        .into_iter()
        .collect();

        let csv = Worksheet::from_demand(&demand).to_csv();

        assert_eq!(csv, "ingredient,have,need\negg,,6\nsugar,,500 g\n");
    }

    #[test]
    fn test_quoting_round_trip() {
        let sheet = Worksheet {
            rows: vec![WorksheetRow {
                ingredient: "cheese, \"aged\"".to_string(),
                have: "1 lb".to_string(),
                need: "2 lb".to_string(),
            }],
        };

        let csv = sheet.to_csv();
        assert!(csv.contains("\"cheese, \"\"aged\"\"\""));
        assert_eq!(Worksheet::parse(&csv).unwrap(), sheet);
    }

    #[test]
    fn test_parse_handles_crlf_reordered_columns_and_blank_lines() {
        let text = "need,ingredient,have,note\r\n2 cups,flour,1 cup,pantry\r\n\r\n3,egg,,\r\n";

        let sheet = Worksheet::parse(text).unwrap();

        assert_eq!(
            sheet.rows,
            vec![
                WorksheetRow {
                    ingredient: "flour".to_string(),
                    have: "1 cup".to_string(),
                    need: "2 cups".to_string(),
                },
                WorksheetRow {
                    ingredient: "egg".to_string(),
                    have: String::new(),
                    need: "3".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Worksheet::parse(""),
            Err(GampError::Worksheet { line: 1, .. })
        ));
        assert!(matches!(
            Worksheet::parse("ingredient,need\nflour,1 cup\n"),
            Err(GampError::Worksheet { line: 1, .. })
        ));
        assert!(matches!(
            Worksheet::parse("ingredient,have,need\n,1,2\n"),
            Err(GampError::Worksheet { line: 2, .. })
        ));
        assert!(matches!(
            Worksheet::parse("ingredient,have,need\n\"flour,1,2\n"),
            Err(GampError::Worksheet { line: 2, .. })
        ));
    }

    #[test]
    fn test_to_inventory_units() {
        let registry = UnitRegistry::new();
        let sheet = Worksheet::parse(
            "ingredient,have,need\nsugar,0.3 kg,500 g\nflour,,3 cups\nmilk,2,4 cup\n",
        )
        .unwrap();

        let inventory = sheet.to_inventory(&registry).unwrap();

        assert_eq!(inventory["sugar"].have, registry.parse("0.3 kg").unwrap());
        assert_eq!(inventory["flour"].have, registry.parse("0 cup").unwrap());
        assert_eq!(inventory["milk"].have, registry.parse("2 cup").unwrap());
        assert_eq!(inventory["milk"].need, registry.parse("4 cups").unwrap());
    }

    #[test]
    fn test_parse_rejects_repeated_ingredient() {
        let text = "ingredient,have,need\nflour,,3 cups\n\nsugar,,1 cup\nflour,2 cups,3 cups\n";

        match Worksheet::parse(text) {
            Err(GampError::Worksheet { line, message }) => {
                assert_eq!(line, 5);
                assert!(message.contains("flour"));
                assert!(message.contains("line 2"));
            }
            other => panic!("Expected duplicate row error, got {:?}", other),
        }
    }

    #[test]
    fn test_to_inventory_rejects_repeated_ingredient() {
        let registry = UnitRegistry::new();
        let row = |have: &str| WorksheetRow {
            ingredient: "flour".to_string(),
            have: have.to_string(),
            need: "3 cups".to_string(),
        };

        for rows in [vec![row(""), row("2 cups")], vec![row("2 cups"), row("")]] {
            let sheet = Worksheet { rows };
            assert!(matches!(
                sheet.to_inventory(&registry),
                Err(GampError::DuplicateIngredient(name)) if name == "flour"
            ));
        }
    }

    #[test]
    fn test_parse_skips_byte_order_mark() {
        let text = "\u{feff}ingredient,have,need\nflour,1 cup,3 cups\n";
        let sheet = Worksheet::parse(text).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].ingredient, "flour");
        assert_eq!(sheet.rows[0].have, "1 cup");
    }

    #[test]
    fn test_to_inventory_reports_row() {
        let registry = UnitRegistry::new();
        let sheet = Worksheet::parse("ingredient,have,need\nflour,lots,3 cups\n").unwrap();

        let err = sheet.to_inventory(&registry).unwrap_err();
        assert!(err.to_string().contains("flour"));
    }
}
