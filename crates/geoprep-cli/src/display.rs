//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting reference system information in a human-readable format.

use tabled::{Table, Tabled};

use geoprep_core::crs::CrsDefinition;

/// Table row representation for displaying a reference system.
#[derive(Tabled)]
pub struct CrsRow {
    /// EPSG identifier or range (e.g., `EPSG:27700`).
    #[tabled(rename = "Code")]
    pub code: String,
    /// Descriptive name of the reference system.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Projection method.
    #[tabled(rename = "Method")]
    pub method: String,
    /// Area of use.
    #[tabled(rename = "Area")]
    pub area: String,
}

impl From<&CrsDefinition> for CrsRow {
    fn from(definition: &CrsDefinition) -> Self {
        Self {
            code: definition.code.to_string(),
            name: definition.name.to_string(),
            method: definition.method.to_string(),
            area: definition.area.to_string(),
        }
    }
}

/// Render reference system definitions as a table.
pub fn crs_table(definitions: &[CrsDefinition]) -> String {
    let rows: Vec<CrsRow> = definitions.iter().map(CrsRow::from).collect();
    Table::new(rows).to_string()
}

/// Display reference system definitions in a formatted table on standard output.
pub fn display_crs_table(definitions: &[CrsDefinition]) {
    println!(
        "\nSupported Reference Systems ({} total):\n",
        definitions.len()
    );
    println!("{}", crs_table(definitions));
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoprep_core::crs::supported_crs;

    #[test]
    fn test_crs_row_from_definition() {
        let definition = CrsDefinition {
            code: "EPSG:27700",
            name: "OSGB36 / British National Grid",
            method: "Transverse Mercator",
            area: "United Kingdom",
        };
        let row = CrsRow::from(&definition);
        assert_eq!(row.code, "EPSG:27700");
        assert_eq!(row.name, "OSGB36 / British National Grid");
        assert_eq!(row.area, "United Kingdom");
    }

    #[test]
    fn test_crs_table_lists_registry() {
        let table = crs_table(supported_crs());
        assert!(table.contains("Code"));
        assert!(table.contains("EPSG:4326"));
        assert!(table.contains("EPSG:27700"));
        assert!(table.contains("EPSG:32601-32660"));
    }

    #[test]
    fn test_display_empty() {
        // This test ensures an empty registry is handled correctly
        display_crs_table(&[]);
    }
}
