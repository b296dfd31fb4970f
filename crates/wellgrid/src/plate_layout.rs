//! Runtime plate layout specification.
//!
//! Layout JSON follows a small schema (`wellgrid.plate.v1`): the well grid is
//! generated at runtime from `(rows, cols)` with rows labelled `A, B, ...` and
//! columns numbered from 1. Well centers are never part of the layout; they
//! are inferred from measured reference points.

use std::path::Path;

use crate::error::{malformed, MappingError, MappingResult};
use crate::well_id::{WellId, MAX_ROWS};

const PLATE_SCHEMA_V1: &str = "wellgrid.plate.v1";

const DEFAULT_WELLS: usize = 24;

/// SBS-footprint plates: `(wells, rows, cols)`.
const STANDARD_PLATES: [(usize, usize, usize); 6] = [
    (6, 2, 3),
    (12, 3, 4),
    (24, 4, 6),
    (48, 6, 8),
    (96, 8, 12),
    (384, 16, 24),
];

/// Row/column grid of a multi-well plate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "PlateLayoutSpecV1", into = "PlateLayoutSpecV1")]
pub struct PlateLayout {
    name: String,
    rows: usize,
    cols: usize,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PlateLayoutSpecV1 {
    schema: String,
    name: String,
    rows: usize,
    cols: usize,
}

impl PlateLayout {
    /// Build a layout with explicit dimensions.
    pub fn new(name: impl Into<String>, rows: usize, cols: usize) -> MappingResult<Self> {
        let layout = Self {
            name: name.into(),
            rows,
            cols,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Standard plate with the given number of wells (6, 12, 24, 48, 96, 384).
    pub fn standard(n_wells: usize) -> MappingResult<Self> {
        let Some(&(_, rows, cols)) = STANDARD_PLATES.iter().find(|(n, _, _)| *n == n_wells)
        else {
            let known: Vec<String> = STANDARD_PLATES.iter().map(|p| p.0.to_string()).collect();
            return Err(MappingError::InvalidLayout(format!(
                "no standard {n_wells}-well plate (known: {})",
                known.join(", ")
            )));
        };
        Self::new(format!("{n_wells}-well"), rows, cols)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of wells on the plate.
    pub fn n_wells(&self) -> usize {
        self.rows * self.cols
    }

    /// Row labels in order, e.g. `"ABCD"` for a 24-well plate.
    pub fn row_labels(&self) -> String {
        (0..self.rows as u8).map(|r| char::from(b'A' + r)).collect()
    }

    /// All wells in row-major order.
    pub fn wells(&self) -> impl Iterator<Item = WellId> + '_ {
        (0..self.rows as u8)
            .flat_map(move |row| (1..=self.cols as u16).map(move |col| WellId::new(row, col)))
    }

    pub fn contains(&self, well: WellId) -> bool {
        (well.row() as usize) < self.rows && (well.col() as usize) <= self.cols
    }

    /// Parse a well label and check that it exists on this plate.
    pub fn parse_well(&self, label: &str) -> MappingResult<WellId> {
        let well = WellId::parse(label)?;
        if well.row() as usize >= self.rows {
            return Err(malformed(
                label,
                format!(
                    "row '{}' outside plate rows {}",
                    well.row_letter(),
                    self.row_labels()
                ),
            ));
        }
        if well.col() as usize > self.cols {
            return Err(malformed(
                label,
                format!("column {} outside plate columns 1..={}", well.col(), self.cols),
            ));
        }
        Ok(well)
    }

    /// Load a plate layout from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let layout: Self = serde_json::from_str(&data)?;
        Ok(layout)
    }

    fn validate(&self) -> MappingResult<()> {
        if self.name.trim().is_empty() {
            return Err(MappingError::InvalidLayout(
                "plate name must not be empty".to_string(),
            ));
        }
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(MappingError::InvalidLayout(format!(
                "rows must be in 1..={MAX_ROWS}, got {}",
                self.rows
            )));
        }
        if self.cols == 0 || self.cols > u16::MAX as usize {
            return Err(MappingError::InvalidLayout(format!(
                "cols must be in 1..={}, got {}",
                u16::MAX,
                self.cols
            )));
        }
        Ok(())
    }
}

impl Default for PlateLayout {
    fn default() -> Self {
        Self::standard(DEFAULT_WELLS).expect("default plate spec must be valid")
    }
}

impl TryFrom<PlateLayoutSpecV1> for PlateLayout {
    type Error = MappingError;

    fn try_from(spec: PlateLayoutSpecV1) -> Result<Self, Self::Error> {
        if spec.schema != PLATE_SCHEMA_V1 {
            return Err(MappingError::InvalidLayout(format!(
                "unsupported plate schema '{}' (expected '{}')",
                spec.schema, PLATE_SCHEMA_V1
            )));
        }
        Self::new(spec.name, spec.rows, spec.cols)
    }
}

impl From<PlateLayout> for PlateLayoutSpecV1 {
    fn from(layout: PlateLayout) -> Self {
        Self {
            schema: PLATE_SCHEMA_V1.to_string(),
            name: layout.name,
            rows: layout.rows,
            cols: layout.cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plate_is_24_well() {
        let plate = PlateLayout::default();
        assert_eq!(plate.rows(), 4);
        assert_eq!(plate.cols(), 6);
        assert_eq!(plate.n_wells(), 24);
        assert_eq!(plate.row_labels(), "ABCD");
    }

    #[test]
    fn wells_enumerate_row_major() {
        let plate = PlateLayout::standard(6).expect("6-well");
        let labels: Vec<String> = plate.wells().map(|w| w.to_string()).collect();
        assert_eq!(labels, ["A1", "A2", "A3", "B1", "B2", "B3"]);
    }

    #[test]
    fn standard_presets_have_expected_counts() {
        for n in [6, 12, 24, 48, 96, 384] {
            let plate = PlateLayout::standard(n).expect("preset");
            assert_eq!(plate.n_wells(), n);
            assert_eq!(plate.wells().count(), n);
        }
        assert!(PlateLayout::standard(25).is_err());
    }

    #[test]
    fn parse_well_checks_plate_bounds() {
        let plate = PlateLayout::default();
        assert_eq!(plate.parse_well("D6").expect("inside").to_string(), "D6");
        for label in ["E1", "A7", "Q3"] {
            let err = plate.parse_well(label).expect_err(label);
            assert!(matches!(err, MappingError::MalformedWellId { .. }));
        }
    }

    #[test]
    fn rejects_invalid_dimensions() {
        assert!(PlateLayout::new("x", 0, 4).is_err());
        assert!(PlateLayout::new("x", 27, 4).is_err());
        assert!(PlateLayout::new("x", 2, 0).is_err());
        assert!(PlateLayout::new("  ", 2, 3).is_err());
    }

    #[test]
    fn json_requires_v1_schema() {
        let raw = r#"{"schema":"wellgrid.plate.v0","name":"x","rows":2,"cols":3}"#;
        let err = serde_json::from_str::<PlateLayout>(raw).expect_err("expected error");
        assert!(err.to_string().contains("unsupported plate schema"));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let raw = r#"{
            "schema":"wellgrid.plate.v1",
            "name":"x",
            "rows":2,
            "cols":3,
            "pitch_um":9000.0
        }"#;
        assert!(serde_json::from_str::<PlateLayout>(raw).is_err());
    }

    #[test]
    fn json_carries_schema_tag() {
        let plate = PlateLayout::standard(96).expect("96-well");
        let json = serde_json::to_string(&plate).expect("serialize");
        assert!(json.contains(PLATE_SCHEMA_V1));
        let back: PlateLayout = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, plate);
    }
}
