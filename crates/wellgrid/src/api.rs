//! High-level mapping API.
//!
//! [`PlateMapper`] is the primary entry point. It wraps a validated
//! [`MappingConfig`] and turns measured reference points plus a tile list
//! into centers and positions for every well.

use std::path::Path;

use crate::anchor::AnchorChoice;
use crate::centers::{well_centers_from_points, PlateGrid, WellCenterMap};
use crate::config::MappingConfig;
use crate::error::MappingResult;
use crate::pitch::Pitch;
use crate::reference::{ReferencePoints, ReferenceWell};
use crate::replicate::{replicate_positions, WellPositionMap};

/// Primary mapping interface.
///
/// Create once per configuration, map as many measurement sets as needed.
///
/// # Examples
///
/// ```
/// use wellgrid::{MappingConfig, PlateMapper, ReferencePoints};
///
/// let points: ReferencePoints = [
///     ("A6".to_string(), [1000.0, 2000.0]),
///     ("A5".to_string(), [900.0, 2000.0]),
///     ("B6".to_string(), [1000.0, 1850.0]),
/// ]
/// .into_iter()
/// .collect();
///
/// let mapper = PlateMapper::new(MappingConfig::default()).unwrap();
/// let mapping = mapper.map(&points, &[[1000.0, 1850.0]]).unwrap();
/// assert_eq!(mapping.positions.len(), 24);
/// ```
#[derive(Debug, Clone)]
pub struct PlateMapper {
    config: MappingConfig,
}

impl PlateMapper {
    /// Validate `config` and build a mapper.
    pub fn new(config: MappingConfig) -> MappingResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load a config JSON and build a mapper in one step.
    pub fn from_config_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(MappingConfig::from_json_file(path)?)?)
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Pitch, reference and every well center, without replicating offsets.
    pub fn grid(&self, points: &ReferencePoints) -> MappingResult<PlateGrid> {
        let config = &self.config;
        tracing::debug!(
            "building grid of '{}' from reference well {}",
            config.plate.name(),
            config.reference.well_label(),
        );
        well_centers_from_points(
            &config.plate,
            points,
            &config.pitch_wells,
            &config.reference,
        )
    }

    /// Full mapping: centers for every well, then the offsets re-anchored
    /// onto each center.
    pub fn map(
        &self,
        points: &ReferencePoints,
        offsets: &[[f64; 2]],
    ) -> MappingResult<PlateMapping> {
        let grid = self.grid(points)?;
        tracing::info!(
            "pitch: horizontal={}, vertical={}; reference {} at ({}, {})",
            grid.pitch.horizontal,
            grid.pitch.vertical,
            grid.reference.well,
            grid.reference.center[0],
            grid.reference.center[1],
        );

        let anchor = self
            .config
            .anchor
            .resolve(&self.config.plate, points, &grid.centers)?;
        tracing::info!(
            "anchor ({}, {}) via {}",
            anchor[0],
            anchor[1],
            describe_anchor(&self.config.anchor)
        );

        let positions = replicate_positions(&grid.centers, offsets, anchor)?;
        tracing::info!(
            "{} positions replicated onto {} wells of '{}'",
            offsets.len(),
            positions.len(),
            self.config.plate.name(),
        );

        Ok(PlateMapping {
            plate: self.config.plate.name().to_string(),
            pitch: grid.pitch,
            reference: grid.reference,
            anchor,
            centers: grid.centers,
            positions,
        })
    }
}

fn describe_anchor(choice: &AnchorChoice) -> String {
    match choice {
        AnchorChoice::ComputedCenter { well } => format!("computed center of {well}"),
        AnchorChoice::Measured { well } => format!("measured point of {well}"),
        AnchorChoice::Composite { x_from, y_from } => {
            format!("X of {x_from}, Y of {y_from}")
        }
        AnchorChoice::Explicit { .. } => "explicit coordinate".to_string(),
    }
}

/// Result of one mapping run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlateMapping {
    /// Plate layout name.
    pub plate: String,
    pub pitch: Pitch,
    pub reference: ReferenceWell,
    /// Center the offsets were re-based from.
    pub anchor: [f64; 2],
    pub centers: WellCenterMap,
    /// Absolute tile positions per well, same length and order as the input
    /// offsets.
    pub positions: WellPositionMap,
}
