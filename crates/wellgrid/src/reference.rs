//! Measured reference points and the reference well the grid is built from.

use std::collections::HashMap;

use crate::error::{MappingError, MappingResult};
use crate::plate_layout::PlateLayout;
use crate::well_id::WellId;

/// Measured stage coordinates keyed by well label (e.g. `"A6"`).
pub type ReferencePoints = HashMap<String, [f64; 2]>;

pub(crate) fn is_finite_xy(xy: &[f64; 2]) -> bool {
    xy[0].is_finite() && xy[1].is_finite()
}

/// Look up a well's measured coordinate. Non-finite entries count as absent.
pub(crate) fn measured_point(points: &ReferencePoints, well: WellId) -> Option<[f64; 2]> {
    points
        .get(&well.to_string())
        .copied()
        .filter(is_finite_xy)
}

/// Fetch every requested well's coordinate, or fail listing all absent wells.
pub(crate) fn require_points(
    points: &ReferencePoints,
    wells: &[WellId],
) -> MappingResult<Vec<[f64; 2]>> {
    let mut found = Vec::with_capacity(wells.len());
    let mut missing: Vec<String> = Vec::new();
    for &well in wells {
        match measured_point(points, well) {
            Some(xy) => found.push(xy),
            None => {
                let label = well.to_string();
                if !missing.contains(&label) {
                    missing.push(label);
                }
            }
        }
    }
    if !missing.is_empty() {
        return Err(MappingError::MissingInput { wells: missing });
    }
    Ok(found)
}

/// Where the grid's reference well and its center come from.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Read the well's center from the measured reference points.
    Measured { well: String },
    /// Use an externally supplied center for the well.
    Fixed { well: String, center: [f64; 2] },
}

impl Default for ReferenceSource {
    fn default() -> Self {
        Self::Measured {
            well: "A6".to_string(),
        }
    }
}

impl ReferenceSource {
    /// Label of the reference well.
    pub fn well_label(&self) -> &str {
        match self {
            Self::Measured { well } | Self::Fixed { well, .. } => well.as_str(),
        }
    }

    /// Wells whose measured points this source needs.
    pub(crate) fn required_wells(&self, layout: &PlateLayout) -> MappingResult<Vec<WellId>> {
        match self {
            Self::Measured { well } => Ok(vec![layout.parse_well(well)?]),
            Self::Fixed { well, .. } => {
                layout.parse_well(well)?;
                Ok(Vec::new())
            }
        }
    }

    /// Resolve to a concrete reference well and center.
    pub fn resolve(
        &self,
        layout: &PlateLayout,
        points: &ReferencePoints,
    ) -> MappingResult<ReferenceWell> {
        match self {
            Self::Measured { well } => {
                let well = layout.parse_well(well)?;
                let center = require_points(points, &[well])?[0];
                Ok(ReferenceWell { well, center })
            }
            Self::Fixed { well, center } => {
                let well = layout.parse_well(well)?;
                if !is_finite_xy(center) {
                    return Err(MappingError::MissingInput {
                        wells: vec![well.to_string()],
                    });
                }
                Ok(ReferenceWell {
                    well,
                    center: *center,
                })
            }
        }
    }
}

/// A well whose physical center is known; every other center derives from it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ReferenceWell {
    pub well: WellId,
    pub center: [f64; 2],
}
