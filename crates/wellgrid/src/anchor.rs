//! Anchor selection: the center the measured offset list was recorded against.

use crate::centers::WellCenterMap;
use crate::error::{MappingError, MappingResult};
use crate::plate_layout::PlateLayout;
use crate::reference::{is_finite_xy, measured_point, ReferencePoints};

/// How the anchor center is obtained.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorChoice {
    /// The computed grid center of a well.
    ComputedCenter { well: String },
    /// The measured reference point of a well.
    Measured { well: String },
    /// X from one well's measured point, Y from another's.
    Composite { x_from: String, y_from: String },
    /// A literal stage coordinate.
    Explicit { center: [f64; 2] },
}

impl Default for AnchorChoice {
    fn default() -> Self {
        Self::ComputedCenter {
            well: "B6".to_string(),
        }
    }
}

impl AnchorChoice {
    /// Check that every well label parses on `layout`.
    pub(crate) fn validate(&self, layout: &PlateLayout) -> MappingResult<()> {
        match self {
            Self::ComputedCenter { well } | Self::Measured { well } => {
                layout.parse_well(well)?;
            }
            Self::Composite { x_from, y_from } => {
                layout.parse_well(x_from)?;
                layout.parse_well(y_from)?;
            }
            Self::Explicit { .. } => {}
        }
        Ok(())
    }

    /// Resolve the anchor center.
    ///
    /// An absent well, an absent point or a non-finite value is an
    /// [`MappingError::InvalidAnchor`].
    pub fn resolve(
        &self,
        layout: &PlateLayout,
        points: &ReferencePoints,
        centers: &WellCenterMap,
    ) -> MappingResult<[f64; 2]> {
        let measured = |label: &str| -> MappingResult<[f64; 2]> {
            let well = layout.parse_well(label)?;
            measured_point(points, well).ok_or_else(|| {
                MappingError::InvalidAnchor(format!("no measured point for well {well}"))
            })
        };

        let center = match self {
            Self::ComputedCenter { well } => {
                let well = layout.parse_well(well)?;
                centers.get(&well).copied().ok_or_else(|| {
                    MappingError::InvalidAnchor(format!("no computed center for well {well}"))
                })?
            }
            Self::Measured { well } => measured(well)?,
            Self::Composite { x_from, y_from } => [measured(x_from)?[0], measured(y_from)?[1]],
            Self::Explicit { center } => *center,
        };

        if !is_finite_xy(&center) {
            return Err(MappingError::InvalidAnchor(format!(
                "anchor ({}, {}) is not a finite coordinate",
                center[0], center[1]
            )));
        }
        Ok(center)
    }
}
