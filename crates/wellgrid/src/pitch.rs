//! Well-to-well pitch derived from three measured reference wells.

use crate::error::{MappingError, MappingResult};
use crate::plate_layout::PlateLayout;
use crate::reference::{require_points, ReferencePoints};
use crate::well_id::WellId;

/// Center-to-center distances between adjacent wells, in stage units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pitch {
    /// X change per column step (increasing column number).
    pub horizontal: f64,
    /// Y change per row step, measured against increasing row letter:
    /// moving one row down the plate subtracts this from Y.
    pub vertical: f64,
}

impl Pitch {
    /// Both distances must be finite and non-zero.
    pub fn new(horizontal: f64, vertical: f64) -> MappingResult<Self> {
        let usable = |v: f64| v.is_finite() && v != 0.0;
        if !usable(horizontal) || !usable(vertical) {
            return Err(MappingError::DegeneratePitch {
                horizontal,
                vertical,
            });
        }
        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

/// The three wells whose measured centers define the pitch.
///
/// `column_neighbor` shares the origin's row, `row_neighbor` shares its column.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PitchWells {
    pub origin: String,
    pub column_neighbor: String,
    pub row_neighbor: String,
}

impl Default for PitchWells {
    fn default() -> Self {
        Self {
            origin: "A6".to_string(),
            column_neighbor: "A5".to_string(),
            row_neighbor: "B6".to_string(),
        }
    }
}

impl PitchWells {
    /// Parse the labels against `layout` and check their alignment.
    ///
    /// Returns `[origin, column_neighbor, row_neighbor]`.
    pub(crate) fn resolve(&self, layout: &PlateLayout) -> MappingResult<[WellId; 3]> {
        let origin = layout.parse_well(&self.origin)?;
        let column_neighbor = layout.parse_well(&self.column_neighbor)?;
        let row_neighbor = layout.parse_well(&self.row_neighbor)?;

        if column_neighbor.row() != origin.row() || column_neighbor.col() == origin.col() {
            return Err(MappingError::InvalidPitchWells(format!(
                "column neighbor {column_neighbor} must share row {} with origin {origin} \
                 and sit in a different column",
                origin.row_letter()
            )));
        }
        if row_neighbor.col() != origin.col() || row_neighbor.row() == origin.row() {
            return Err(MappingError::InvalidPitchWells(format!(
                "row neighbor {row_neighbor} must share column {} with origin {origin} \
                 and sit in a different row",
                origin.col()
            )));
        }
        Ok([origin, column_neighbor, row_neighbor])
    }
}

/// Derive the pitch from measured centers of the configured pitch wells.
///
/// All three coordinates are looked up before any arithmetic; every absent
/// well is reported in a single [`MappingError::MissingInput`].
pub fn derive_pitch(
    layout: &PlateLayout,
    points: &ReferencePoints,
    wells: &PitchWells,
) -> MappingResult<Pitch> {
    let [origin, column_neighbor, row_neighbor] = wells.resolve(layout)?;
    let xy = require_points(points, &[origin, column_neighbor, row_neighbor])?;
    let (origin_xy, column_xy, row_xy) = (xy[0], xy[1], xy[2]);

    let col_steps = f64::from(origin.col()) - f64::from(column_neighbor.col());
    let row_steps = f64::from(row_neighbor.row()) - f64::from(origin.row());

    let horizontal = (origin_xy[0] - column_xy[0]) / col_steps;
    let vertical = (origin_xy[1] - row_xy[1]) / row_steps;

    tracing::debug!(
        "pitch from {origin}/{column_neighbor}/{row_neighbor}: horizontal={horizontal}, vertical={vertical}"
    );
    Pitch::new(horizontal, vertical)
}
