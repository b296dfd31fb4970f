//! Grid center calculator: every well's center from one reference well and
//! the pitch.
//!
//! Sign convention: increasing column number moves toward +X, increasing row
//! letter moves toward -Y. This mirrors the stage handedness relative to the
//! plate labelling and must not be flipped.

use std::collections::BTreeMap;

use crate::error::{malformed, MappingError, MappingResult};
use crate::pitch::{derive_pitch, Pitch, PitchWells};
use crate::plate_layout::PlateLayout;
use crate::reference::{
    is_finite_xy, require_points, ReferencePoints, ReferenceSource, ReferenceWell,
};
use crate::well_id::WellId;

/// Computed center of every well on a plate, in row-major order.
pub type WellCenterMap = BTreeMap<WellId, [f64; 2]>;

/// Compute the center of every well of `layout`.
///
/// The reference well maps to exactly `reference_center`; every other well
/// is offset by whole pitches from it.
pub fn compute_well_centers(
    layout: &PlateLayout,
    reference_well: WellId,
    reference_center: [f64; 2],
    horizontal_pitch: f64,
    vertical_pitch: f64,
) -> MappingResult<WellCenterMap> {
    if !layout.contains(reference_well) {
        return Err(malformed(
            &reference_well.to_string(),
            format!("reference well is not on plate '{}'", layout.name()),
        ));
    }
    if !is_finite_xy(&reference_center) {
        return Err(MappingError::MissingInput {
            wells: vec![reference_well.to_string()],
        });
    }
    let pitch = Pitch::new(horizontal_pitch, vertical_pitch)?;

    let ref_row = f64::from(reference_well.row());
    let ref_col = f64::from(reference_well.col());

    let centers = layout
        .wells()
        .map(|well| {
            if well == reference_well {
                return (well, reference_center);
            }
            let row_offset = (f64::from(well.row()) - ref_row) * pitch.vertical;
            let col_offset = (f64::from(well.col()) - ref_col) * pitch.horizontal;
            (
                well,
                [
                    reference_center[0] + col_offset,
                    reference_center[1] - row_offset,
                ],
            )
        })
        .collect();
    Ok(centers)
}

/// Pitch, reference well and per-well centers for one plate.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PlateGrid {
    pub pitch: Pitch,
    pub reference: ReferenceWell,
    pub centers: WellCenterMap,
}

/// Derive the pitch and reference from measured points, then compute centers.
///
/// Every measured point the run needs (pitch wells plus a measured reference
/// well) is checked once up front, so a missing input fails before any
/// center is produced.
pub fn well_centers_from_points(
    layout: &PlateLayout,
    points: &ReferencePoints,
    pitch_wells: &PitchWells,
    reference: &ReferenceSource,
) -> MappingResult<PlateGrid> {
    let mut required = pitch_wells.resolve(layout)?.to_vec();
    required.extend(reference.required_wells(layout)?);
    require_points(points, &required)?;

    let pitch = derive_pitch(layout, points, pitch_wells)?;
    let reference = reference.resolve(layout, points)?;
    let centers = compute_well_centers(
        layout,
        reference.well,
        reference.center,
        pitch.horizontal,
        pitch.vertical,
    )?;

    tracing::debug!(
        "computed {} well centers from reference {} at ({}, {})",
        centers.len(),
        reference.well,
        reference.center[0],
        reference.center[1],
    );

    Ok(PlateGrid {
        pitch,
        reference,
        centers,
    })
}
