//! wellgrid — replicate a microscope tile pattern across a multi-well plate.
//!
//! A scan pattern is measured once, around one calibration well. The stages
//! that turn it into a pattern for every well are:
//!
//! 1. **Pitch** – column and row distances from three measured wells.
//! 2. **Centers** – every well's center from one reference well plus the
//!    pitch, on a row-letter / column-number grid.
//! 3. **Anchor** – the center the measured pattern was recorded against.
//! 4. **Replicate** – the pattern re-based from the anchor onto each center.
//!
//! # Public API
//! - [`PlateMapper`] and [`MappingConfig`] as primary entry points
//! - [`compute_well_centers`] and [`replicate_positions`] for direct use
//! - [`PlateLayout`] and [`WellId`] for plate geometry and labels
//!
//! File formats and output naming are the concern of the CLI crate.

mod anchor;
mod api;
mod centers;
mod config;
mod error;
mod pitch;
mod plate_layout;
mod reference;
mod replicate;
#[cfg(test)]
mod test_utils;
mod well_id;

pub use anchor::AnchorChoice;
pub use api::{PlateMapper, PlateMapping};
pub use centers::{compute_well_centers, well_centers_from_points, PlateGrid, WellCenterMap};
pub use config::MappingConfig;
pub use error::{MappingError, MappingResult};
pub use pitch::{derive_pitch, Pitch, PitchWells};
pub use plate_layout::PlateLayout;
pub use reference::{ReferencePoints, ReferenceSource, ReferenceWell};
pub use replicate::{replicate_positions, WellPositionMap};
pub use well_id::{WellId, MAX_ROWS};
