//! Shared fixtures for unit tests.

use crate::reference::ReferencePoints;

/// Measured centers of A6, A5 and B6: horizontal pitch 100, vertical pitch 150.
pub(crate) fn reference_points() -> ReferencePoints {
    [
        ("A6".to_string(), [1000.0, 2000.0]),
        ("A5".to_string(), [900.0, 2000.0]),
        ("B6".to_string(), [1000.0, 1850.0]),
    ]
    .into_iter()
    .collect()
}

/// A 5x5 raster of tile positions around `center` with the given step.
pub(crate) fn tile_raster(center: [f64; 2], step: f64) -> Vec<[f64; 2]> {
    let mut tiles = Vec::with_capacity(25);
    for iy in -2..=2 {
        for ix in -2..=2 {
            tiles.push([
                center[0] + ix as f64 * step,
                center[1] + iy as f64 * step,
            ]);
        }
    }
    tiles
}
