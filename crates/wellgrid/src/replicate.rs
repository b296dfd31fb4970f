//! Position replicator: re-anchor a measured tile pattern onto every well.

use std::collections::BTreeMap;

use nalgebra::{Point2, Vector2};

use crate::centers::WellCenterMap;
use crate::error::{MappingError, MappingResult};
use crate::reference::is_finite_xy;
use crate::well_id::WellId;

/// Absolute tile positions per well. Index `i` of every list corresponds to
/// index `i` of the input offsets (surfaced as position label `P{i+1}`).
pub type WellPositionMap = BTreeMap<WellId, Vec<[f64; 2]>>;

/// Translate `offsets`, recorded against `anchor_center`, onto every well.
///
/// The transform is purely additive: `position = well_center + (offset - anchor)`.
/// Each well receives its own list; an empty offset list yields an empty list
/// per well. Anchor and offsets must be finite.
pub fn replicate_positions(
    well_centers: &WellCenterMap,
    offsets: &[[f64; 2]],
    anchor_center: [f64; 2],
) -> MappingResult<WellPositionMap> {
    if !is_finite_xy(&anchor_center) {
        return Err(MappingError::InvalidAnchor(format!(
            "anchor ({}, {}) is not a finite coordinate",
            anchor_center[0], anchor_center[1]
        )));
    }
    if let Some((index, offset)) = offsets.iter().enumerate().find(|(_, o)| !is_finite_xy(o)) {
        return Err(MappingError::NonFiniteOffset {
            index,
            x: offset[0],
            y: offset[1],
        });
    }
    let anchor = Point2::from(anchor_center);

    let relative: Vec<Vector2<f64>> = offsets
        .iter()
        .map(|&offset| Point2::from(offset) - anchor)
        .collect();

    let positions = well_centers
        .iter()
        .map(|(&well, &center)| {
            let origin = Point2::from(center);
            let tiles = relative
                .iter()
                .map(|d| {
                    let p = origin + *d;
                    [p.x, p.y]
                })
                .collect();
            (well, tiles)
        })
        .collect();
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centers::compute_well_centers;
    use crate::plate_layout::PlateLayout;
    use crate::test_utils::tile_raster;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn well(label: &str) -> WellId {
        WellId::parse(label).expect("valid label")
    }

    fn plate_centers() -> WellCenterMap {
        compute_well_centers(
            &PlateLayout::default(),
            well("A6"),
            [1000.0, 2000.0],
            100.0,
            150.0,
        )
        .expect("centers")
    }

    #[test]
    fn single_offset_single_well() {
        let centers: WellCenterMap = [(well("A6"), [1000.0, 2000.0])].into_iter().collect();
        let out = replicate_positions(&centers, &[[10.0, 10.0]], [0.0, 0.0]).expect("positions");
        assert_eq!(out.len(), 1);
        assert_eq!(out[&well("A6")], vec![[1010.0, 2010.0]]);
    }

    #[test]
    fn every_well_gets_full_list_in_input_order() {
        let centers = plate_centers();
        let offsets = tile_raster([1000.0, 1850.0], 25.0);
        let out = replicate_positions(&centers, &offsets, [1000.0, 1850.0]).expect("positions");
        assert_eq!(out.len(), centers.len());
        for (w, tiles) in &out {
            assert_eq!(tiles.len(), offsets.len());
            let c = centers[w];
            assert_eq!(tiles[0], [c[0] - 50.0, c[1] - 50.0]);
            assert_eq!(tiles[12], c);
            assert_eq!(tiles[24], [c[0] + 50.0, c[1] + 50.0]);
        }
    }

    #[test]
    fn round_trip_on_anchor_well_is_exact() {
        let centers = plate_centers();
        let b6 = centers[&well("B6")];
        let offsets = tile_raster(b6, 12.5);
        let out = replicate_positions(&centers, &offsets, b6).expect("positions");
        assert_eq!(out[&well("B6")], offsets);
    }

    #[test]
    fn patterns_are_translations_of_each_other() {
        let mut rng = StdRng::seed_from_u64(11);
        let centers = plate_centers();
        let offsets: Vec<[f64; 2]> = (0..40)
            .map(|_| [rng.gen_range(-3e4..3e4), rng.gen_range(-3e4..3e4)])
            .collect();
        let anchor = [rng.gen_range(-3e4..3e4), rng.gen_range(-3e4..3e4)];
        let out = replicate_positions(&centers, &offsets, anchor).expect("positions");

        for (w1, p1) in &out {
            for (w2, p2) in &out {
                let dc = [centers[w2][0] - centers[w1][0], centers[w2][1] - centers[w1][1]];
                for i in 0..offsets.len() {
                    assert_relative_eq!(p2[i][0] - p1[i][0], dc[0], epsilon = 1e-6);
                    assert_relative_eq!(p2[i][1] - p1[i][1], dc[1], epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn empty_offsets_give_empty_lists() {
        let centers = plate_centers();
        let out = replicate_positions(&centers, &[], [0.0, 0.0]).expect("positions");
        assert_eq!(out.len(), 24);
        assert!(out.values().all(Vec::is_empty));
    }

    #[test]
    fn non_finite_offset_is_rejected_with_its_index() {
        let centers = plate_centers();
        let offsets = [[1.0, 1.0], [f64::NAN, f64::INFINITY], [2.0, 2.0]];
        let err = replicate_positions(&centers, &offsets, [0.0, 0.0]).expect_err("NaN offset");
        assert!(matches!(err, MappingError::NonFiniteOffset { index: 1, .. }));
    }

    #[test]
    fn non_finite_anchor_is_rejected() {
        let centers = plate_centers();
        for anchor in [[f64::NAN, 0.0], [0.0, f64::INFINITY]] {
            let err = replicate_positions(&centers, &[[1.0, 1.0]], anchor).expect_err("bad anchor");
            assert!(matches!(err, MappingError::InvalidAnchor(_)));
        }
    }
}
