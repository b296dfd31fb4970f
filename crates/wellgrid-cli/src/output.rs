//! Run folders and per-well output files.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use wellgrid::WellPositionMap;

use crate::czexp::render_positions;
use crate::CliResult;

pub const OUTPUT_EXTENSION: &str = "czexp";

/// `<YYYYmmdd_HHMM>_<N>wp_<M>positions`, e.g. `20240722_0905_24wp_25positions`.
pub fn run_folder_name(timestamp: NaiveDateTime, n_wells: usize, n_positions: usize) -> String {
    format!(
        "{}_{}wp_{}positions",
        timestamp.format("%Y%m%d_%H%M"),
        n_wells,
        n_positions
    )
}

/// Create a fresh run folder under `out_root`, named after the local time.
fn create_run_folder(out_root: &Path, n_wells: usize, n_positions: usize) -> CliResult<PathBuf> {
    let name = run_folder_name(Local::now().naive_local(), n_wells, n_positions);
    let folder = out_root.join(name);
    std::fs::create_dir_all(&folder)
        .map_err(|e| format!("failed to create {}: {}", folder.display(), e))?;
    Ok(folder)
}

/// Render one `<well>.czexp` per well from `template`, then write them into a
/// fresh run folder under `out_root`. Every file is rendered before the folder
/// is created, so a template that cannot be refilled leaves nothing behind.
/// Returns the folder and the written paths in well order.
pub fn write_run(
    out_root: &Path,
    template: &str,
    positions: &WellPositionMap,
    z: &[f64],
    n_positions: usize,
) -> CliResult<(PathBuf, Vec<PathBuf>)> {
    let rendered = positions
        .iter()
        .map(|(well, tiles)| -> CliResult<_> {
            Ok((well, tiles.len(), render_positions(template, tiles, z)?))
        })
        .collect::<CliResult<Vec<_>>>()?;

    let folder = create_run_folder(out_root, positions.len(), n_positions)?;
    let mut written = Vec::with_capacity(rendered.len());
    for (well, n_tiles, xml) in rendered {
        let path = folder.join(format!("{well}.{OUTPUT_EXTENSION}"));
        std::fs::write(&path, xml)
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
        tracing::debug!("wrote {} ({} positions)", path.display(), n_tiles);
        written.push(path);
    }
    Ok((folder, written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::czexp::read_tile_regions;
    use chrono::NaiveDate;
    use wellgrid::WellId;

    #[test]
    fn folder_name_has_minute_timestamp_and_counts() {
        let ts = NaiveDate::from_ymd_opt(2024, 7, 22)
            .and_then(|d| d.and_hms_opt(9, 5, 59))
            .expect("valid timestamp");
        assert_eq!(run_folder_name(ts, 24, 25), "20240722_0905_24wp_25positions");
    }

    fn two_wells() -> WellPositionMap {
        [
            (WellId::parse("A1").expect("valid"), vec![[1.0, 2.0]]),
            (WellId::parse("A2").expect("valid"), vec![[3.0, 4.0]]),
        ]
        .into_iter()
        .collect()
    }

    fn scratch_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wellgrid-output-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn writes_one_file_per_well() {
        let root = scratch_root("ok");
        let template = "<ExperimentBlock><SingleTileRegions/></ExperimentBlock>";
        let (folder, written) =
            write_run(&root, template, &two_wells(), &[10.0], 1).expect("write");

        assert!(folder.is_dir());
        assert!(folder
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_2wp_1positions")));
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].file_name().and_then(|n| n.to_str()), Some("A1.czexp"));
        let regions = read_tile_regions(&written[1]).expect("readable");
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].xy(), [3.0, 4.0]);
        assert_eq!(regions[0].z, Some(10.0));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn unusable_template_creates_no_run_folder() {
        let root = scratch_root("bad-template");
        let template = "<ExperimentBlock><Other/></ExperimentBlock>";
        let err = write_run(&root, template, &two_wells(), &[10.0], 1).expect_err("no regions");
        assert!(err.to_string().contains("SingleTileRegions"), "{err}");
        assert!(!root.exists());
    }
}
