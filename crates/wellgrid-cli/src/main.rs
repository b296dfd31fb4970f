//! wellgrid CLI — replicate a measured tile pattern onto every well of a plate.

mod czexp;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use wellgrid::{
    AnchorChoice, MappingConfig, PitchWells, PlateLayout, PlateMapper, PlateMapping,
    ReferenceSource,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

/// Z used for positions whose source region carries none.
const DEFAULT_Z: f64 = 5048.87;

#[derive(Parser)]
#[command(name = "wellgrid")]
#[command(
    about = "Replicate microscope tile positions from one calibration well onto every well of a plate"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map tile positions onto every well and write one .czexp per well.
    Map(CliMapArgs),

    /// Print the computed center of every well.
    Centers(CliCentersArgs),

    /// Print the plate layout.
    PlateInfo(CliPlateArgs),
}

#[derive(Debug, Clone, Args)]
struct CliMapArgs {
    /// Tile-region file with measured well centers (regions named A6, A5, B6, ...).
    #[arg(long)]
    centres: PathBuf,

    /// Tile-region file with the positions measured around the anchor well.
    #[arg(long)]
    positions: PathBuf,

    /// File whose structure is copied into every output (defaults to --positions).
    #[arg(long)]
    template: Option<PathBuf>,

    /// Root folder for the timestamped run folder.
    #[arg(long, default_value = "output")]
    out_root: PathBuf,

    /// Z written for positions that carry no Z of their own.
    #[arg(long, default_value_t = DEFAULT_Z)]
    z: f64,

    /// Path to write the full mapping (pitch, centers, positions) as JSON.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Print positions instead of writing .czexp files.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    mapping: CliMappingArgs,

    #[command(flatten)]
    anchor: CliAnchorArgs,
}

#[derive(Debug, Clone, Args)]
struct CliCentersArgs {
    /// Tile-region file with measured well centers.
    #[arg(long)]
    centres: PathBuf,

    #[command(flatten)]
    mapping: CliMappingArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct CliPlateArgs {
    /// Standard plate by well count (6, 12, 24, 48, 96, 384).
    #[arg(long, conflicts_with = "plate_json")]
    plate: Option<usize>,

    /// Plate layout JSON (schema wellgrid.plate.v1).
    #[arg(long)]
    plate_json: Option<PathBuf>,
}

impl CliPlateArgs {
    fn to_core(&self) -> CliResult<Option<PlateLayout>> {
        if let Some(path) = &self.plate_json {
            return Ok(Some(PlateLayout::from_json_file(path)?));
        }
        Ok(self.plate.map(PlateLayout::standard).transpose()?)
    }
}

#[derive(Debug, Clone, Args, Default)]
struct CliMappingArgs {
    /// Mapping config JSON (plate, pitch_wells, reference, anchor). Flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    plate: CliPlateArgs,

    /// Pitch wells as ORIGIN,COLUMN_NEIGHBOR,ROW_NEIGHBOR (default A6,A5,B6).
    #[arg(long)]
    pitch_wells: Option<String>,

    /// Reference well the grid is built from (default: A6, measured).
    #[arg(long)]
    reference_well: Option<String>,

    /// Fixed center "X,Y" for --reference-well instead of its measured point.
    #[arg(long, value_parser = parse_xy, requires = "reference_well")]
    reference_xy: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Args, Default)]
#[group(id = "anchor", multiple = false)]
struct CliAnchorArgs {
    /// Anchor on the computed center of this well (default B6).
    #[arg(long)]
    anchor_well: Option<String>,

    /// Anchor on the measured point of this well.
    #[arg(long)]
    anchor_measured: Option<String>,

    /// Anchor on X of one measured well and Y of another, as X_WELL,Y_WELL.
    #[arg(long)]
    anchor_composite: Option<String>,

    /// Anchor on an explicit "X,Y".
    #[arg(long, value_parser = parse_xy)]
    anchor_xy: Option<[f64; 2]>,
}

impl CliAnchorArgs {
    fn to_core(&self) -> CliResult<Option<AnchorChoice>> {
        if let Some(well) = &self.anchor_well {
            return Ok(Some(AnchorChoice::ComputedCenter { well: well.clone() }));
        }
        if let Some(well) = &self.anchor_measured {
            return Ok(Some(AnchorChoice::Measured { well: well.clone() }));
        }
        if let Some(pair) = &self.anchor_composite {
            let [x_from, y_from] = split_labels::<2>(pair, "--anchor-composite")?;
            return Ok(Some(AnchorChoice::Composite { x_from, y_from }));
        }
        Ok(self.anchor_xy.map(|center| AnchorChoice::Explicit { center }))
    }
}

fn parse_xy(s: &str) -> Result<[f64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {}", v.trim(), e))
    };
    Ok([parse(x)?, parse(y)?])
}

fn split_labels<const N: usize>(s: &str, flag: &str) -> CliResult<[String; N]> {
    let labels: Vec<String> = s.split(',').map(|p| p.trim().to_string()).collect();
    labels.try_into().map_err(|got: Vec<String>| -> CliError {
        format!("{flag} expects {N} comma-separated wells, got {}", got.len()).into()
    })
}

/// Start from the config file (or defaults) and apply command-line overrides.
fn build_mapping_config(
    args: &CliMappingArgs,
    anchor: Option<AnchorChoice>,
) -> CliResult<MappingConfig> {
    let mut config = match &args.config {
        Some(path) => MappingConfig::from_json_file(path)?,
        None => MappingConfig::default(),
    };

    if let Some(plate) = args.plate.to_core()? {
        config.plate = plate;
    }

    if let Some(wells) = &args.pitch_wells {
        let [origin, column_neighbor, row_neighbor] = split_labels::<3>(wells, "--pitch-wells")?;
        config.pitch_wells = PitchWells {
            origin,
            column_neighbor,
            row_neighbor,
        };
    }

    if let Some(well) = &args.reference_well {
        config.reference = match args.reference_xy {
            Some(center) => ReferenceSource::Fixed {
                well: well.clone(),
                center,
            },
            None => ReferenceSource::Measured { well: well.clone() },
        };
    }

    if let Some(anchor) = anchor {
        config.anchor = anchor;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Map(args) => run_map(&args),
        Commands::Centers(args) => run_centers(&args),
        Commands::PlateInfo(args) => run_plate_info(&args),
    }
}

// ── plate-info ────────────────────────────────────────────────────────

fn run_plate_info(args: &CliPlateArgs) -> CliResult<()> {
    let plate = args.to_core()?.unwrap_or_default();
    let last = plate.wells().last();

    println!("wellgrid plate layout");
    println!("  name:     {}", plate.name());
    println!("  rows:     {} ({})", plate.rows(), plate.row_labels());
    println!("  columns:  {} (1..={})", plate.cols(), plate.cols());
    println!("  wells:    {}", plate.n_wells());
    if let Some(last) = last {
        println!("  range:    A1..{}", last);
    }

    Ok(())
}

// ── centers ───────────────────────────────────────────────────────────

fn load_reference_points(path: &Path) -> CliResult<wellgrid::ReferencePoints> {
    tracing::info!("Loading well centres: {}", path.display());
    let regions = czexp::read_tile_regions(path)?;
    let points = czexp::reference_points(&regions);
    tracing::info!("{} named reference points", points.len());
    Ok(points)
}

fn run_centers(args: &CliCentersArgs) -> CliResult<()> {
    let config = build_mapping_config(&args.mapping, None)?;
    let mapper = PlateMapper::new(config)?;
    let points = load_reference_points(&args.centres)?;
    let grid = mapper.grid(&points)?;

    println!(
        "Pitch: horizontal = {}, vertical = {}",
        grid.pitch.horizontal, grid.pitch.vertical
    );
    println!("Well Centers:");
    for (well, [x, y]) in &grid.centers {
        println!("{well}: X = {x}, Y = {y}");
    }

    Ok(())
}

// ── map ───────────────────────────────────────────────────────────────

fn print_positions(mapping: &PlateMapping) {
    for (well, positions) in &mapping.positions {
        println!("Well {well}:");
        for (i, [x, y]) in positions.iter().enumerate() {
            println!("  Position {}: X = {}, Y = {}", i + 1, x, y);
        }
    }
}

fn run_map(args: &CliMapArgs) -> CliResult<()> {
    let config = build_mapping_config(&args.mapping, args.anchor.to_core()?)?;
    let mapper = PlateMapper::new(config)?;

    let points = load_reference_points(&args.centres)?;

    tracing::info!("Loading positions: {}", args.positions.display());
    let tiles = czexp::read_tile_regions(&args.positions)?;
    let offsets: Vec<[f64; 2]> = tiles.iter().map(czexp::TileRegion::xy).collect();
    let z: Vec<f64> = tiles.iter().map(|t| t.z.unwrap_or(args.z)).collect();
    tracing::info!("{} tile positions", offsets.len());
    if offsets.is_empty() {
        tracing::warn!("positions file has no tile regions; every well gets an empty list");
    }

    let mapping = mapper.map(&points, &offsets)?;

    if let Some(summary_path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&mapping)?;
        std::fs::write(summary_path, &json)?;
        tracing::info!("Mapping summary written to {}", summary_path.display());
    }

    if args.dry_run {
        print_positions(&mapping);
        return Ok(());
    }

    let template_path = args.template.as_deref().unwrap_or(&args.positions);
    let template = std::fs::read_to_string(template_path)
        .map_err(|e| format!("failed to read {}: {}", template_path.display(), e))?;

    let (folder, written) =
        output::write_run(&args.out_root, &template, &mapping.positions, &z, offsets.len())?;
    tracing::info!("{} well files written to {}", written.len(), folder.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wellgrid").chain(args.iter().copied()))
            .expect("valid command line")
    }

    #[test]
    fn parse_xy_accepts_pairs() {
        assert_eq!(parse_xy("41873, 26300.75"), Ok([41873.0, 26300.75]));
        assert!(parse_xy("41873").is_err());
        assert!(parse_xy("a,b").is_err());
    }

    #[test]
    fn defaults_match_library_defaults() {
        let config = build_mapping_config(&CliMappingArgs::default(), None).expect("config");
        assert_eq!(config, MappingConfig::default());
    }

    #[test]
    fn flags_override_reference_and_anchor() {
        let cli = parse(&[
            "map",
            "--centres",
            "c.czexp",
            "--positions",
            "p.czexp",
            "--plate",
            "96",
            "--reference-well",
            "A1",
            "--reference-xy",
            "41873,26300.75",
            "--anchor-composite",
            "A6,B6",
        ]);
        let Commands::Map(args) = cli.command else {
            panic!("expected map command");
        };
        let anchor = args.anchor.to_core().expect("anchor");
        let config = build_mapping_config(&args.mapping, anchor).expect("config");

        assert_eq!(config.plate.n_wells(), 96);
        assert_eq!(
            config.reference,
            ReferenceSource::Fixed {
                well: "A1".to_string(),
                center: [41873.0, 26300.75],
            }
        );
        assert_eq!(
            config.anchor,
            AnchorChoice::Composite {
                x_from: "A6".to_string(),
                y_from: "B6".to_string(),
            }
        );
        assert_eq!(args.z, DEFAULT_Z);
    }

    #[test]
    fn anchor_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "wellgrid",
            "map",
            "--centres",
            "c.czexp",
            "--positions",
            "p.czexp",
            "--anchor-well",
            "B6",
            "--anchor-xy",
            "1,2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn pitch_wells_need_three_labels() {
        let args = CliMappingArgs {
            pitch_wells: Some("A6,A5".to_string()),
            ..Default::default()
        };
        let err = build_mapping_config(&args, None).expect_err("two labels");
        assert!(err.to_string().contains("--pitch-wells expects 3"));
    }

    #[test]
    fn off_plate_wells_fail_validation() {
        let args = CliMappingArgs {
            plate: CliPlateArgs {
                plate: Some(6),
                plate_json: None,
            },
            ..Default::default()
        };
        assert!(build_mapping_config(&args, None).is_err());
    }
}
