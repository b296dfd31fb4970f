//! `.czexp` experiment files.
//!
//! Only the tile-region part of the format matters here: every
//! `<SingleTileRegion Name="..">` carries `<X>`, `<Y>` and optionally `<Z>`.
//! Output files are the positions file re-emitted with its first
//! `<SingleTileRegions>` element refilled with generated `P1..Pn` regions.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use wellgrid::{ReferencePoints, WellId};

use crate::{CliError, CliResult};

const REGION_TAG: &str = "SingleTileRegion";
const REGIONS_TAG: &str = "SingleTileRegions";

/// One `SingleTileRegion` as read from a file.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRegion {
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl TileRegion {
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coord {
    X,
    Y,
    Z,
}

impl Coord {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"X" => Some(Self::X),
            b"Y" => Some(Self::Y),
            b"Z" => Some(Self::Z),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct RegionBuilder {
    name: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl RegionBuilder {
    fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1))
    }

    fn set(&mut self, coord: Coord, text: &str, index: usize) -> CliResult<()> {
        let invalid = |reason: String| -> CliError {
            format!(
                "tile region {}: invalid {:?} value '{}': {}",
                self.label(index),
                coord,
                text,
                reason
            )
            .into()
        };
        let value: f64 = text.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        if !value.is_finite() {
            return Err(invalid("not a finite number".to_string()));
        }
        match coord {
            Coord::X => self.x = Some(value),
            Coord::Y => self.y = Some(value),
            Coord::Z => self.z = Some(value),
        }
        Ok(())
    }

    fn finish(self, index: usize) -> CliResult<TileRegion> {
        let label = self.label(index);
        match (self.x, self.y) {
            (Some(x), Some(y)) => Ok(TileRegion {
                name: self.name,
                x,
                y,
                z: self.z,
            }),
            _ => Err(format!("tile region {label} lacks an X or Y coordinate").into()),
        }
    }
}

fn region_name(start: &BytesStart<'_>) -> CliResult<Option<String>> {
    let Some(attr) = start.try_get_attribute("Name")? else {
        return Ok(None);
    };
    let name = attr.unescape_value()?.trim().to_string();
    Ok((!name.is_empty()).then_some(name))
}

/// Parse every `SingleTileRegion` in document order.
pub fn parse_tile_regions(xml: &str) -> CliResult<Vec<TileRegion>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut regions = Vec::new();
    let mut current: Option<RegionBuilder> = None;
    // Element depth below the open region; coordinates are direct children.
    let mut depth = 0usize;
    let mut coord: Option<Coord> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if current.is_some() {
                    depth += 1;
                    coord = if depth == 1 {
                        Coord::from_tag(e.name().as_ref())
                    } else {
                        None
                    };
                } else if e.name().as_ref() == REGION_TAG.as_bytes() {
                    current = Some(RegionBuilder {
                        name: region_name(&e)?,
                        ..Default::default()
                    });
                    depth = 0;
                }
            }
            Event::Empty(e) => {
                if current.is_none() && e.name().as_ref() == REGION_TAG.as_bytes() {
                    let builder = RegionBuilder {
                        name: region_name(&e)?,
                        ..Default::default()
                    };
                    regions.push(builder.finish(regions.len())?);
                }
            }
            Event::Text(t) => {
                if let (Some(builder), Some(c)) = (current.as_mut(), coord) {
                    builder.set(c, &t.unescape()?, regions.len())?;
                }
            }
            Event::End(_) => {
                if current.is_some() {
                    if depth == 0 {
                        if let Some(builder) = current.take() {
                            regions.push(builder.finish(regions.len())?);
                        }
                    } else {
                        depth -= 1;
                    }
                    coord = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() {
        return Err("unterminated SingleTileRegion element".into());
    }
    Ok(regions)
}

pub fn read_tile_regions(path: &Path) -> CliResult<Vec<TileRegion>> {
    let xml = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let regions = parse_tile_regions(&xml)
        .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
    tracing::debug!("{} tile regions in {}", regions.len(), path.display());
    Ok(regions)
}

/// Named regions as reference points. Names that parse as well ids are keyed
/// by their canonical label (`a6` becomes `A6`); other names are kept as
/// written. Unnamed regions are skipped; a repeated name keeps its last
/// occurrence.
pub fn reference_points(regions: &[TileRegion]) -> ReferencePoints {
    let mut points = ReferencePoints::new();
    for region in regions {
        let Some(name) = &region.name else {
            continue;
        };
        let key = WellId::parse(name).map_or_else(|_| name.clone(), |well| well.to_string());
        if points.insert(key, region.xy()).is_some() {
            tracing::warn!("tile region '{}' appears more than once; keeping the last", name);
        }
    }
    points
}

/// Stage coordinate as written to file: shortest round-trip form, always
/// with a fractional part (`1010.0`, `26300.75`).
fn format_coord(v: f64) -> String {
    format!("{v:?}")
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> CliResult<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_regions<W: std::io::Write>(
    writer: &mut Writer<W>,
    positions: &[[f64; 2]],
    z: &[f64],
) -> CliResult<()> {
    for (i, (xy, z)) in positions.iter().zip(z).enumerate() {
        let name = format!("P{}", i + 1);
        let mut region = BytesStart::new(REGION_TAG);
        region.push_attribute(("Name", name.as_str()));
        writer.write_event(Event::Start(region))?;
        write_text_element(writer, "X", &format_coord(xy[0]))?;
        write_text_element(writer, "Y", &format_coord(xy[1]))?;
        write_text_element(writer, "Z", &format_coord(*z))?;
        write_text_element(writer, "IsUsedForAcquisition", "true")?;
        writer.write_event(Event::End(BytesEnd::new(REGION_TAG)))?;
    }
    Ok(())
}

/// Re-emit `template` with its first `SingleTileRegions` element holding one
/// generated region per position. `z[i]` is the Z written for `positions[i]`.
pub fn render_positions(template: &str, positions: &[[f64; 2]], z: &[f64]) -> CliResult<String> {
    if positions.len() != z.len() {
        return Err(format!(
            "{} positions but {} Z values",
            positions.len(),
            z.len()
        )
        .into());
    }

    let mut reader = Reader::from_str(template);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut replaced = false;
    loop {
        match reader.read_event()? {
            Event::Decl(_) => {}
            Event::Start(e) if !replaced && e.name().as_ref() == REGIONS_TAG.as_bytes() => {
                writer.write_event(Event::Start(e.clone()))?;
                write_regions(&mut writer, positions, z)?;
                reader.read_to_end(e.name())?;
                writer.write_event(Event::End(e.to_end()))?;
                replaced = true;
            }
            Event::Empty(e) if !replaced && e.name().as_ref() == REGIONS_TAG.as_bytes() => {
                writer.write_event(Event::Start(e.clone()))?;
                write_regions(&mut writer, positions, z)?;
                writer.write_event(Event::End(e.to_end()))?;
                replaced = true;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    if !replaced {
        return Err(format!("template has no <{REGIONS_TAG}> element").into());
    }
    Ok(String::from_utf8(writer.into_inner())?)
}
