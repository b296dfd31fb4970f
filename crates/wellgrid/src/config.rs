//! Mapping configuration: plate layout, pitch wells, reference and anchor.

use std::path::Path;

use crate::anchor::AnchorChoice;
use crate::error::MappingResult;
use crate::pitch::PitchWells;
use crate::plate_layout::PlateLayout;
use crate::reference::ReferenceSource;

/// Everything the mapping needs besides the measured data itself.
///
/// Every field has a default, so a config file only lists what it changes.
/// The defaults describe a 24-well plate measured at A6/A5/B6, with the grid
/// built from A6's measured center and offsets recorded against B6's center.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    #[serde(default)]
    pub plate: PlateLayout,
    #[serde(default)]
    pub pitch_wells: PitchWells,
    #[serde(default)]
    pub reference: ReferenceSource,
    #[serde(default)]
    pub anchor: AnchorChoice,
}

impl MappingConfig {
    /// Load a mapping config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse every well label against the plate so malformed ids surface
    /// before any measured data is touched.
    pub fn validate(&self) -> MappingResult<()> {
        self.pitch_wells.resolve(&self.plate)?;
        self.reference.required_wells(&self.plate)?;
        self.anchor.validate(&self.plate)?;
        Ok(())
    }
}
