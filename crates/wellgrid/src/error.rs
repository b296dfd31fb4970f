//! Error type shared by every stage of the plate mapping.

/// Errors raised while inferring well centers or replicating positions.
///
/// Every variant is a violated precondition: no stage returns a partial map.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MappingError {
    /// Coordinates needed for the pitch or the reference center are absent
    /// (or not finite).
    #[error("missing coordinates for well(s): {}", .wells.join(", "))]
    MissingInput {
        /// Labels of the wells whose coordinates could not be found.
        wells: Vec<String>,
    },
    /// The anchor center used for re-basing offsets is absent or non-numeric.
    #[error("invalid anchor center: {0}")]
    InvalidAnchor(String),
    /// A tile offset is NaN or infinite.
    #[error("tile offset #{index} ({x}, {y}) is not a finite coordinate")]
    NonFiniteOffset {
        /// 0-based position in the offset list.
        index: usize,
        x: f64,
        y: f64,
    },
    /// A well label does not decompose into a row letter and column number
    /// inside the plate layout.
    #[error("malformed well id '{id}': {reason}")]
    MalformedWellId {
        /// The offending label as supplied.
        id: String,
        /// Why parsing failed.
        reason: String,
    },
    /// Pitch distances are zero or not finite.
    #[error(
        "degenerate pitch (horizontal={horizontal}, vertical={vertical}); \
         both must be finite and non-zero"
    )]
    DegeneratePitch {
        /// Column-to-column X distance.
        horizontal: f64,
        /// Row-to-row Y distance.
        vertical: f64,
    },
    /// The wells chosen for pitch measurement are not row/column aligned.
    #[error("invalid pitch wells: {0}")]
    InvalidPitchWells(String),
    /// Plate layout dimensions or labels are unusable.
    #[error("invalid plate layout: {0}")]
    InvalidLayout(String),
}

pub type MappingResult<T> = Result<T, MappingError>;

pub(crate) fn malformed(id: &str, reason: impl Into<String>) -> MappingError {
    MappingError::MalformedWellId {
        id: id.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_lists_every_well() {
        let err = MappingError::MissingInput {
            wells: vec!["A5".to_string(), "B6".to_string()],
        };
        assert_eq!(err.to_string(), "missing coordinates for well(s): A5, B6");
    }

    #[test]
    fn malformed_carries_label_and_reason() {
        let err = malformed("Z9", "row letter outside plate");
        assert_eq!(
            err.to_string(),
            "malformed well id 'Z9': row letter outside plate"
        );
    }
}
