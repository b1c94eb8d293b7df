//! The crate's error type.

use thiserror::Error;

/// An error raised while loading, laying out or rendering simulation output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot line which is not well-formed JSON.
    #[error("line {line}: malformed snapshot record: {source}")]
    Parse {
        /// The 1-based line number in the snapshot source.
        line: usize,
        source: serde_json::Error,
    },

    /// A snapshot record with a missing or mistyped field.
    #[error("line {line}: missing or invalid field: {source}")]
    MissingField {
        /// The 1-based line number in the snapshot source.
        line: usize,
        source: serde_json::Error,
    },

    #[error("malformed scenario config: {0}")]
    Config(#[from] toml::de::Error),

    /// A well-formed scenario config describing an impossible road.
    #[error("invalid scenario config: {field} = {value}")]
    InvalidScenario { field: &'static str, value: f64 },

    #[error("failed to serialize scenario config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A pedestrian whose location does not index into the zebra crossings.
    #[error(
        "snapshot at {timestamp} ms: pedestrian location {location} is out of range \
         for {crossings} crossing(s)"
    )]
    InvalidLocation {
        timestamp: u64,
        location: usize,
        crossings: usize,
    },

    #[error("failed to build scene markup")]
    Markup(#[from] std::fmt::Error),

    #[error("failed to parse scene markup: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("cannot rasterize a {width}x{height} px frame")]
    Canvas { width: u32, height: u32 },

    #[error("failed to encode animation: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no frames to render")]
    EmptyAnimation,
}

/// A specialised [Result](std::result::Result) for this crate.
pub type Result<T> = std::result::Result<T, Error>;
