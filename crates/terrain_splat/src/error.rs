//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid configuration, grid construction with mismatched buffers, missing inputs,
//! unknown tiles, and generic errors.
//!
//! Per-tile algorithms do not return errors for data conditions; they degrade locally
//! (neutral grids, skipped producers, index fallbacks) and report through `tracing`.
use thiserror::Error;

use crate::raster::TileCoord;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("grid buffer has {actual} cells but rect requires {expected}")]
    GridSize { expected: usize, actual: usize },

    #[error("missing input on port '{port}'")]
    MissingInput { port: String },

    #[error("unknown tile ({}, {})", tile.0, tile.1)]
    UnknownTile { tile: TileCoord },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn grid_size_message_names_both_lengths() {
        let err = Error::GridSize {
            expected: 16,
            actual: 9,
        };
        assert_eq!(
            err.to_string(),
            "grid buffer has 9 cells but rect requires 16"
        );
    }

    #[test]
    fn unknown_tile_message_shows_coordinates() {
        let err = Error::UnknownTile {
            tile: TileCoord(-1, 2),
        };
        assert_eq!(err.to_string(), "unknown tile (-1, 2)");
    }
}
