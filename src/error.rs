//! Error types for grid construction, mutation, and persistence.
//!
//! Programmer-contract violations (an out-of-range block coordinate, a
//! non-positive argument to a `log2`-style helper) are not represented here;
//! per the error handling design, those are `debug_assert!`s — fatal in
//! debug builds, unchecked in release.

use std::fmt;

/// Errors surfaced by [`crate::grid::VoxelGrid`] construction, mutation, and
/// persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
  /// A grid dimension was not a positive multiple of `BLOCK_EXTENT`.
  DimensionNotBlockMultiple { axis: &'static str, value: u32 },
  /// A requested block coordinate fell outside the grid's block array.
  BlockOutOfBounds { bx: u32, by: u32, bz: u32 },
  /// Persistence blob declared a file version this build does not support.
  VersionMismatch { found: u32, expected: u32 },
  /// Persistence blob ended before its own header said it would.
  Truncated,
}

impl fmt::Display for GridError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GridError::DimensionNotBlockMultiple { axis, value } => write!(
        f,
        "grid dimension {axis}={value} is not a positive multiple of the block extent"
      ),
      GridError::BlockOutOfBounds { bx, by, bz } => {
        write!(f, "block coordinate ({bx}, {by}, {bz}) is outside the grid")
      }
      GridError::VersionMismatch { found, expected } => {
        write!(f, "persistence version {found} does not match expected {expected}")
      }
      GridError::Truncated => write!(f, "persistence blob is shorter than its header declares"),
    }
  }
}

impl std::error::Error for GridError {}
