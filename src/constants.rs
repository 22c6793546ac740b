//! Block layout constants.
//!
//! A block is a fixed `BLOCK_EXTENT`-per-side cube of samples, the unit of
//! storage (C1/C2), caching (C4), and polygonization parallelism (C9).
//!
//! # 3D Indexing
//!
//! Samples within a block are stored row-major with X fastest, matching the
//! block-array ordering used by the grid itself (§3 "Block layout is
//! row-major with X fastest, then Y, then Z"):
//!
//! ```text
//! index = z * BLOCK_EXTENT_SQ + y * BLOCK_EXTENT + x
//! ```
//!
//! # Coordinate System
//!
//! ```text
//! Cell corner indices (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

/// Samples per side of a block.
pub const BLOCK_EXTENT: usize = 16;

/// `log2(BLOCK_EXTENT)`.
pub const BLOCK_EXTENT_POWER: u32 = 4;

/// `BLOCK_EXTENT^2`.
pub const BLOCK_EXTENT_SQ: usize = BLOCK_EXTENT * BLOCK_EXTENT;

/// Total samples in a block (`BLOCK_EXTENT^3` = 4096).
pub const BLOCK_VOLUME: usize = BLOCK_EXTENT * BLOCK_EXTENT * BLOCK_EXTENT;

/// Cells per side of a block (one fewer than samples, open boundary).
pub const CELLS_PER_BLOCK: usize = BLOCK_EXTENT;

/// Convert in-block 3D coordinates to a linear sample index.
/// X is fastest-varying, then Y, then Z.
#[inline(always)]
pub const fn coord_to_index(x: usize, y: usize, z: usize) -> usize {
  z * BLOCK_EXTENT_SQ + y * BLOCK_EXTENT + x
}

/// Convert a linear sample index back to in-block 3D coordinates.
#[inline(always)]
pub const fn index_to_coord(idx: usize) -> (usize, usize, usize) {
  let z = idx / BLOCK_EXTENT_SQ;
  let rem = idx % BLOCK_EXTENT_SQ;
  let y = rem / BLOCK_EXTENT;
  let x = rem % BLOCK_EXTENT;
  (x, y, z)
}

/// Sample index offsets for the 8 canonical cube corners, relative to a base
/// sample index, for a cell whose edge length is `stride` samples.
#[inline(always)]
pub const fn corner_offsets(stride: usize) -> [isize; 8] {
  let s = stride as isize;
  [
    0,                                    // (0,0,0)
    s,                                    // (1,0,0)
    s * BLOCK_EXTENT as isize,            // (0,1,0)
    s + s * BLOCK_EXTENT as isize,        // (1,1,0)
    s * BLOCK_EXTENT_SQ as isize,         // (0,0,1)
    s + s * BLOCK_EXTENT_SQ as isize,     // (1,0,1)
    s * BLOCK_EXTENT as isize + s * BLOCK_EXTENT_SQ as isize, // (0,1,1)
    s + s * BLOCK_EXTENT as isize + s * BLOCK_EXTENT_SQ as isize, // (1,1,1)
  ]
}

/// Unit-axis offset (in samples) of each canonical corner from corner 0,
/// as `(dx, dy, dz)` each 0 or 1.
pub const CORNER_UNIT_OFFSETS: [(i32, i32, i32); 8] = [
  (0, 0, 0),
  (1, 0, 0),
  (0, 1, 0),
  (1, 1, 0),
  (0, 0, 1),
  (1, 0, 1),
  (0, 1, 1),
  (1, 1, 1),
];

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
