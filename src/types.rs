//! Core sample types shared by the block codec, grid, and polygonizer.

/// Signed distance sample, clamped to `[-4, 4]`.
/// Negative = inside the surface, non-negative = outside.
pub type SdfSample = i8;

/// Material identifier. [`MATERIAL_EMPTY`] marks "no material assigned".
pub type MaterialId = u8;

/// Per-voxel material blend weight, `0..=255`.
pub type BlendFactor = u8;

/// Reserved material id meaning "no material" / "no contributor".
pub const MATERIAL_EMPTY: MaterialId = 255;

/// Inclusive clamp range for distance samples.
pub const DISTANCE_MIN: i32 = -4;
pub const DISTANCE_MAX: i32 = 4;

/// Rounds half-away-from-zero and clamps to `[DISTANCE_MIN, DISTANCE_MAX]`.
///
/// Used when quantizing a continuous surface sample into a stored
/// [`SdfSample`] (grid construction from a [`crate::surface_source::SurfaceSource`]).
#[inline]
pub fn quantize_distance(value: f32) -> SdfSample {
  let rounded = if value >= 0.0 {
    (value + 0.5).floor()
  } else {
    (value - 0.5).ceil()
  };
  rounded.clamp(DISTANCE_MIN as f32, DISTANCE_MAX as f32) as SdfSample
}

/// Sign bit of a distance sample as a Transvoxel "case bit": inside (negative)
/// maps to 1, outside (non-negative) maps to 0.
#[inline(always)]
pub const fn case_bit(distance: SdfSample) -> u8 {
  ((distance as i32) >> 31) as u8 & 1
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
