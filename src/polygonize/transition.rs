//! Transition polygonizer (C8): for each of a block's 6 faces, walks a
//! `CELLS_PER_BLOCK^2` grid of transition cells bridging this block's
//! resolution to its higher-resolution neighbor one level down, and emits
//! a seam mesh that keeps the two LODs watertight.
//!
//! The published Transvoxel transition tables aren't available anywhere in
//! this crate's reference material (see `case_tables.rs`'s module doc for
//! the same gap on the regular-cell side). Two further simplifications
//! follow from that, both documented in DESIGN.md:
//! - `case_tables::transition_vertex_data` only ever produces edges between
//!   the 9 fine corners (0..8); the literal spec text describes some edges
//!   terminating at the 4 duplicated coarse corners (9..12) and an
//!   inward-shift rule keyed on "corner index >= 9". Since no edge in our
//!   table ever reaches those indices, that rule is generalized here to a
//!   plain world-position boundary check (§4.7's `boundary_mask`, reused
//!   verbatim) applied to every emitted vertex, not just a subset.
//! - Vertex reuse uses the same position-keyed map as the regular
//!   polygonizer instead of the two-ring bitmask scheme described in the
//!   spec; the outcome (same physical edge converges on one vertex) is the
//!   same, the bookkeeping is just simpler.

use glam::Vec3;

use crate::block_cache::BlockCache;
use crate::case_tables::{transition_cell_data, transition_vertex_data, TRANSITION_CORNER_WEIGHT};
use crate::cell::{estimate_normal, sample_distance, sample_material};
use crate::config::PolygonizeConfig;
use crate::constants::CELLS_PER_BLOCK;
use crate::grid::VoxelGrid;
use crate::polygon_map::{Statistics, TransitionFaceId, Vertex, ALL_TRANSITION_FACES};

use super::regular::{edge_t, is_degenerate, secondary_position, ReuseKey, ReuseMap, FACE_INWARD};
use super::TRANSITION_CELL_COEFF;

struct FaceDesc {
  normal_axis: usize,
  sign: i32,
  u_axis: usize,
  v_axis: usize,
  reverse_winding: bool,
}

const FACES: [FaceDesc; 6] = [
  FaceDesc { normal_axis: 0, sign: 1, u_axis: 1, v_axis: 2, reverse_winding: false },
  FaceDesc { normal_axis: 0, sign: -1, u_axis: 1, v_axis: 2, reverse_winding: true },
  FaceDesc { normal_axis: 1, sign: 1, u_axis: 0, v_axis: 2, reverse_winding: false },
  FaceDesc { normal_axis: 1, sign: -1, u_axis: 0, v_axis: 2, reverse_winding: true },
  FaceDesc { normal_axis: 2, sign: 1, u_axis: 0, v_axis: 1, reverse_winding: false },
  FaceDesc { normal_axis: 2, sign: -1, u_axis: 0, v_axis: 1, reverse_winding: true },
];

fn has_neighbor(blocks_at_level: (u32, u32, u32), block_coord: (u32, u32, u32), face: &FaceDesc) -> bool {
  let coord = [block_coord.0, block_coord.1, block_coord.2];
  let count = [blocks_at_level.0, blocks_at_level.1, blocks_at_level.2];
  if face.sign > 0 {
    coord[face.normal_axis] + 1 < count[face.normal_axis]
  } else {
    coord[face.normal_axis] > 0
  }
}

/// World-position boundary mask, identical in spirit to the regular
/// polygonizer's `boundary_mask` but taking an absolute world coordinate
/// rather than a cell-local one (transition corners don't all line up on
/// the coarse cell lattice).
fn position_boundary_mask(world: [i32; 3], block_origin: [i32; 3], extent: i32) -> u8 {
  let mut mask = 0u8;
  for axis in 0..3 {
    if world[axis] == block_origin[axis] {
      mask |= 1 << (axis * 2);
    }
    if world[axis] == block_origin[axis] + extent {
      mask |= 1 << (axis * 2 + 1);
    }
  }
  mask
}

pub struct TransitionResult {
  pub vertices: [Vec<Vertex>; 6],
  pub indices: [Vec<u32>; 6],
  pub statistics: Statistics,
}

/// Polygonizes every one of a block's faces that has a finer-resolution
/// neighbor, producing up to 6 transition meshes.
///
/// `block_coord`/`blocks_at_level` follow the level-specific block grid, as
/// in [`super::regular::polygonize_block`].
pub fn polygonize_block(
  grid: &VoxelGrid,
  cache: &mut BlockCache,
  level: u32,
  block_coord: (u32, u32, u32),
  blocks_at_level: (u32, u32, u32),
  config: &PolygonizeConfig,
) -> TransitionResult {
  let mut vertices: [Vec<Vertex>; 6] = Default::default();
  let mut indices: [Vec<u32>; 6] = Default::default();
  let mut statistics = Statistics::default();

  let stride = 1i32 << level;
  let fine_stride = stride / 2;
  let extent = CELLS_PER_BLOCK as i32 * stride;
  let block_origin = [
    block_coord.0 as i32 * CELLS_PER_BLOCK as i32 * stride,
    block_coord.1 as i32 * CELLS_PER_BLOCK as i32 * stride,
    block_coord.2 as i32 * CELLS_PER_BLOCK as i32 * stride,
  ];

  for (face_id, face) in ALL_TRANSITION_FACES.iter().zip(FACES.iter()) {
    if !has_neighbor(blocks_at_level, block_coord, face) {
      continue;
    }
    let face_index = face_id.index();
    let normal_coord = if face.sign > 0 { block_origin[face.normal_axis] + extent } else { block_origin[face.normal_axis] };

    let mut reuse = ReuseMap::new();

    for row in 0..CELLS_PER_BLOCK as i32 {
      for col in 0..CELLS_PER_BLOCK as i32 {
        let u_base = block_origin[face.u_axis] + col * stride;
        let v_base = block_origin[face.v_axis] + row * stride;

        let mut positions = [[0i32; 3]; 9];
        let mut values = [0i32; 9];
        for r in 0..3 {
          for c in 0..3 {
            let idx = r * 3 + c;
            let mut world = [0i32; 3];
            world[face.u_axis] = u_base + c as i32 * fine_stride;
            world[face.v_axis] = v_base + r as i32 * fine_stride;
            world[face.normal_axis] = normal_coord;
            positions[idx] = world;
            values[idx] = sample_distance(grid, cache, level.saturating_sub(1), world) as i32;
          }
        }

        let mut case: u16 = 0;
        for (i, &v) in values.iter().enumerate() {
          if v < 0 {
            case |= TRANSITION_CORNER_WEIGHT[i];
          }
        }
        if case == 0 || case == 511 {
          statistics.trivial_cells += 1;
          continue;
        }
        statistics.non_trivial_cells += 1;

        let cell_data = transition_cell_data(case);
        if cell_data.vertex_count == 0 {
          continue;
        }
        let (descriptors, n) = transition_vertex_data(case);

        let mut local_indices = [0u32; 12];
        for (i, desc) in descriptors[..n].iter().enumerate() {
          local_indices[i] = resolve_vertex(
            grid,
            cache,
            level,
            fine_stride,
            positions,
            values,
            block_origin,
            extent,
            face_index,
            desc.edge_corner_lo as usize,
            desc.edge_corner_hi as usize,
            &mut reuse,
            &mut vertices[face_index],
            config,
          );
        }

        for t in 0..cell_data.triangle_count as usize {
          let mut a = local_indices[cell_data.vertex_index[t * 3] as usize];
          let mut b = local_indices[cell_data.vertex_index[t * 3 + 1] as usize];
          let c = local_indices[cell_data.vertex_index[t * 3 + 2] as usize];
          if face.reverse_winding {
            std::mem::swap(&mut a, &mut b);
          }
          if is_degenerate(&vertices[face_index], a, b, c) {
            statistics.degenerate_triangles_removed += 1;
            continue;
          }
          indices[face_index].push(a);
          indices[face_index].push(b);
          indices[face_index].push(c);
        }
      }
    }
  }

  statistics.blocks_processed = 1;
  TransitionResult { vertices, indices, statistics }
}

#[allow(clippy::too_many_arguments)]
fn resolve_vertex(
  grid: &VoxelGrid,
  cache: &mut BlockCache,
  level: u32,
  fine_stride: i32,
  positions: [[i32; 3]; 9],
  values: [i32; 9],
  block_origin: [i32; 3],
  extent: i32,
  face_index: usize,
  corner_lo: usize,
  corner_hi: usize,
  reuse: &mut ReuseMap,
  vertices: &mut Vec<Vertex>,
  config: &PolygonizeConfig,
) -> u32 {
  let v_lo = values[corner_lo];
  let v_hi = values[corner_hi];
  let p_lo = positions[corner_lo];
  let p_hi = positions[corner_hi];
  let t = edge_t(v_lo, v_hi);
  let is_endpoint = t & 0xFF == 0;

  let key: ReuseKey = if is_endpoint {
    let p = if t == 0 { p_lo } else { p_hi };
    (p[0], p[1], p[2], 3)
  } else {
    let axis = (0..3u8).find(|&a| p_lo[a as usize] != p_hi[a as usize]).unwrap_or(0);
    (p_lo[0], p_lo[1], p_lo[2], axis)
  };

  let (material, _) = sample_material(grid, cache, if t == 0 { p_lo } else { p_hi });
  if let Some(idx) = reuse.get(key, material) {
    return idx;
  }

  let fine_level = level.saturating_sub(1);
  let vertex = if is_endpoint {
    let p = if t == 0 { p_lo } else { p_hi };
    build_vertex(grid, cache, fine_level, fine_stride, p, block_origin, extent, face_index, config)
  } else {
    let fr = t as f32 / 256.0;
    let pos_lo = Vec3::new(p_lo[0] as f32, p_lo[1] as f32, p_lo[2] as f32);
    let pos_hi = Vec3::new(p_hi[0] as f32, p_hi[1] as f32, p_hi[2] as f32);
    let raw_position = pos_lo + (pos_hi - pos_lo) * fr;

    let n_lo = Vec3::from(estimate_normal(grid, cache, fine_level, p_lo, fine_stride));
    let n_hi = Vec3::from(estimate_normal(grid, cache, fine_level, p_hi, fine_stride));
    let normal = (n_lo + (n_hi - n_lo) * fr).normalize_or_zero();

    let (m_lo, b_lo) = sample_material(grid, cache, p_lo);
    let (m_hi, b_hi) = sample_material(grid, cache, p_hi);
    let (material, blend) = if m_lo == m_hi {
      (m_lo, (b_lo as f32 + (b_hi as f32 - b_lo as f32) * fr) as u8)
    } else {
      (m_lo, b_lo)
    };
    let secondary_material = if m_hi != material { m_hi } else { material };

    let mask = position_boundary_mask(raw_position.as_ivec3().to_array(), block_origin, extent);
    let primary = if config.surface_shifting_correction && mask.count_ones() == 1 {
      raw_position + FACE_INWARD[mask.trailing_zeros() as usize] * TRANSITION_CELL_COEFF * fine_stride as f32
    } else {
      raw_position
    };
    let secondary = secondary_position(raw_position, mask, fine_stride as f32);

    Vertex {
      position: primary.to_array(),
      normal: normal.to_array(),
      secondary_position: secondary.extend(f32::from_bits(mask as u32)).to_array(),
      material,
      secondary_material,
      blend,
      textures: [0; 6],
    }
  };

  let idx = vertices.len() as u32;
  vertices.push(vertex);
  reuse.insert(key, idx, material);
  idx
}

fn build_vertex(
  grid: &VoxelGrid,
  cache: &mut BlockCache,
  fine_level: u32,
  fine_stride: i32,
  p: [i32; 3],
  block_origin: [i32; 3],
  extent: i32,
  _face_index: usize,
  config: &PolygonizeConfig,
) -> Vertex {
  let normal = estimate_normal(grid, cache, fine_level, p, fine_stride);
  let (material, blend) = sample_material(grid, cache, p);
  let position = Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32);
  let mask = position_boundary_mask(p, block_origin, extent);
  let primary = if config.surface_shifting_correction && mask.count_ones() == 1 {
    position + FACE_INWARD[mask.trailing_zeros() as usize] * TRANSITION_CELL_COEFF * fine_stride as f32
  } else {
    position
  };
  let secondary = secondary_position(position, mask, fine_stride as f32);
  Vertex {
    position: primary.to_array(),
    normal,
    secondary_position: secondary.extend(f32::from_bits(mask as u32)).to_array(),
    material,
    secondary_material: material,
    blend,
    textures: [0; 6],
  }
}

#[cfg(test)]
#[path = "transition_test.rs"]
mod transition_test;
