//! Regular polygonizer (C7): walks one LOD block's 16^3 cells, classifies
//! each by its case code, reuses prior vertices across shared edges, and
//! emits triangles.

use std::collections::HashMap;
use std::sync::Mutex;

use glam::Vec3;

use crate::block_cache::BlockCache;
use crate::case_tables::{regular_cell_data, regular_vertex_data};
use crate::cell::{estimate_normal, sample_material, Cell, CellBuilder, Level0Consistency, MaterialCache};
use crate::config::PolygonizeConfig;
use crate::constants::{CELLS_PER_BLOCK, CORNER_UNIT_OFFSETS};
use crate::grid::VoxelGrid;
use crate::polygon_map::{Statistics, Vertex};
use crate::types::MaterialId;

use super::TRANSITION_CELL_COEFF;

/// A cut edge's vertex is shared by every cell that touches it. Keyed by
/// the edge's lower-coordinate endpoint (world space) and the axis it runs
/// along; corner (endpoint) vertices use axis sentinel `3` so every edge
/// that terminates at the same lattice point converges on one vertex
/// regardless of which axis led there.
pub(crate) type ReuseKey = (i32, i32, i32, u8);

pub(crate) struct ReuseMap {
  slots: HashMap<ReuseKey, (u32, MaterialId)>,
}

impl ReuseMap {
  pub(crate) fn new() -> Self {
    Self { slots: HashMap::new() }
  }

  pub(crate) fn get(&self, key: ReuseKey, material: MaterialId) -> Option<u32> {
    self.slots.get(&key).filter(|&&(_, m)| m == material).map(|&(idx, _)| idx)
  }

  pub(crate) fn insert(&mut self, key: ReuseKey, index: u32, material: MaterialId) {
    self.slots.insert(key, (index, material));
  }
}

fn corner_world(base: [i32; 3], stride: i32, corner: u8) -> [i32; 3] {
  let (dx, dy, dz) = CORNER_UNIT_OFFSETS[corner as usize];
  [base[0] + dx * stride, base[1] + dy * stride, base[2] + dz * stride]
}

/// 8.8 fixed-point fraction locating the zero crossing from `v_lo` to `v_hi`.
pub(crate) fn edge_t(v_lo: i32, v_hi: i32) -> i32 {
  (v_lo << 8) / (v_lo - v_hi)
}

/// Refines an interior crossing by walking down the LOD binary chain,
/// halving the bracket at each step and resampling at the next-finer
/// stride, so the final position tracks the level-0 surface rather than
/// the coarse linear interpolant (§4.7 "surface-shifting correction").
fn refine_bracket(
  grid: &VoxelGrid,
  cache: &mut BlockCache,
  level: u32,
  mut lo: [i32; 3],
  mut hi: [i32; 3],
  mut v_lo: i32,
  mut v_hi: i32,
) -> ([i32; 3], [i32; 3], i32, i32) {
  let mut cur = level;
  while cur > 0 {
    let mid = [(lo[0] + hi[0]) / 2, (lo[1] + hi[1]) / 2, (lo[2] + hi[2]) / 2];
    let v_mid = crate::cell::sample_distance(grid, cache, cur - 1, mid) as i32;
    if (v_lo < 0) == (v_mid < 0) {
      lo = mid;
      v_lo = v_mid;
    } else {
      hi = mid;
      v_hi = v_mid;
    }
    cur -= 1;
  }
  (lo, hi, v_lo, v_hi)
}

/// Which of a block's 6 faces `local` (a cell's base coordinate within its
/// home block) touches, as a bitmask in the order [XNeg, XPos, YNeg, YPos,
/// ZNeg, ZPos].
fn boundary_mask(local: [u32; 3]) -> u8 {
  let max = (CELLS_PER_BLOCK - 1) as u32;
  let mut mask = 0u8;
  if local[0] == 0 {
    mask |= 1 << 0;
  }
  if local[0] == max {
    mask |= 1 << 1;
  }
  if local[1] == 0 {
    mask |= 1 << 2;
  }
  if local[1] == max {
    mask |= 1 << 3;
  }
  if local[2] == 0 {
    mask |= 1 << 4;
  }
  if local[2] == max {
    mask |= 1 << 5;
  }
  mask
}

pub(crate) const FACE_INWARD: [Vec3; 6] = [
  Vec3::new(1.0, 0.0, 0.0),
  Vec3::new(-1.0, 0.0, 0.0),
  Vec3::new(0.0, 1.0, 0.0),
  Vec3::new(0.0, -1.0, 0.0),
  Vec3::new(0.0, 0.0, 1.0),
  Vec3::new(0.0, 0.0, -1.0),
];

pub(crate) fn secondary_position(position: Vec3, mask: u8, stride: f32) -> Vec3 {
  let mut shift = Vec3::ZERO;
  for (face, inward) in FACE_INWARD.iter().enumerate() {
    if mask & (1 << face) != 0 {
      shift += *inward * TRANSITION_CELL_COEFF * stride;
    }
  }
  position + shift
}

pub struct RegularResult {
  pub vertices: Vec<Vertex>,
  pub indices: Vec<u32>,
  pub statistics: Statistics,
}

/// Polygonizes one block's `CELLS_PER_BLOCK^3` cells at `level`.
///
/// `block_coord` is the block's coordinate in the level-specific block grid
/// (`(W/B)/2^level` blocks per side) — not the underlying grid's level-0
/// block coordinate, since higher levels partition world space into fewer,
/// larger blocks.
#[allow(clippy::too_many_arguments)]
pub fn polygonize_block(
  grid: &VoxelGrid,
  cache: &mut BlockCache,
  level0: &Mutex<Level0Consistency>,
  materials: &Mutex<MaterialCache>,
  level: u32,
  block_coord: (u32, u32, u32),
  config: &PolygonizeConfig,
) -> RegularResult {
  let builder = CellBuilder::new(grid);
  let (bx, by, bz) = block_coord;
  let stride = 1u32 << level;
  let block_origin = [
    (bx * crate::constants::BLOCK_EXTENT as u32 * stride) as i32,
    (by * crate::constants::BLOCK_EXTENT as u32 * stride) as i32,
    (bz * crate::constants::BLOCK_EXTENT as u32 * stride) as i32,
  ];

  let mut vertices = Vec::new();
  let mut indices = Vec::new();
  let mut statistics = Statistics::default();
  let mut reuse = ReuseMap::new();

  for lz in 0..CELLS_PER_BLOCK as i32 {
    for ly in 0..CELLS_PER_BLOCK as i32 {
      for lx in 0..CELLS_PER_BLOCK as i32 {
        let base = [
          block_origin[0] + lx * stride as i32,
          block_origin[1] + ly * stride as i32,
          block_origin[2] + lz * stride as i32,
        ];
        let mut cell = builder.build_corners(cache, level, base);
        let case = cell.case_code();

        if cell.is_trivial() {
          statistics.trivial_cells += 1;
          continue;
        }
        statistics.non_trivial_cells += 1;
        statistics.case_histogram[case as usize] += 1;

        builder.resolve_material(cache, level0, materials, &mut cell);

        let cell_data = regular_cell_data(case);
        if cell_data.vertex_count == 0 {
          continue;
        }
        let (descriptors, n) = regular_vertex_data(case);

        let mask = boundary_mask(cell.local);
        let mut local_indices = [0u32; 12];
        for (i, desc) in descriptors[..n].iter().enumerate() {
          local_indices[i] = resolve_vertex(
            grid,
            cache,
            &cell,
            base,
            stride as i32,
            desc.edge_corner_lo,
            desc.edge_corner_hi,
            mask,
            &mut reuse,
            &mut vertices,
            config,
          );
        }

        for t in 0..cell_data.triangle_count as usize {
          let a = local_indices[cell_data.vertex_index[t * 3] as usize];
          let b = local_indices[cell_data.vertex_index[t * 3 + 1] as usize];
          let c = local_indices[cell_data.vertex_index[t * 3 + 2] as usize];
          if is_degenerate(&vertices, a, b, c) {
            statistics.degenerate_triangles_removed += 1;
            continue;
          }
          indices.push(a);
          indices.push(b);
          indices.push(c);
        }
      }
    }
  }

  statistics.blocks_processed = 1;
  RegularResult { vertices, indices, statistics }
}

pub(crate) fn is_degenerate(vertices: &[Vertex], a: u32, b: u32, c: u32) -> bool {
  let pa = Vec3::from(vertices[a as usize].position);
  let pb = Vec3::from(vertices[b as usize].position);
  let pc = Vec3::from(vertices[c as usize].position);
  (pb - pa).cross(pc - pa).length_squared() < f32::EPSILON
}

#[allow(clippy::too_many_arguments)]
fn resolve_vertex(
  grid: &VoxelGrid,
  cache: &mut BlockCache,
  cell: &Cell,
  base: [i32; 3],
  stride: i32,
  corner_lo: u8,
  corner_hi: u8,
  boundary: u8,
  reuse: &mut ReuseMap,
  vertices: &mut Vec<Vertex>,
  config: &PolygonizeConfig,
) -> u32 {
  let v_lo = cell.corner_distance[corner_lo as usize] as i32;
  let v_hi = cell.corner_distance[corner_hi as usize] as i32;
  let p_lo = corner_world(base, stride, corner_lo);
  let p_hi = corner_world(base, stride, corner_hi);
  let t = edge_t(v_lo, v_hi);
  let is_endpoint = t & 0xFF == 0;

  let key: ReuseKey = if is_endpoint {
    let corner = if t == 0 { corner_lo } else { corner_hi };
    let p = corner_world(base, stride, corner);
    (p[0], p[1], p[2], 3)
  } else {
    let axis = (0..3u8).find(|&a| p_lo[a as usize] != p_hi[a as usize]).unwrap_or(0);
    (p_lo[0], p_lo[1], p_lo[2], axis)
  };

  if let Some(idx) = reuse.get(key, cell.material) {
    return idx;
  }

  let vertex = if is_endpoint {
    let corner = if t == 0 { corner_lo } else { corner_hi };
    let p = corner_world(base, stride, corner);
    let normal = estimate_normal(grid, cache, cell.level, p, stride);
    let position = Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32);
    Vertex {
      position: position.to_array(),
      normal,
      secondary_position: secondary_position(position, boundary, stride as f32).extend(f32::from_bits(0)).to_array(),
      material: cell.material,
      secondary_material: cell.material,
      blend: cell.blend,
      textures: [0; 6],
    }
  } else {
    let (mut lo, mut hi, mut vl, mut vh) = (p_lo, p_hi, v_lo, v_hi);
    if config.surface_shifting_correction && cell.level > 0 {
      (lo, hi, vl, vh) = refine_bracket(grid, cache, cell.level, lo, hi, vl, vh);
    }
    let t = edge_t(vl, vh);
    let fr = t as f32 / 256.0;
    let pos_lo = Vec3::new(lo[0] as f32, lo[1] as f32, lo[2] as f32);
    let pos_hi = Vec3::new(hi[0] as f32, hi[1] as f32, hi[2] as f32);
    let position = pos_lo + (pos_hi - pos_lo) * fr;

    let n_lo = Vec3::from(estimate_normal(grid, cache, cell.level, lo, stride));
    let n_hi = Vec3::from(estimate_normal(grid, cache, cell.level, hi, stride));
    let normal = (n_lo + (n_hi - n_lo) * fr).normalize_or_zero();

    let (m_lo, b_lo) = sample_material(grid, cache, lo);
    let (m_hi, b_hi) = sample_material(grid, cache, hi);
    let (material, blend) = if m_lo == m_hi && m_lo == cell.material {
      (cell.material, (b_lo as f32 + (b_hi as f32 - b_lo as f32) * fr) as u8)
    } else {
      (cell.material, cell.blend)
    };
    // The edge's other sampled material, for MaterialMap's secondary texture
    // triplet; equal to `material` away from a material boundary.
    let secondary_material = if m_lo != material {
      m_lo
    } else if m_hi != material {
      m_hi
    } else {
      material
    };

    Vertex {
      position: position.to_array(),
      normal: normal.to_array(),
      secondary_position: secondary_position(position, boundary, stride as f32).extend(f32::from_bits(0)).to_array(),
      material,
      secondary_material,
      blend,
      textures: [0; 6],
    }
  };

  let idx = vertices.len() as u32;
  vertices.push(vertex);
  reuse.insert(key, idx, cell.material);
  idx
}

#[cfg(test)]
#[path = "regular_test.rs"]
mod regular_test;
