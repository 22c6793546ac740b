//! Cell builder (C6): materializes a logical cell at a (level, base)
//! coordinate, and the two-tier material cache it reads and feeds.

use std::collections::HashMap;
use std::sync::Mutex;

use smallvec::SmallVec;

use crate::block_cache::BlockCache;
use crate::constants::{coord_to_index, CORNER_UNIT_OFFSETS};
use crate::grid::VoxelGrid;
use crate::types::{case_bit, MaterialId, SdfSample, MATERIAL_EMPTY};

/// A logical cell: eight corner samples plus the resolved material for its
/// interior, at a given LOD level.
#[derive(Clone, Debug)]
pub struct Cell {
  /// World-space coordinate of corner 0.
  pub base: [i32; 3],
  pub level: u32,
  /// `2^level`.
  pub stride: u32,
  pub corner_distance: [SdfSample; 8],
  /// True if any of the 8 corners resolved to a different block than the
  /// cell's own (home) block.
  pub on_block_boundary: bool,
  /// `base`'s offset inside its home block.
  pub local: [u32; 3],
  pub material: MaterialId,
  pub blend: u8,
}

impl Cell {
  /// 8-bit case code: the concatenation of corner sign bits, corner 0 in
  /// bit 0.
  pub fn case_code(&self) -> u8 {
    let mut code = 0u8;
    for (i, &d) in self.corner_distance.iter().enumerate() {
      code |= case_bit(d) << i;
    }
    code
  }

  /// A cell carries no surface crossing if its case code equals corner 7's
  /// sign broadcast across all 8 bits (all corners agree with corner 7).
  pub fn is_trivial(&self) -> bool {
    let broadcast = 0u8.wrapping_sub(case_bit(self.corner_distance[7]));
    self.case_code() ^ broadcast == 0
  }
}

/// Level-0 consistency bitmap: one bit per cell of each level-0 block, set
/// once that cell's per-voxel material has been read and is authoritative
/// for higher-level majority voting.
#[derive(Default)]
pub struct Level0Consistency {
  blocks: HashMap<u32, Vec<bool>>,
}

impl Level0Consistency {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn mark(&mut self, block_id: u32, cell_id: usize) {
    let bits = self.blocks.entry(block_id).or_insert_with(|| vec![false; crate::constants::BLOCK_VOLUME]);
    bits[cell_id] = true;
  }

  pub fn is_set(&self, block_id: u32, cell_id: usize) -> bool {
    self.blocks.get(&block_id).map(|bits| bits[cell_id]).unwrap_or(false)
  }
}

/// Per-level (>= 1) resolved material table: per cell, the majority-voted
/// `(id, blend)` derived from its eight level-below children.
#[derive(Default)]
pub struct MaterialCache {
  // levels[0] holds level 1's table, levels[1] holds level 2's, and so on.
  levels: Vec<HashMap<u32, Vec<(MaterialId, u8)>>>,
}

impl MaterialCache {
  pub fn new() -> Self {
    Self::default()
  }

  fn level_index(level: u32) -> usize {
    debug_assert!(level >= 1, "level 0 material lives in the per-voxel arrays, not this cache");
    (level - 1) as usize
  }

  fn ensure_level(&mut self, level: u32) -> &mut HashMap<u32, Vec<(MaterialId, u8)>> {
    let idx = Self::level_index(level);
    while self.levels.len() <= idx {
      self.levels.push(HashMap::new());
    }
    &mut self.levels[idx]
  }

  pub fn set(&mut self, level: u32, block_id: u32, cell_id: usize, value: (MaterialId, u8)) {
    let table = self.ensure_level(level);
    let cells = table.entry(block_id).or_insert_with(|| vec![(MATERIAL_EMPTY, 0); crate::constants::BLOCK_VOLUME]);
    cells[cell_id] = value;
  }

  pub fn get(&self, level: u32, block_id: u32, cell_id: usize) -> (MaterialId, u8) {
    let idx = Self::level_index(level);
    self
      .levels
      .get(idx)
      .and_then(|table| table.get(&block_id))
      .map(|cells| cells[cell_id])
      .unwrap_or((MATERIAL_EMPTY, 0))
  }
}

/// Fetches a single corner's distance sample at an arbitrary world
/// coordinate and LOD level, through the block cache.
pub fn sample_distance(grid: &VoxelGrid, cache: &mut BlockCache, level: u32, world: [i32; 3]) -> SdfSample {
  let (bc, off) = BlockCache::locate(grid, world);
  let bid = grid.block_id(bc[0], bc[1], bc[2]);
  let data = cache.distance_block(grid, level, bid);
  data[coord_to_index(off[0] as usize, off[1] as usize, off[2] as usize)]
}

/// Fetches a single voxel's `(material, blend)` at an arbitrary world
/// coordinate, through the block cache.
pub fn sample_material(grid: &VoxelGrid, cache: &mut BlockCache, world: [i32; 3]) -> (MaterialId, u8) {
  let (bc, off) = BlockCache::locate(grid, world);
  let bid = grid.block_id(bc[0], bc[1], bc[2]);
  let cid = coord_to_index(off[0] as usize, off[1] as usize, off[2] as usize);
  let (material, blend) = cache.material_block(grid, bid);
  (material[cid], blend[cid])
}

/// Central-difference gradient of the distance field at `world`, normalized
/// to a unit surface normal (zero gradient falls back to `+Y`).
pub fn estimate_normal(grid: &VoxelGrid, cache: &mut BlockCache, level: u32, world: [i32; 3], stride: i32) -> [f32; 3] {
  let dx = sample_distance(grid, cache, level, [world[0] + stride, world[1], world[2]]) as f32
    - sample_distance(grid, cache, level, [world[0] - stride, world[1], world[2]]) as f32;
  let dy = sample_distance(grid, cache, level, [world[0], world[1] + stride, world[2]]) as f32
    - sample_distance(grid, cache, level, [world[0], world[1] - stride, world[2]]) as f32;
  let dz = sample_distance(grid, cache, level, [world[0], world[1], world[2] + stride]) as f32
    - sample_distance(grid, cache, level, [world[0], world[1], world[2] - stride]) as f32;
  let n = glam::Vec3::new(dx, dy, dz);
  if n.length_squared() > 0.0 {
    n.normalize().to_array()
  } else {
    [0.0, 1.0, 0.0]
  }
}

pub struct CellBuilder<'a> {
  pub grid: &'a VoxelGrid,
}

impl<'a> CellBuilder<'a> {
  pub fn new(grid: &'a VoxelGrid) -> Self {
    Self { grid }
  }

  /// Builds a cell's corner distances only (cheap; enough for the case code
  /// and trivial test). Material is resolved separately, only for
  /// non-trivial cells.
  pub fn build_corners(&self, cache: &mut BlockCache, level: u32, base: [i32; 3]) -> Cell {
    let stride = 1u32 << level;
    let (home_block, local) = BlockCache::locate(self.grid, base);
    let home_id = self.grid.block_id(home_block[0], home_block[1], home_block[2]);

    let mut corner_distance = [0i8; 8];
    let mut on_block_boundary = false;
    for (i, &(dx, dy, dz)) in CORNER_UNIT_OFFSETS.iter().enumerate() {
      let world = [
        base[0] + dx * stride as i32,
        base[1] + dy * stride as i32,
        base[2] + dz * stride as i32,
      ];
      let (bc, off) = BlockCache::locate(self.grid, world);
      let bid = self.grid.block_id(bc[0], bc[1], bc[2]);
      if bid != home_id {
        on_block_boundary = true;
      }
      let data = cache.distance_block(self.grid, level, bid);
      corner_distance[i] = data[coord_to_index(off[0] as usize, off[1] as usize, off[2] as usize)];
    }

    Cell {
      base,
      level,
      stride,
      corner_distance,
      on_block_boundary,
      local,
      material: MATERIAL_EMPTY,
      blend: 0,
    }
  }

  /// Resolves and stores `cell`'s material, following the cache hierarchy:
  /// at level 0 it's the voxel's own material (and the consistency bit is
  /// set); above that, it's the majority material among the 8 children one
  /// level down, falling back to `MATERIAL_EMPTY` for children with no
  /// confirmed contribution.
  ///
  /// `level0`/`materials` are shared across every block a run dispatches in
  /// parallel at a given level; each cell only ever reads a *lower* level's
  /// slot and writes its own, so contention is rare, but a lock is still
  /// needed since the underlying tables are plain `HashMap`s, not a
  /// lock-free partitioned structure.
  pub fn resolve_material(
    &self,
    cache: &mut BlockCache,
    level0: &Mutex<Level0Consistency>,
    materials: &Mutex<MaterialCache>,
    cell: &mut Cell,
  ) {
    let (home_block, local) = BlockCache::locate(self.grid, cell.base);
    let home_id = self.grid.block_id(home_block[0], home_block[1], home_block[2]);
    let home_cell_id = coord_to_index(local[0] as usize, local[1] as usize, local[2] as usize);

    if cell.level == 0 {
      let (material, blend) = cache.material_block(self.grid, home_id);
      cell.material = material[home_cell_id];
      cell.blend = blend[home_cell_id];
      level0.lock().unwrap().mark(home_id, home_cell_id);
      return;
    }

    let half = cell.stride / 2;
    let mut histogram: SmallVec<[(MaterialId, u32, u32); 8]> = SmallVec::new();
    for &(dx, dy, dz) in &CORNER_UNIT_OFFSETS {
      let child_base = [
        cell.base[0] + dx * half as i32,
        cell.base[1] + dy * half as i32,
        cell.base[2] + dz * half as i32,
      ];
      let (bc, off) = BlockCache::locate(self.grid, child_base);
      let bid = self.grid.block_id(bc[0], bc[1], bc[2]);
      let cid = coord_to_index(off[0] as usize, off[1] as usize, off[2] as usize);

      let (child_material, child_blend) = if cell.level == 1 {
        if level0.lock().unwrap().is_set(bid, cid) {
          let (material, blend) = cache.material_block(self.grid, bid);
          (material[cid], blend[cid])
        } else {
          (MATERIAL_EMPTY, 0)
        }
      } else {
        materials.lock().unwrap().get(cell.level - 1, bid, cid)
      };

      if child_material != MATERIAL_EMPTY {
        match histogram.iter_mut().find(|(id, _, _)| *id == child_material) {
          Some(entry) => {
            entry.1 += 1;
            entry.2 += child_blend as u32;
          }
          None => histogram.push((child_material, 1, child_blend as u32)),
        }
      }
    }

    // First-wins on ties (matches `std::max_element`, not `Iterator::max_by_key`'s
    // last-wins), so an evenly split histogram resolves the same way the
    // original material-promotion rule does.
    let mut best: Option<&(MaterialId, u32, u32)> = None;
    for entry in &histogram {
      match best {
        Some(b) if entry.1 <= b.1 => {}
        _ => best = Some(entry),
      }
    }
    let (material, blend) =
      best.map(|&(id, count, sum)| (id, (sum / count) as u8)).unwrap_or((MATERIAL_EMPTY, 0));

    cell.material = material;
    cell.blend = blend;
    materials.lock().unwrap().set(cell.level, home_id, home_cell_id, (material, blend));
  }
}

#[cfg(test)]
#[path = "cell_test.rs"]
mod cell_test;
