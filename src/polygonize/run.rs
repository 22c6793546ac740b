//! Run driver (C9): orchestrates full and incremental polygonization runs
//! across every LOD level, fans block work out with `rayon` the same way
//! the original mesh-dispatch pipeline did, and concatenates results into
//! one [`PolygonMap`].

use std::sync::Mutex;

use rayon::prelude::*;

use crate::block_cache::BlockCache;
use crate::cell::{Level0Consistency, MaterialCache};
use crate::config::PolygonizeConfig;
use crate::constants::BLOCK_EXTENT;
use crate::grid::VoxelGrid;
use crate::polygon_map::{PolygonBlock, PolygonMap, Statistics};

use super::{regular, transition};

/// Min/max world-space corners (inclusive) of a dirty region, in the
/// grid's internal Z-up convention.
#[derive(Clone, Copy, Debug)]
pub struct ModificationDescriptor {
  pub min: [i32; 3],
  pub max: [i32; 3],
}

fn level_count(grid: &VoxelGrid) -> u32 {
  let blocks_per_side = grid.blocks_x().max(grid.blocks_y()).max(grid.blocks_z());
  32 - blocks_per_side.max(1).leading_zeros()
}

fn blocks_at_level(grid: &VoxelGrid, level: u32) -> (u32, u32, u32) {
  let shift = level;
  (
    (grid.blocks_x() >> shift).max(1),
    (grid.blocks_y() >> shift).max(1),
    (grid.blocks_z() >> shift).max(1),
  )
}

/// True if the level-0 block at `(bx, by, bz)` and all 27 neighbors
/// (including itself) are flagged empty.
fn neighborhood_is_empty(grid: &VoxelGrid, bx: i32, by: i32, bz: i32) -> bool {
  for dz in -1..=1 {
    for dy in -1..=1 {
      for dx in -1..=1 {
        let (nx, ny, nz) = (bx + dx, by + dy, bz + dz);
        if nx < 0 || ny < 0 || nz < 0 {
          continue;
        }
        let (nx, ny, nz) = (nx as u32, ny as u32, nz as u32);
        if nx >= grid.blocks_x() || ny >= grid.blocks_y() || nz >= grid.blocks_z() {
          continue;
        }
        let id = grid.block_id(nx, ny, nz);
        if !grid.is_block_empty(id).unwrap_or(false) {
          return false;
        }
      }
    }
  }
  true
}

fn block_id_at_level(blocks: (u32, u32, u32), coord: (u32, u32, u32)) -> u32 {
  (coord.2 * blocks.1 + coord.1) * blocks.0 + coord.0
}

#[allow(clippy::too_many_arguments)]
fn build_block(
  grid: &VoxelGrid,
  level: u32,
  levels: u32,
  coord: (u32, u32, u32),
  blocks: (u32, u32, u32),
  level0: &Mutex<Level0Consistency>,
  materials: &Mutex<MaterialCache>,
  config: &PolygonizeConfig,
) -> Option<(PolygonBlock, Statistics)> {
  if level == 0 {
    let (bx, by, bz) = coord;
    if neighborhood_is_empty(grid, bx as i32, by as i32, bz as i32) {
      return None;
    }
  }

  let mut cache = BlockCache::new(config.block_cache_capacity);
  let regular = regular::polygonize_block(grid, &mut cache, level0, materials, level, coord, config);

  let mut statistics = regular.statistics;
  let mut block = PolygonBlock {
    block_id: block_id_at_level(blocks, coord),
    level,
    vertices: regular.vertices,
    indices: regular.indices,
    transition_vertices: Default::default(),
    transition_indices: Default::default(),
  };

  if level > 0 && level < levels - 1 {
    let transition = transition::polygonize_block(grid, &mut cache, level, coord, blocks, config);
    statistics.merge(&transition.statistics);
    block.transition_vertices = transition.vertices;
    block.transition_indices = transition.indices;
  }

  Some((block, statistics))
}

fn block_coords_at_level(blocks: (u32, u32, u32)) -> Vec<(u32, u32, u32)> {
  let mut out = Vec::with_capacity((blocks.0 * blocks.1 * blocks.2) as usize);
  for bz in 0..blocks.2 {
    for by in 0..blocks.1 {
      for bx in 0..blocks.0 {
        out.push((bx, by, bz));
      }
    }
  }
  out
}

/// Polygonizes every level of `grid` from scratch.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "polygonize::run_full"))]
pub fn run_full(grid: &VoxelGrid, config: &PolygonizeConfig) -> PolygonMap {
  let levels = level_count(grid);
  let extent = [grid.width(), grid.depth(), grid.height()];
  let mut map = PolygonMap::new(extent, levels as usize);

  let level0 = Mutex::new(Level0Consistency::new());
  let materials = Mutex::new(MaterialCache::new());

  for level in 0..levels {
    let blocks = blocks_at_level(grid, level);
    let coords = block_coords_at_level(blocks);

    #[cfg(feature = "tracing")]
    let level_start = web_time::Instant::now();

    let results: Vec<_> = {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("polygonize_level", level).entered();
      coords
        .into_par_iter()
        .filter_map(|coord| build_block(grid, level, levels, coord, blocks, &level0, &materials, config))
        .collect()
    };

    #[cfg(feature = "tracing")]
    tracing::info!(
      level,
      blocks = results.len(),
      elapsed_us = level_start.elapsed().as_micros() as u64,
      "level polygonized"
    );

    for (block, stats) in results {
      map.statistics.merge(&stats);
      map.modified_block_ids.push(block.block_id);
      map.levels[level as usize].push(block);
    }
  }

  map.material_cache = materials.into_inner().unwrap();
  map.level0_consistency = level0.into_inner().unwrap();
  map
}

/// Re-polygonizes only the blocks touched by a modification, at every
/// level, expanding the dirty region by one block on each side and
/// clamping to the grid.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "polygonize::run_incremental"))]
pub fn run_incremental(
  grid: &VoxelGrid,
  map: &mut PolygonMap,
  modification: ModificationDescriptor,
  config: &PolygonizeConfig,
) {
  let levels = level_count(grid);
  map.modified_block_ids.clear();

  let level0 = Mutex::new(std::mem::take(&mut map.level0_consistency));
  let materials = Mutex::new(std::mem::take(&mut map.material_cache));

  let b = BLOCK_EXTENT as i32;
  for level in 0..levels {
    let blocks = blocks_at_level(grid, level);
    let stride = 1i32 << level;
    let block_span = b * stride;

    let lo = [
      (modification.min[0] / block_span - 1).max(0) as u32,
      (modification.min[1] / block_span - 1).max(0) as u32,
      (modification.min[2] / block_span - 1).max(0) as u32,
    ];
    let hi = [
      ((modification.max[0] / block_span + 1).max(0) as u32).min(blocks.0.saturating_sub(1)),
      ((modification.max[1] / block_span + 1).max(0) as u32).min(blocks.1.saturating_sub(1)),
      ((modification.max[2] / block_span + 1).max(0) as u32).min(blocks.2.saturating_sub(1)),
    ];

    let mut coords = Vec::new();
    for bz in lo[2]..=hi[2] {
      for by in lo[1]..=hi[1] {
        for bx in lo[0]..=hi[0] {
          coords.push((bx, by, bz));
        }
      }
    }
    let dirty_ids: Vec<u32> = coords.iter().map(|&c| block_id_at_level(blocks, c)).collect();
    map.remove_blocks(level as usize, &dirty_ids);

    #[cfg(feature = "tracing")]
    let level_start = web_time::Instant::now();

    let results: Vec<_> = {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("polygonize_level", level).entered();
      coords
        .into_par_iter()
        .filter_map(|coord| build_block(grid, level, levels, coord, blocks, &level0, &materials, config))
        .collect()
    };

    #[cfg(feature = "tracing")]
    tracing::info!(
      level,
      blocks = results.len(),
      elapsed_us = level_start.elapsed().as_micros() as u64,
      "level polygonized"
    );

    for (block, stats) in results {
      map.statistics.merge(&stats);
      map.modified_block_ids.push(block.block_id);
      map.levels[level as usize].push(block);
    }
  }

  map.material_cache = materials.into_inner().unwrap();
  map.level0_consistency = level0.into_inner().unwrap();
}
