use super::*;
use crate::grid::VoxelGrid;
use crate::surface_source::SphereSource;

fn test_grid() -> VoxelGrid {
  let source = SphereSource { center: [16.0, 16.0, 16.0], radius: 10.0 };
  VoxelGrid::from_surface(32, 32, 32, [0.0, 0.0, 0.0], 1.0, &source).unwrap()
}

#[test]
fn locate_clamps_to_grid_bounds() {
  let grid = test_grid();
  let (block_coord, offset) = BlockCache::locate(&grid, [100, -5, 17]);
  // width=depth=height=32, so max in-bounds index is 31 on each axis.
  assert_eq!(block_coord, [1, 0, 1]);
  assert_eq!(offset, [15, 0, 1]);
}

#[test]
fn distance_block_hits_after_first_miss() {
  let grid = test_grid();
  let mut cache = BlockCache::new(DEFAULT_CAPACITY);
  let first = cache.distance_block(&grid, 0, 0).to_vec();
  let second = cache.distance_block(&grid, 0, 0).to_vec();
  assert_eq!(first, second);
}

#[test]
fn distance_cache_evicts_round_robin_past_capacity() {
  let grid = test_grid();
  let mut cache = BlockCache::new(2);
  cache.distance_block(&grid, 0, 0);
  cache.distance_block(&grid, 0, 1);
  // Third distinct key evicts the first slot (block id 0).
  cache.distance_block(&grid, 0, 2);
  assert_eq!(cache.distance[0].key, Some((0, 2)));
  assert_eq!(cache.distance[1].key, Some((0, 1)));
}

#[test]
fn material_block_returns_parallel_arrays() {
  let grid = test_grid();
  let mut cache = BlockCache::new(DEFAULT_CAPACITY);
  let (material, blend) = cache.material_block(&grid, 0);
  assert_eq!(material.len(), blend.len());
  assert_eq!(material.len(), crate::constants::BLOCK_VOLUME);
}

#[test]
fn distance_and_material_keys_are_independent_rings() {
  let grid = test_grid();
  let mut cache = BlockCache::new(DEFAULT_CAPACITY);
  cache.distance_block(&grid, 3, 0);
  cache.material_block(&grid, 0);
  assert_eq!(cache.distance[0].key, Some((3, 0)));
  assert_eq!(cache.material[0].key, Some(0));
}
