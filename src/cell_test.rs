use std::sync::Mutex;

use super::*;
use crate::surface_source::SphereSource;

fn test_grid() -> VoxelGrid {
  let source = SphereSource { center: [16.0, 16.0, 16.0], radius: 10.0 };
  VoxelGrid::from_surface(32, 32, 32, [0.0, 0.0, 0.0], 1.0, &source).unwrap()
}

#[test]
fn trivial_cell_deep_inside_sphere_has_all_negative_corners() {
  let grid = test_grid();
  let mut cache = BlockCache::new(8);
  let builder = CellBuilder::new(&grid);
  let cell = builder.build_corners(&mut cache, 0, [16, 16, 16]);
  assert!(cell.is_trivial());
  assert_eq!(cell.case_code(), 0xFF);
}

#[test]
fn cell_straddling_the_surface_is_not_trivial() {
  let grid = test_grid();
  let mut cache = BlockCache::new(8);
  let builder = CellBuilder::new(&grid);
  // x=16..17 near the sphere's +X surface (center 16, radius 10).
  let cell = builder.build_corners(&mut cache, 0, [25, 16, 16]);
  assert!(!cell.is_trivial());
}

#[test]
fn level0_material_resolution_sets_consistency_bit() {
  let grid = test_grid();
  let mut cache = BlockCache::new(8);
  let level0 = Mutex::new(Level0Consistency::new());
  let materials = Mutex::new(MaterialCache::new());
  let builder = CellBuilder::new(&grid);
  let mut cell = builder.build_corners(&mut cache, 0, [16, 16, 16]);
  builder.resolve_material(&mut cache, &level0, &materials, &mut cell);
  let level0 = level0.into_inner().unwrap();
  let block_id = grid.block_id(1, 1, 1);
  let cell_id = crate::constants::coord_to_index(0, 0, 0);
  assert!(level0.is_set(block_id, cell_id));
}

#[test]
fn level1_material_majority_votes_unconfirmed_children_as_empty() {
  let grid = test_grid();
  let mut cache = BlockCache::new(8);
  let level0 = Mutex::new(Level0Consistency::new());
  let materials = Mutex::new(MaterialCache::new());
  let builder = CellBuilder::new(&grid);

  // No level-0 children have had their consistency bit set yet, so every
  // child contributes EMPTY and the cell's resolved material stays EMPTY.
  let mut cell = builder.build_corners(&mut cache, 1, [16, 16, 16]);
  builder.resolve_material(&mut cache, &level0, &materials, &mut cell);
  assert_eq!(cell.material, crate::types::MATERIAL_EMPTY);
}
