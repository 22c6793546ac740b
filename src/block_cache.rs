//! Per-worker block cache (C4): small direct-mapped rings over decompressed
//! block data, so a cell build's handful of corner/neighbor lookups don't
//! each re-run RLE decoding.

use crate::constants::BLOCK_EXTENT;
use crate::grid::VoxelGrid;
use crate::types::{MaterialId, SdfSample};

/// Ring capacity.
pub const DEFAULT_CAPACITY: usize = 8;

struct DistanceSlot {
  key: Option<(u32, u32)>, // (lod level, internal block id)
  data: Vec<SdfSample>,
}

struct MaterialSlot {
  key: Option<u32>, // internal block id
  material: Vec<MaterialId>,
  blend: Vec<u8>,
}

/// One worker thread's cache of decompressed blocks.
///
/// Distance lookups are keyed by `(level, block id)`; material/blend
/// lookups by block id alone. Both rings evict round-robin on miss.
pub struct BlockCache {
  capacity: usize,
  distance: Vec<DistanceSlot>,
  distance_next_evict: usize,
  material: Vec<MaterialSlot>,
  material_next_evict: usize,
}

impl BlockCache {
  pub fn new(capacity: usize) -> Self {
    let distance = (0..capacity).map(|_| DistanceSlot { key: None, data: Vec::new() }).collect();
    let material = (0..capacity)
      .map(|_| MaterialSlot { key: None, material: Vec::new(), blend: Vec::new() })
      .collect();
    Self { capacity, distance, distance_next_evict: 0, material, material_next_evict: 0 }
  }

  /// Clamp a world-space position to `(W-1, D-1, H-1)` and split it into a
  /// block coordinate and an in-block offset.
  pub fn locate(grid: &VoxelGrid, position: [i32; 3]) -> ([u32; 3], [u32; 3]) {
    let bound = [grid.width() - 1, grid.depth() - 1, grid.height() - 1];
    let clamped = [
      position[0].clamp(0, bound[0] as i32) as u32,
      position[1].clamp(0, bound[1] as i32) as u32,
      position[2].clamp(0, bound[2] as i32) as u32,
    ];
    let b = BLOCK_EXTENT as u32;
    let block_coord = [clamped[0] / b, clamped[1] / b, clamped[2] / b];
    let offset = [clamped[0] % b, clamped[1] % b, clamped[2] % b];
    (block_coord, offset)
  }

  /// Fetch (decompressing on miss) the distance array for `(level,
  /// block_id)`, returning a reference into the owning ring slot.
  pub fn distance_block(&mut self, grid: &VoxelGrid, level: u32, block_id: u32) -> &[SdfSample] {
    if let Some(idx) = self.distance.iter().position(|s| s.key == Some((level, block_id))) {
      return &self.distance[idx].data;
    }
    let slot = self.distance_next_evict;
    self.distance_next_evict = (self.distance_next_evict + 1) % self.capacity;

    let (distance, _material, _blend) =
      grid.get_block_data(block_id).expect("block id supplied by a caller that already validated it");
    self.distance[slot].key = Some((level, block_id));
    self.distance[slot].data = distance;
    &self.distance[slot].data
  }

  /// Fetch (decompressing on miss) the material and blend arrays for
  /// `block_id`.
  pub fn material_block(&mut self, grid: &VoxelGrid, block_id: u32) -> (&[MaterialId], &[u8]) {
    if let Some(idx) = self.material.iter().position(|s| s.key == Some(block_id)) {
      let slot = &self.material[idx];
      return (&slot.material, &slot.blend);
    }
    let slot = self.material_next_evict;
    self.material_next_evict = (self.material_next_evict + 1) % self.capacity;

    let (_distance, material, blend) =
      grid.get_block_data(block_id).expect("block id supplied by a caller that already validated it");
    self.material[slot].key = Some(block_id);
    self.material[slot].material = material;
    self.material[slot].blend = blend;
    (&self.material[slot].material, &self.material[slot].blend)
  }
}

#[cfg(test)]
#[path = "block_cache_test.rs"]
mod block_cache_test;
