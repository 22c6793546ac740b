//! Polygonizer output types (§3 "Polygon block output" / "Polygon map
//! output"): the mesh data a run produces, plus the run statistics and
//! retained material cache an incremental re-run consumes.

use crate::cell::{Level0Consistency, MaterialCache};
use crate::types::MaterialId;

/// One of the 6 faces a block can carry a transition mesh on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionFaceId {
  XPos,
  XNeg,
  YPos,
  YNeg,
  ZPos,
  ZNeg,
}

pub const ALL_TRANSITION_FACES: [TransitionFaceId; 6] = [
  TransitionFaceId::XPos,
  TransitionFaceId::XNeg,
  TransitionFaceId::YPos,
  TransitionFaceId::YNeg,
  TransitionFaceId::ZPos,
  TransitionFaceId::ZNeg,
];

impl TransitionFaceId {
  pub fn index(self) -> usize {
    self as usize
  }
}

/// One mesh vertex.
///
/// `position` and `secondary_position` are both quantized to 1/256-voxel
/// units internally; callers see plain `f32` world coordinates (already
/// divided out) in the Y-up external convention. `secondary_position.w`
/// packs the vertex's face-adjacency bitmask (transition vertices only) as
/// a 32-bit int reinterpreted as `f32`; regular-cell vertices leave it 0.
///
/// `secondary_material` is the other material touching this vertex's cut
/// edge when the edge crosses a material boundary (equal to `material`
/// otherwise, or for endpoint vertices where no second sample exists).
/// `textures` holds the six 8-bit triplanar texture ids a `MaterialMap`
/// resolves for `material`/`secondary_material` (`[top, side, bottom]`
/// per material, primary first); left as all zeros until
/// [`crate::material_map::apply_material_map`] is run over the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
  pub position: [f32; 3],
  pub normal: [f32; 3],
  pub secondary_position: [f32; 4],
  pub material: MaterialId,
  pub secondary_material: MaterialId,
  pub blend: u8,
  pub textures: [u8; 6],
}

/// One LOD block's mesh output: the regular-cell mesh plus up to 6
/// transition meshes (one per face with a lower-LOD neighbor).
#[derive(Clone, Debug, Default)]
pub struct PolygonBlock {
  pub block_id: u32,
  pub level: u32,
  pub vertices: Vec<Vertex>,
  pub indices: Vec<u32>,
  pub transition_vertices: [Vec<Vertex>; 6],
  pub transition_indices: [Vec<u32>; 6],
}

/// Per-run counters, accumulated across every block a run touches.
#[derive(Clone, Debug)]
pub struct Statistics {
  pub blocks_processed: u64,
  pub trivial_cells: u64,
  pub non_trivial_cells: u64,
  pub degenerate_triangles_removed: u64,
  pub case_histogram: [u32; 256],
}

impl Default for Statistics {
  fn default() -> Self {
    Self {
      blocks_processed: 0,
      trivial_cells: 0,
      non_trivial_cells: 0,
      degenerate_triangles_removed: 0,
      case_histogram: [0; 256],
    }
  }
}

impl Statistics {
  pub fn merge(&mut self, other: &Statistics) {
    self.blocks_processed += other.blocks_processed;
    self.trivial_cells += other.trivial_cells;
    self.non_trivial_cells += other.non_trivial_cells;
    self.degenerate_triangles_removed += other.degenerate_triangles_removed;
    for i in 0..256 {
      self.case_histogram[i] += other.case_histogram[i];
    }
  }
}

/// The full output of a polygonization run: one ordered list of blocks per
/// LOD level, plus the retained material cache (both tiers — the per-level
/// majority-vote table and the level-0 consistency bitmap) an incremental
/// re-run reads.
#[derive(Default)]
pub struct PolygonMap {
  pub extent: [u32; 3],
  pub levels: Vec<Vec<PolygonBlock>>,
  pub material_cache: MaterialCache,
  pub level0_consistency: Level0Consistency,
  pub statistics: Statistics,
  /// Block ids touched by the most recent run, in dispatch order.
  pub modified_block_ids: Vec<u32>,
}

impl PolygonMap {
  pub fn new(extent: [u32; 3], level_count: usize) -> Self {
    Self {
      extent,
      levels: (0..level_count).map(|_| Vec::new()).collect(),
      material_cache: MaterialCache::new(),
      level0_consistency: Level0Consistency::new(),
      statistics: Statistics::default(),
      modified_block_ids: Vec::new(),
    }
  }

  /// Removes every block at `level` whose id is in `block_ids`.
  pub fn remove_blocks(&mut self, level: usize, block_ids: &[u32]) {
    if let Some(blocks) = self.levels.get_mut(level) {
      blocks.retain(|b| !block_ids.contains(&b.block_id));
    }
  }
}
