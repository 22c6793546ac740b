//! Voxel grid (C2): owns all blocks, provides read/edit access over
//! distance/material/blend, and serialization.

use crate::block::{self, Block, BlockFlags, EncodedArray};
use crate::constants::{BLOCK_EXTENT, BLOCK_VOLUME};
use crate::error::GridError;
use crate::surface_source::{SampleBox, SurfaceSource};
use crate::types::{quantize_distance, MaterialId, SdfSample, MATERIAL_EMPTY};

/// How a surface injection combines the new samples with the stored ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectionKind {
  /// Union: the result never has a larger distance than before (surface
  /// only grows the solid region).
  Add,
  /// Subtract the surface from the solid, except re-add material strictly
  /// inside the injected volume.
  SubtractAddInner,
  /// Carve the surface out of the solid.
  Subtract,
}

/// A tight, axis-aligned region of voxels, in the grid's own (Z-up)
/// coordinate convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelAabb {
  pub min: [i32; 3],
  pub max: [i32; 3],
}

impl VoxelAabb {
  fn empty() -> Self {
    Self { min: [i32::MAX; 3], max: [i32::MIN; 3] }
  }

  fn encapsulate(&mut self, p: [i32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(p[i]);
      self.max[i] = self.max[i].max(p[i]);
    }
  }

  fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }

  /// Swap Y and Z to match the external Y-up convention (§9 coordinate
  /// conventions: a single swap at every output boundary).
  pub fn to_external(self) -> Self {
    Self {
      min: [self.min[0], self.min[2], self.min[1]],
      max: [self.max[0], self.max[2], self.max[1]],
    }
  }
}

/// Block-partitioned, run-length-compressed container of distance,
/// material, and blend samples.
#[derive(Debug)]
pub struct VoxelGrid {
  width: u32,
  depth: u32,
  height: u32,
  blocks_x: u32,
  blocks_y: u32,
  blocks_z: u32,
  blocks: Vec<Block>,
  /// World-space position corresponding to sample (0, 0, 0), recorded at
  /// construction time so later injections can re-query the same surface
  /// source's coordinate frame.
  origin: [f32; 3],
  next_id: u32,
}

impl VoxelGrid {
  pub const BLOCK_EXTENT: u32 = BLOCK_EXTENT as u32;

  fn validate_dims(width: u32, depth: u32, height: u32) -> Result<(), GridError> {
    let b = Self::BLOCK_EXTENT;
    if width == 0 || width % b != 0 {
      return Err(GridError::DimensionNotBlockMultiple { axis: "width", value: width });
    }
    if depth == 0 || depth % b != 0 {
      return Err(GridError::DimensionNotBlockMultiple { axis: "depth", value: depth });
    }
    if height == 0 || height % b != 0 {
      return Err(GridError::DimensionNotBlockMultiple { axis: "height", value: height });
    }
    Ok(())
  }

  /// Block coordinate triples in construction order.
  ///
  /// Reproduces the original implementation's loop-bound defect: every
  /// axis loop is bounded by `blocks_y`, not its own axis count. Inputs
  /// are expected to be cubic
  /// (`blocks_x == blocks_y == blocks_z`), in which case this has no
  /// observable effect; for non-cubic grids it silently skips or
  /// out-of-bounds-clips blocks along X/Z. Do not "fix" this without
  /// confirming downstream consumers no longer rely on cubic inputs.
  fn buggy_block_coords(&self) -> Vec<(u32, u32, u32)> {
    let mut out = Vec::new();
    for bz in 0..self.blocks_y {
      for by in 0..self.blocks_y {
        for bx in 0..self.blocks_y {
          if bx < self.blocks_x && by < self.blocks_y && bz < self.blocks_z {
            out.push((bx, by, bz));
          }
        }
      }
    }
    out
  }

  fn new_shell(width: u32, depth: u32, height: u32) -> Self {
    let b = Self::BLOCK_EXTENT;
    let blocks_x = width / b;
    let blocks_y = depth / b;
    let blocks_z = height / b;
    let total = (blocks_x * blocks_y * blocks_z) as usize;
    Self {
      width,
      depth,
      height,
      blocks_x,
      blocks_y,
      blocks_z,
      blocks: Vec::with_capacity(total),
      origin: [0.0; 3],
      next_id: 0,
    }
  }

  fn push_block(&mut self, distance: &[SdfSample], material: &[MaterialId], blend: &[u8]) {
    let id = self.next_id;
    self.next_id += 1;
    let mut b = Block::new(id);
    b.distance = block::compress(distance);
    b.material = block::compress(material);
    b.blend = block::compress(blend);
    b.flags.set(BlockFlags::DISTANCE_RAW, b.distance.raw);
    b.flags.set(BlockFlags::MATERIAL_RAW, b.material.raw);
    b.flags.set(BlockFlags::BLEND_RAW, b.blend.raw);
    b.flags.set(BlockFlags::EMPTY, block::is_distance_empty(distance));
    self.blocks.push(b);
  }

  /// Construct a grid by sampling `surface` over every block, with unit
  /// step, rounding half-away-from-zero and clamping each distance to
  /// `[-4, 4]`.
  pub fn from_surface(
    width: u32,
    depth: u32,
    height: u32,
    start: [f32; 3],
    step: f32,
    surface: &dyn SurfaceSource,
  ) -> Result<Self, GridError> {
    Self::validate_dims(width, depth, height)?;
    let mut grid = Self::new_shell(width, depth, height);
    grid.origin = start;

    let b = BLOCK_EXTENT as u32;
    let mut raw_dist = vec![0.0f32; BLOCK_VOLUME];
    let mut raw_mat = vec![0u8; BLOCK_VOLUME];
    let mut raw_blend = vec![0u8; BLOCK_VOLUME];

    for (bx, by, bz) in grid.buggy_block_coords() {
      let box_ = SampleBox {
        start: [
          start[0] + (bx * b) as f32 * step,
          start[1] + (by * b) as f32 * step,
          start[2] + (bz * b) as f32 * step,
        ],
        count: [b, b, b],
        step,
      };
      surface.sample(box_, &mut raw_dist, Some(&mut raw_mat), Some(&mut raw_blend));

      let distance: Vec<SdfSample> = raw_dist.iter().map(|&d| quantize_distance(d)).collect();
      grid.push_block(&distance, &raw_mat, &raw_blend);
    }
    Ok(grid)
  }

  /// Construct a grid with every voxel outside the surface (distance = +4).
  pub fn empty(width: u32, depth: u32, height: u32) -> Result<Self, GridError> {
    Self::validate_dims(width, depth, height)?;
    let mut grid = Self::new_shell(width, depth, height);
    let distance = vec![4i8; BLOCK_VOLUME];
    let material = vec![0u8; BLOCK_VOLUME];
    let blend = vec![0u8; BLOCK_VOLUME];
    for _ in grid.buggy_block_coords() {
      grid.push_block(&distance, &material, &blend);
    }
    Ok(grid)
  }

  /// Construct a grid from a `width * width` heightmap of `width` columns.
  ///
  /// For voxel `(x, y, z)`: `distance = clamp(z - 127 - heightmap[y*W+x],
  /// -127, 127)`, then clamped again to `[-4, 4]`; material and blend are
  /// zero everywhere. `width` is used for all three dimensions.
  pub fn from_heightmap(width: u32, heightmap: &[i32]) -> Result<Self, GridError> {
    Self::validate_dims(width, width, width)?;
    debug_assert_eq!(heightmap.len(), (width * width) as usize);
    let mut grid = Self::new_shell(width, width, width);

    let b = BLOCK_EXTENT as u32;
    for (bx, by, bz) in grid.buggy_block_coords() {
      let mut distance = vec![0i8; BLOCK_VOLUME];
      let material = vec![0u8; BLOCK_VOLUME];
      let blend = vec![0u8; BLOCK_VOLUME];
      for lz in 0..BLOCK_EXTENT {
        for ly in 0..BLOCK_EXTENT {
          for lx in 0..BLOCK_EXTENT {
            let x = bx * b + lx as u32;
            let y = by * b + ly as u32;
            let z = bz * b + lz as u32;
            let h = heightmap[(y * width + x) as usize];
            let wide = (z as i32 - 127 - h).clamp(-127, 127);
            let clamped = wide.clamp(-4, 4) as i8;
            distance[crate::constants::coord_to_index(lx, ly, lz)] = clamped;
          }
        }
      }
      grid.push_block(&distance, &material, &blend);
    }
    Ok(grid)
  }

  pub fn width(&self) -> u32 {
    self.width
  }
  pub fn depth(&self) -> u32 {
    self.depth
  }
  pub fn height(&self) -> u32 {
    self.height
  }
  pub fn blocks_x(&self) -> u32 {
    self.blocks_x
  }
  pub fn blocks_y(&self) -> u32 {
    self.blocks_y
  }
  pub fn blocks_z(&self) -> u32 {
    self.blocks_z
  }
  pub fn block_count(&self) -> usize {
    self.blocks.len()
  }

  /// Row-major (X fastest, then Y, then Z) internal block id for a block
  /// coordinate.
  pub fn block_id(&self, bx: u32, by: u32, bz: u32) -> u32 {
    (bz * self.blocks_y + by) * self.blocks_x + bx
  }

  fn block(&self, id: u32) -> Result<&Block, GridError> {
    self.blocks.get(id as usize).ok_or_else(|| {
      let (bx, by, bz) = self.block_coord_of(id);
      GridError::BlockOutOfBounds { bx, by, bz }
    })
  }

  pub fn block_coord_of(&self, id: u32) -> (u32, u32, u32) {
    let bx = id % self.blocks_x;
    let rest = id / self.blocks_x;
    let by = rest % self.blocks_y;
    let bz = rest / self.blocks_y;
    (bx, by, bz)
  }

  /// World-space coordinate of sample `(0, 0, 0)`.
  pub fn origin(&self) -> [f32; 3] {
    self.origin
  }

  /// World-space sample bounds `[width, depth, height]` a block/cell
  /// coordinate must stay within one unit of.
  pub fn sample_bounds(&self) -> [u32; 3] {
    [self.width, self.depth, self.height]
  }

  pub fn is_block_empty(&self, id: u32) -> Result<bool, GridError> {
    Ok(self.block(id)?.is_empty())
  }

  /// Decompress a block's three arrays into caller-owned buffers.
  pub fn get_block_data(
    &self,
    id: u32,
  ) -> Result<(Vec<SdfSample>, Vec<MaterialId>, Vec<u8>), GridError> {
    let b = self.block(id)?;
    let mut distance = vec![0i8; BLOCK_VOLUME];
    let mut material = vec![0u8; BLOCK_VOLUME];
    let mut blend = vec![0u8; BLOCK_VOLUME];
    block::decompress(&b.distance, &mut distance);
    block::decompress(&b.material, &mut material);
    block::decompress(&b.blend, &mut blend);
    Ok((distance, material, blend))
  }

  pub fn total_memory_usage_bytes(&self) -> usize {
    self.blocks.iter().map(Block::memory_usage_bytes).sum()
  }

  /// Direct bulk replacement of a block's distance array.
  pub fn modify_block_distance_data(
    &mut self,
    id: u32,
    distance: &[SdfSample],
  ) -> Result<(), GridError> {
    debug_assert_eq!(distance.len(), BLOCK_VOLUME);
    let block = self
      .blocks
      .get_mut(id as usize)
      .ok_or(GridError::BlockOutOfBounds { bx: 0, by: 0, bz: 0 })?;
    block.distance = block::compress(distance);
    block.flags.set(BlockFlags::DISTANCE_RAW, block.distance.raw);
    block.flags.set(BlockFlags::EMPTY, block::is_distance_empty(distance));
    Ok(())
  }

  /// Direct bulk replacement of a block's material array.
  pub fn modify_block_material_data(
    &mut self,
    id: u32,
    material: &[MaterialId],
  ) -> Result<(), GridError> {
    debug_assert_eq!(material.len(), BLOCK_VOLUME);
    let block = self
      .blocks
      .get_mut(id as usize)
      .ok_or(GridError::BlockOutOfBounds { bx: 0, by: 0, bz: 0 })?;
    block.material = block::compress(material);
    block.flags.set(BlockFlags::MATERIAL_RAW, block.material.raw);
    Ok(())
  }

  /// Blocks (by id) whose AABB intersects the world-space box
  /// `[position - extents/2, position + extents/2]`.
  fn touched_blocks(&self, position: [f32; 3], extents: [f32; 3]) -> Vec<u32> {
    let half = [extents[0] * 0.5, extents[1] * 0.5, extents[2] * 0.5];
    let min = [position[0] - half[0], position[1] - half[1], position[2] - half[2]];
    let max = [position[0] + half[0], position[1] + half[1], position[2] + half[2]];

    let b = BLOCK_EXTENT as f32;
    let bmin = [
      ((min[0] - self.origin[0]) / b).floor().max(0.0) as u32,
      ((min[1] - self.origin[1]) / b).floor().max(0.0) as u32,
      ((min[2] - self.origin[2]) / b).floor().max(0.0) as u32,
    ];
    let bmax = [
      (((max[0] - self.origin[0]) / b).ceil().max(0.0) as u32).min(self.blocks_x),
      (((max[1] - self.origin[1]) / b).ceil().max(0.0) as u32).min(self.blocks_y),
      (((max[2] - self.origin[2]) / b).ceil().max(0.0) as u32).min(self.blocks_z),
    ];

    let mut ids = Vec::new();
    for bz in bmin[2]..bmax[2] {
      for by in bmin[1]..bmax[1] {
        for bx in bmin[0]..bmax[0] {
          ids.push(self.block_id(bx, by, bz));
        }
      }
    }
    ids
  }

  /// Inject a surface into the grid, combining per-voxel via `kind`.
  /// Returns the tight world-space AABB of touched voxels, Y/Z swapped to
  /// the external Y-up convention.
  pub fn inject_surface(
    &mut self,
    position: [f32; 3],
    extents: [f32; 3],
    kind: InjectionKind,
    surface: &dyn SurfaceSource,
  ) -> Result<VoxelAabb, GridError> {
    let touched = self.touched_blocks(position, extents);
    let mut region = VoxelAabb::empty();
    let b = BLOCK_EXTENT as u32;

    for id in touched {
      let (bx, by, bz) = self.block_coord_of(id);
      let mut distance = vec![0i8; BLOCK_VOLUME];
      {
        let block = self.block(id)?;
        block::decompress(&block.distance, &mut distance);
      }

      let mut any_touched = false;
      for lz in 0..BLOCK_EXTENT {
        for ly in 0..BLOCK_EXTENT {
          for lx in 0..BLOCK_EXTENT {
            let wx = (bx * b) as f32 + lx as f32 + self.origin[0];
            let wy = (by * b) as f32 + ly as f32 + self.origin[1];
            let wz = (bz * b) as f32 + lz as f32 + self.origin[2];
            let half = [extents[0] * 0.5, extents[1] * 0.5, extents[2] * 0.5];
            if (wx - position[0]).abs() > half[0]
              || (wy - position[1]).abs() > half[1]
              || (wz - position[2]).abs() > half[2]
            {
              continue;
            }

            let mut sample = [0.0f32; 1];
            surface.sample(
              SampleBox { start: [wx, wy, wz], count: [1, 1, 1], step: 1.0 },
              &mut sample,
              None,
              None,
            );
            let surface_value = quantize_distance(sample[0]);

            let idx = crate::constants::coord_to_index(lx, ly, lz);
            let stored = distance[idx];
            let combined = match kind {
              InjectionKind::Add => stored.min(surface_value),
              InjectionKind::SubtractAddInner => stored.max(surface_value),
              InjectionKind::Subtract => stored.max(-surface_value),
            };
            if combined != stored {
              distance[idx] = combined;
              any_touched = true;
              region.encapsulate([
                bx as i32 * b as i32 + lx as i32,
                by as i32 * b as i32 + ly as i32,
                bz as i32 * b as i32 + lz as i32,
              ]);
            }
          }
        }
      }

      if any_touched {
        self.modify_block_distance_data(id, &distance)?;
      }
    }

    Ok(if region.is_valid() { region.to_external() } else { VoxelAabb { min: [0; 3], max: [-1; 3] } })
  }

  /// Paint `material` over a spherical falloff region, returning the
  /// touched AABB (Y/Z swapped).
  ///
  /// Blend factor at a voxel is
  /// `clamp(1 - ||v - position|| / (0.75 * extents.x), 0, 1) * 255`. If the
  /// cell's current material already equals `material`, the computed blend
  /// is combined additively (or subtractively, via `subtract`) and clamped;
  /// otherwise the material is replaced and blend set to the computed
  /// value.
  pub fn inject_material(
    &mut self,
    position: [f32; 3],
    extents: [f32; 3],
    material: MaterialId,
    subtract: bool,
  ) -> Result<VoxelAabb, GridError> {
    let touched = self.touched_blocks(position, extents);
    let mut region = VoxelAabb::empty();
    let b = BLOCK_EXTENT as u32;
    let divisor = 0.75 * extents[0];

    for id in touched {
      let (bx, by, bz) = self.block_coord_of(id);
      let (_distance, mut mat, mut blend) = self.get_block_data(id)?;
      let mut any_touched = false;

      for lz in 0..BLOCK_EXTENT {
        for ly in 0..BLOCK_EXTENT {
          for lx in 0..BLOCK_EXTENT {
            let wx = (bx * b) as f32 + lx as f32 + self.origin[0];
            let wy = (by * b) as f32 + ly as f32 + self.origin[1];
            let wz = (bz * b) as f32 + lz as f32 + self.origin[2];
            let dist_to_center = ((wx - position[0]).powi(2)
              + (wy - position[1]).powi(2)
              + (wz - position[2]).powi(2))
            .sqrt();
            let falloff = (1.0 - dist_to_center / divisor).clamp(0.0, 1.0);
            if falloff <= 0.0 {
              continue;
            }
            let computed = (falloff * 255.0).round() as i32;

            let idx = crate::constants::coord_to_index(lx, ly, lz);
            if mat[idx] == material && mat[idx] != MATERIAL_EMPTY {
              let signed = if subtract { -computed } else { computed };
              blend[idx] = (blend[idx] as i32 + signed).clamp(0, 255) as u8;
            } else {
              mat[idx] = material;
              blend[idx] = computed.clamp(0, 255) as u8;
            }
            any_touched = true;
            region.encapsulate([
              bx as i32 * b as i32 + lx as i32,
              by as i32 * b as i32 + ly as i32,
              bz as i32 * b as i32 + lz as i32,
            ]);
          }
        }
      }

      if any_touched {
        self.modify_block_material_data(id, &mat)?;
        self.set_block_blend(id, &blend)?;
      }
    }

    Ok(if region.is_valid() { region.to_external() } else { VoxelAabb { min: [0; 3], max: [-1; 3] } })
  }

  fn set_block_blend(&mut self, id: u32, blend: &[u8]) -> Result<(), GridError> {
    let block = self
      .blocks
      .get_mut(id as usize)
      .ok_or(GridError::BlockOutOfBounds { bx: 0, by: 0, bz: 0 })?;
    block.blend = block::compress(blend);
    block.flags.set(BlockFlags::BLEND_RAW, block.blend.raw);
    Ok(())
  }

  /// Serialize the grid to the documented little-endian blob:
  /// `u32 version; u32 W; u32 D; u32 H; u32 block_count; u32 sizes[3*N];
  /// per-block { u32 flags; dist bytes; mat bytes; blend bytes }`.
  ///
  /// `block_count` is stored explicitly rather than recomputed from W/D/H:
  /// the preserved block-enumeration defect (see [`Self::buggy_block_coords`])
  /// can leave `self.blocks.len()` short of `blocks_x * blocks_y *
  /// blocks_z` for non-cubic grids, and the wire format must round-trip
  /// whatever was actually constructed.
  pub fn pack_for_save(&self) -> Vec<u8> {
    const VERSION: u32 = 1;
    let mut out = Vec::new();
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&self.width.to_le_bytes());
    out.extend_from_slice(&self.depth.to_le_bytes());
    out.extend_from_slice(&self.height.to_le_bytes());
    out.extend_from_slice(&(self.blocks.len() as u32).to_le_bytes());
    for block in &self.blocks {
      out.extend_from_slice(&(block.distance.byte_len() as u32).to_le_bytes());
      out.extend_from_slice(&(block.material.byte_len() as u32).to_le_bytes());
      out.extend_from_slice(&(block.blend.byte_len() as u32).to_le_bytes());
    }
    for block in &self.blocks {
      out.extend_from_slice(&(block.flags.bits() as u32).to_le_bytes());
      out.extend_from_slice(&block.distance.bytes);
      out.extend_from_slice(&block.material.bytes);
      out.extend_from_slice(&block.blend.bytes);
    }
    out
  }

  /// Deserialize a grid previously produced by [`Self::pack_for_save`].
  pub fn load(bytes: &[u8]) -> Result<Self, GridError> {
    const VERSION: u32 = 1;
    let mut cursor = 0usize;
    let read_u32 = |bytes: &[u8], cursor: &mut usize| -> Result<u32, GridError> {
      let slice = bytes.get(*cursor..*cursor + 4).ok_or(GridError::Truncated)?;
      *cursor += 4;
      Ok(u32::from_le_bytes(slice.try_into().unwrap()))
    };

    let version = read_u32(bytes, &mut cursor)?;
    if version != VERSION {
      return Err(GridError::VersionMismatch { found: version, expected: VERSION });
    }
    let width = read_u32(bytes, &mut cursor)?;
    let depth = read_u32(bytes, &mut cursor)?;
    let height = read_u32(bytes, &mut cursor)?;
    Self::validate_dims(width, depth, height)?;
    let total = read_u32(bytes, &mut cursor)? as usize;

    let mut grid = Self::new_shell(width, depth, height);

    let mut sizes = Vec::with_capacity(total);
    for _ in 0..total {
      let d = read_u32(bytes, &mut cursor)?;
      let m = read_u32(bytes, &mut cursor)?;
      let bl = read_u32(bytes, &mut cursor)?;
      sizes.push((d as usize, m as usize, bl as usize));
    }

    for id in 0..total {
      let flags_bits = read_u32(bytes, &mut cursor)?;
      let (dlen, mlen, blen) = sizes[id];

      let mut block = Block::new(id as u32);
      block.flags = BlockFlags::from_bits(flags_bits as u8);

      let dist_bytes = bytes.get(cursor..cursor + dlen).ok_or(GridError::Truncated)?.to_vec();
      cursor += dlen;
      let mat_bytes = bytes.get(cursor..cursor + mlen).ok_or(GridError::Truncated)?.to_vec();
      cursor += mlen;
      let blend_bytes = bytes.get(cursor..cursor + blen).ok_or(GridError::Truncated)?.to_vec();
      cursor += blen;

      block.distance = EncodedArray { bytes: dist_bytes, raw: block.flags.contains(BlockFlags::DISTANCE_RAW) };
      block.material = EncodedArray { bytes: mat_bytes, raw: block.flags.contains(BlockFlags::MATERIAL_RAW) };
      block.blend = EncodedArray { bytes: blend_bytes, raw: block.flags.contains(BlockFlags::BLEND_RAW) };
      grid.blocks.push(block);
    }
    grid.next_id = total as u32;
    Ok(grid)
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
