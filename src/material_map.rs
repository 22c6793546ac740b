//! Material map (§6): a pure interface the caller injects to resolve a
//! material id's triplanar texture ids, the same external-collaborator role
//! [`crate::surface_source::SurfaceSource`] plays for distance/material
//! sampling.
//!
//! Unlike `SurfaceSource`, which the core calls during grid construction,
//! `MaterialMap` is applied as an explicit post-pass over an already-built
//! [`crate::polygon_map::PolygonMap`] (see [`apply_material_map`]) — a
//! vertex's resolved material id doesn't exist until polygonization has
//! run, and texture resolution has no bearing on mesh topology, so there is
//! no need to thread it through the hot per-cell path.

use std::collections::HashSet;

use crate::logging::{Logger, Severity};
use crate::polygon_map::PolygonMap;
use crate::types::MaterialId;

/// One material's triplanar texture ids: `top`/`bottom` for the ±Y faces,
/// `side` for the surrounding XZ band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureTriplet {
  pub top: u8,
  pub side: u8,
  pub bottom: u8,
}

impl TextureTriplet {
  fn to_array(self) -> [u8; 3] {
    [self.top, self.side, self.bottom]
  }
}

/// A pure interface from material id to its triplanar texture triplet.
///
/// A miss (`None`) is not a hard error: the vertex is still emitted with
/// whatever texture ids happen to be present (the other slot, or zero),
/// and the miss is logged at [`Severity::Error`], once per distinct
/// missing id per call to [`apply_material_map`].
pub trait MaterialMap: Sync {
  fn lookup(&self, id: MaterialId) -> Option<TextureTriplet>;
}

fn resolve_one(map: &dyn MaterialMap, id: MaterialId, logger: &dyn Logger, missed: &mut HashSet<MaterialId>) -> [u8; 3] {
  match map.lookup(id) {
    Some(triplet) => triplet.to_array(),
    None => {
      if missed.insert(id) {
        logger.log(Severity::Error, &format!("material map miss for material id {id}"));
      }
      [0, 0, 0]
    }
  }
}

/// Fills every vertex's `textures` field across every block and LOD level
/// in `map`, deriving the primary triplet from `material` and the secondary
/// from `secondary_material`. Idempotent; safe to call after `run_full` or
/// any number of `run_incremental` calls.
pub fn apply_material_map(map: &mut PolygonMap, material_map: &dyn MaterialMap, logger: &dyn Logger) {
  let mut missed = HashSet::new();
  for level in &mut map.levels {
    for block in level {
      for vertex in &mut block.vertices {
        let primary = resolve_one(material_map, vertex.material, logger, &mut missed);
        let secondary = resolve_one(material_map, vertex.secondary_material, logger, &mut missed);
        vertex.textures[0..3].copy_from_slice(&primary);
        vertex.textures[3..6].copy_from_slice(&secondary);
      }
      for face_vertices in &mut block.transition_vertices {
        for vertex in face_vertices {
          let primary = resolve_one(material_map, vertex.material, logger, &mut missed);
          let secondary = resolve_one(material_map, vertex.secondary_material, logger, &mut missed);
          vertex.textures[0..3].copy_from_slice(&primary);
          vertex.textures[3..6].copy_from_slice(&secondary);
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "material_map_test.rs"]
mod material_map_test;
