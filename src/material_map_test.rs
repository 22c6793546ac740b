use std::sync::Mutex;

use super::*;
use crate::logging::NullLogger;
use crate::polygon_map::{PolygonBlock, Vertex};

struct TwoMaterialMap;

impl MaterialMap for TwoMaterialMap {
  fn lookup(&self, id: MaterialId) -> Option<TextureTriplet> {
    match id {
      1 => Some(TextureTriplet { top: 10, side: 11, bottom: 12 }),
      2 => Some(TextureTriplet { top: 20, side: 21, bottom: 22 }),
      _ => None,
    }
  }
}

fn vertex(material: MaterialId, secondary_material: MaterialId) -> Vertex {
  Vertex {
    position: [0.0; 3],
    normal: [0.0, 1.0, 0.0],
    secondary_position: [0.0; 4],
    material,
    secondary_material,
    blend: 0,
    textures: [0; 6],
  }
}

fn map_with_one_vertex(v: Vertex) -> PolygonMap {
  let mut map = PolygonMap::new([16, 16, 16], 1);
  let mut block = PolygonBlock { block_id: 0, level: 0, ..Default::default() };
  block.vertices.push(v);
  map.levels[0].push(block);
  map
}

#[test]
fn resolves_primary_and_secondary_triplets() {
  let mut map = map_with_one_vertex(vertex(1, 2));
  apply_material_map(&mut map, &TwoMaterialMap, &NullLogger);
  let v = &map.levels[0][0].vertices[0];
  assert_eq!(v.textures, [10, 11, 12, 20, 21, 22]);
}

#[test]
fn miss_leaves_zeros_and_logs_once_per_distinct_id() {
  let events = Mutex::new(Vec::new());
  struct RecordingLogger<'a>(&'a Mutex<Vec<String>>);
  impl Logger for RecordingLogger<'_> {
    fn log(&self, _severity: Severity, message: &str) {
      self.0.lock().unwrap().push(message.to_string());
    }
  }

  let mut map = map_with_one_vertex(vertex(99, 99));
  let mut block = PolygonBlock { block_id: 1, level: 0, ..Default::default() };
  block.vertices.push(vertex(99, 1));
  map.levels[0].push(block);

  apply_material_map(&mut map, &TwoMaterialMap, &RecordingLogger(&events));

  assert_eq!(map.levels[0][0].vertices[0].textures, [0, 0, 0, 0, 0, 0]);
  assert_eq!(map.levels[0][1].vertices[0].textures, [0, 0, 0, 10, 11, 12]);
  assert_eq!(events.lock().unwrap().len(), 1, "id 99 misses once despite 3 lookups");
}

#[test]
fn transition_vertices_are_resolved_too() {
  let mut map = map_with_one_vertex(vertex(1, 1));
  map.levels[0][0].vertices.clear();
  map.levels[0][0].transition_vertices[0].push(vertex(2, 2));
  apply_material_map(&mut map, &TwoMaterialMap, &NullLogger);
  assert_eq!(map.levels[0][0].transition_vertices[0][0].textures, [20, 21, 22, 20, 21, 22]);
}
