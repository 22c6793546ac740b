//! Case tables (C5): per-case-code cell topology for regular and transition
//! cells.
//!
//! The published Transvoxel tables (`regularCellClass`, `regularCellData`,
//! `regularVertexData`, and their transition-cell analogs) are external
//! fixed data this crate's retrieval pack does not carry — every Rust
//! reference implementation in reach of this workspace imports them from a
//! `tables` submodule that isn't present either. Rather than hand-transcribe
//! a several-hundred-entry numeric table from memory (high risk of a silent,
//! hard-to-detect transcription error spread across the whole mesh), this
//! module derives equivalent tables procedurally from the cube's corner
//! geometry: cut edges come from [`crate::edge_table::EDGE_TABLE`] (already
//! exercised and tested), and each case's vertex list is fan-triangulated
//! from its cut edges in ascending edge order.
//!
//! This deliberately does not reproduce the published tables' 256→16
//! (regular) / 512→N (transition) cell-class compaction: every case is its
//! own class here. Vertex reuse (normally encoded in these tables as
//! per-edge reuse-direction/slot bits) is instead handled at polygonization
//! time by keying a per-run cache on the shared edge's world-lattice
//! endpoints (`polygonize::regular`, `polygonize::transition`) — simpler to
//! get right than reconstructing the original bit-packed addressing scheme
//! from no source data, and it produces the same shared-vertex outcome.
//! See `DESIGN.md`.
//!
//! A case's cut edges do not always bound a single loop: two opposite solid
//! corners (e.g. only corners 0 and 7 set) cut two edge triples that belong
//! to disjoint triangles, and fanning all of them from one base vertex would
//! bridge the two into self-intersecting geometry. Before fanning, cut edges
//! are grouped into connected components via the cube's 6 faces (for regular
//! cells) or the transition grid's 4 unit squares (for transition cells):
//! a face with exactly 2 cut edges joins them (they're the endpoints of one
//! crossing curve over that face); a face with all 4 edges cut is the
//! ambiguous ("saddle") case where the sign pattern alternates around the
//! face, and is resolved by joining the two diagonally opposite pairs — a
//! deterministic choice, not a field-asymptotic decider. Each component is
//! then fanned from its own first vertex.

use crate::edge_table::{EDGE_CORNERS, EDGE_TABLE};

/// Triangle fan over a cell's cut-edge vertex list; `vertex_index` holds
/// `triangle_count * 3` indices into that per-case vertex list.
#[derive(Clone, Copy, Debug)]
pub struct RegularCellData {
  pub vertex_count: u8,
  pub triangle_count: u8,
  pub vertex_index: [u8; 15],
}

/// A vertex descriptor for one cut edge.
#[derive(Clone, Copy, Debug)]
pub struct VertexData {
  pub edge_corner_lo: u8,
  pub edge_corner_hi: u8,
}

/// Identity: this implementation does not compress the 256 cases down to
/// the published 15 topological classes (see module docs); every case is
/// its own class.
pub const fn regular_cell_class(case: u8) -> u8 {
  case
}

fn cut_edges(mask: u16) -> ([u8; 12], usize) {
  let mut edges = [0u8; 12];
  let mut n = 0;
  for e in 0..12u8 {
    if mask & (1 << e) != 0 {
      edges[n] = e;
      n += 1;
    }
  }
  (edges, n)
}

/// Disjoint-set over the 12 cube-edge ids, used to group cut edges into
/// connected components before fanning each one separately.
struct UnionFind12 {
  parent: [u8; 12],
}

impl UnionFind12 {
  fn new() -> Self {
    let mut parent = [0u8; 12];
    for (i, p) in parent.iter_mut().enumerate() {
      *p = i as u8;
    }
    Self { parent }
  }

  fn find(&self, x: u8) -> u8 {
    let mut x = x;
    while self.parent[x as usize] != x {
      x = self.parent[x as usize];
    }
    x
  }

  fn union(&mut self, a: u8, b: u8) {
    let ra = self.find(a);
    let rb = self.find(b);
    if ra != rb {
      self.parent[ra as usize] = rb;
    }
  }
}

/// The 6 faces of a regular cube cell, each a cyclic list of 4 edge ids
/// where consecutive entries share a corner (derived from
/// [`crate::edge_table::EDGE_CORNERS`]'s ZYX corner numbering).
const CUBE_FACES: [[u8; 4]; 6] =
  [[1, 6, 9, 2], [3, 7, 10, 4], [0, 4, 8, 2], [5, 7, 11, 6], [0, 3, 5, 1], [8, 10, 11, 9]];

/// The 4 unit squares of the transition cell's 3x3 fine-corner grid, each a
/// cyclic list of 4 edge ids over [`TRANSITION_EDGE_CORNERS`].
const TRANSITION_FACES: [[u8; 4]; 4] = [[0, 8, 2, 6], [1, 10, 3, 8], [2, 9, 4, 7], [3, 11, 5, 9]];

/// Groups the edges cut by `cut_mask` into connected components via `faces`
/// (see module docs for the 2-cut/4-cut joining rule).
fn group_cut_edges(cut_mask: u16, faces: &[[u8; 4]]) -> UnionFind12 {
  let mut uf = UnionFind12::new();
  for face in faces {
    let mut cut = [0u8; 4];
    let mut count = 0usize;
    for &e in face {
      if cut_mask & (1 << e) != 0 {
        cut[count] = e;
        count += 1;
      }
    }
    match count {
      2 => uf.union(cut[0], cut[1]),
      4 => {
        uf.union(face[0], face[3]);
        uf.union(face[1], face[2]);
      }
      _ => {}
    }
  }
  uf
}

/// Fans each connected component of `edges[..n]` (grouped via `faces`)
/// separately, instead of assuming all cut edges bound a single loop.
fn fan_triangulate_grouped(cut_mask: u16, edges: &[u8; 12], n: usize, faces: &[[u8; 4]]) -> (u8, [u8; 15]) {
  let mut vertex_index = [0u8; 15];
  let mut triangle_count = 0usize;
  if n < 3 {
    return (0, vertex_index);
  }

  let uf = group_cut_edges(cut_mask, faces);
  let mut component_of = [0u8; 12];
  for i in 0..n {
    component_of[i] = uf.find(edges[i]);
  }

  let mut visited = [false; 12];
  for i in 0..n {
    if visited[i] {
      continue;
    }
    let root = component_of[i];
    let mut members = [0u8; 12];
    let mut count = 0usize;
    for (j, &comp) in component_of.iter().enumerate().take(n).skip(i) {
      if comp == root {
        members[count] = j as u8;
        count += 1;
        visited[j] = true;
      }
    }
    if count < 3 {
      continue;
    }
    let base = members[0];
    for w in 1..count - 1 {
      vertex_index[triangle_count * 3] = base;
      vertex_index[triangle_count * 3 + 1] = members[w];
      vertex_index[triangle_count * 3 + 2] = members[w + 1];
      triangle_count += 1;
    }
  }
  (triangle_count as u8, vertex_index)
}

pub fn regular_cell_data(case: u8) -> RegularCellData {
  let mask = EDGE_TABLE[case as usize];
  let (edges, n) = cut_edges(mask);
  let (triangle_count, vertex_index) = fan_triangulate_grouped(mask, &edges, n, &CUBE_FACES);
  RegularCellData { vertex_count: n as u8, triangle_count, vertex_index }
}

/// Vertex descriptors for `case`, in the same order `regular_cell_data`'s
/// `vertex_index` entries reference.
pub fn regular_vertex_data(case: u8) -> ([VertexData; 12], usize) {
  let (edges, n) = cut_edges(EDGE_TABLE[case as usize]);
  let mut out = [VertexData { edge_corner_lo: 0, edge_corner_hi: 0 }; 12];
  for i in 0..n {
    let e = edges[i] as usize;
    out[i] = VertexData { edge_corner_lo: EDGE_CORNERS[e][0], edge_corner_hi: EDGE_CORNERS[e][1] };
  }
  (out, n)
}

// --- Transition cells (C8) -------------------------------------------------

/// Per-corner case-code weight, in the order the 9 high-resolution face
/// corners are numbered (a 3x3 grid, row-major: `6 7 8 / 3 4 5 / 0 1 2`).
pub const TRANSITION_CORNER_WEIGHT: [u16; 9] =
  [0x01, 0x02, 0x04, 0x80, 0x100, 0x08, 0x40, 0x20, 0x10];

/// The 12 edges of the 3x3 fine-corner grid (positions 0..8). The 4 coarse
/// duplicate corners (9..12) always share their source fine corner's sign
/// (§3 "Verify values at the shared corners match"), so they never
/// introduce a new cut edge; they matter only for the primary/secondary
/// position shift applied at runtime (`polygonize::transition`).
pub const TRANSITION_EDGE_CORNERS: [[u8; 2]; 12] = [
  [0, 1], [1, 2], [3, 4], [4, 5], [6, 7], [7, 8], // horizontal
  [0, 3], [3, 6], [1, 4], [4, 7], [2, 5], [5, 8], // vertical
];

/// Maps each fine corner (0..8) to its duplicate coarse corner (9..12), if
/// any; used by the runtime inward-shift logic (only corners on the coarse
/// face have one).
pub const TRANSITION_COARSE_DUPLICATE: [Option<u8>; 9] =
  [Some(9), None, Some(10), None, None, None, Some(11), None, Some(12)];

fn transition_corner_sign(case: u16, corner: usize) -> bool {
  case & TRANSITION_CORNER_WEIGHT[corner] != 0
}

fn transition_cut_mask(case: u16) -> u16 {
  let mut mask = 0u16;
  for (e, pair) in TRANSITION_EDGE_CORNERS.iter().enumerate() {
    let a = transition_corner_sign(case, pair[0] as usize);
    let b = transition_corner_sign(case, pair[1] as usize);
    if a != b {
      mask |= 1 << e;
    }
  }
  mask
}

/// This implementation's identity class: case truncated to its 9
/// significant bits. Winding is never inverted (the fan triangulation below
/// always winds the same way), unlike the published table's high bit.
pub fn transition_cell_class(case: u16) -> u16 {
  case
}

pub fn transition_cell_data(case: u16) -> RegularCellData {
  let mask = transition_cut_mask(case);
  let (edges, n) = cut_edges(mask);
  let (triangle_count, vertex_index) = fan_triangulate_grouped(mask, &edges, n, &TRANSITION_FACES);
  RegularCellData { vertex_count: n as u8, triangle_count, vertex_index }
}

pub fn transition_vertex_data(case: u16) -> ([VertexData; 12], usize) {
  let (edges, n) = cut_edges(transition_cut_mask(case));
  let mut out = [VertexData { edge_corner_lo: 0, edge_corner_hi: 0 }; 12];
  for i in 0..n {
    let e = edges[i] as usize;
    out[i] = VertexData {
      edge_corner_lo: TRANSITION_EDGE_CORNERS[e][0],
      edge_corner_hi: TRANSITION_EDGE_CORNERS[e][1],
    };
  }
  (out, n)
}

#[cfg(test)]
#[path = "case_tables_test.rs"]
mod case_tables_test;
