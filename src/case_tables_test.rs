use super::*;

#[test]
fn trivial_cases_have_no_triangles() {
  assert_eq!(regular_cell_data(0).triangle_count, 0);
  assert_eq!(regular_cell_data(0xFF).triangle_count, 0);
}

#[test]
fn single_corner_case_is_one_triangle() {
  // Only corner 0 differs: exactly edges 0,1,2 are cut (all touch corner 0).
  let data = regular_cell_data(0b0000_0001);
  assert_eq!(data.vertex_count, 3);
  assert_eq!(data.triangle_count, 1);

  let (vertices, n) = regular_vertex_data(0b0000_0001);
  assert_eq!(n, 3);
  let mut corners: Vec<u8> = vertices[..n].iter().map(|v| v.edge_corner_lo).collect();
  corners.sort_unstable();
  assert_eq!(corners, vec![0, 0, 0]);
}

#[test]
fn fan_triangulation_is_internally_consistent_for_every_case() {
  // With multi-component cases, triangle count is the sum of
  // `component_size - 2` over components of size >= 3, which is at most
  // `vertex_count - 2` (equal only when there's a single component) and at
  // least 0.
  for case in 0u16..256 {
    let data = regular_cell_data(case as u8);
    let max_triangles = if data.vertex_count >= 3 { data.vertex_count as usize - 2 } else { 0 };
    assert!(data.triangle_count as usize <= max_triangles, "case {case}");
    for t in 0..data.triangle_count as usize {
      let a = data.vertex_index[t * 3];
      let b = data.vertex_index[t * 3 + 1];
      let c = data.vertex_index[t * 3 + 2];
      assert!((a as usize) < data.vertex_count as usize);
      assert!((b as usize) < data.vertex_count as usize);
      assert!((c as usize) < data.vertex_count as usize);
    }
  }
}

#[test]
fn opposite_corners_produce_two_disjoint_triangles_not_a_bridging_fan() {
  // Corners 0 and 7 (diagonally opposite) set: cut edges {0,1,2,7,10,11} form
  // two separate triangles, one around each corner, not a single loop.
  let data = regular_cell_data(0x81);
  assert_eq!(data.vertex_count, 6);
  assert_eq!(data.triangle_count, 2);

  let (vertices, n) = regular_vertex_data(0x81);
  assert_eq!(n, 6);

  // Each triangle's 3 cut edges all meet at one cube corner; that corner is
  // whichever endpoint value appears in all 3 edges' (lo, hi) pairs.
  let mut shared_corners: Vec<u8> = Vec::new();
  for t in 0..data.triangle_count as usize {
    let mut counts = [0u8; 8];
    for &i in &data.vertex_index[t * 3..t * 3 + 3] {
      let v = vertices[i as usize];
      counts[v.edge_corner_lo as usize] += 1;
      counts[v.edge_corner_hi as usize] += 1;
    }
    let shared = counts.iter().position(|&c| c == 3).expect("triangle's edges share a corner") as u8;
    shared_corners.push(shared);
  }
  shared_corners.sort_unstable();
  assert_eq!(shared_corners, vec![0, 7]);
}

#[test]
fn complementary_cases_share_the_same_cut_edges() {
  // A case and its bitwise complement describe the same surface crossing
  // (inside/outside swapped), so they must cut the same edges.
  for case in 0u16..256 {
    let a = regular_cell_data(case as u8);
    let b = regular_cell_data((case ^ 0xFF) as u8);
    assert_eq!(a.vertex_count, b.vertex_count, "case {case}");
  }
}

#[test]
fn transition_case_zero_and_full_have_no_triangles() {
  assert_eq!(transition_cell_data(0).triangle_count, 0);
  assert_eq!(transition_cell_data(0x1FF).triangle_count, 0);
}

#[test]
fn transition_single_fine_corner_cuts_two_edges() {
  // Corner 0 (weight 0x01) alone set: only the two fine-grid edges incident
  // to corner 0 (0-1 and 0-3) are cut.
  let (vertices, n) = transition_vertex_data(0x01);
  assert_eq!(n, 2);
  let mut corners: Vec<u8> = vertices[..n].iter().map(|v| v.edge_corner_lo).collect();
  corners.sort_unstable();
  assert_eq!(corners, vec![0, 0]);
}

#[test]
fn transition_coarse_duplicates_cover_the_four_face_corners() {
  let present: Vec<u8> = TRANSITION_COARSE_DUPLICATE.iter().filter_map(|d| *d).collect();
  assert_eq!(present, vec![9, 10, 11, 12]);
}
