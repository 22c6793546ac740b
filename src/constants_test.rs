use super::*;

#[test]
fn block_extent_is_power_of_two() {
  assert!(BLOCK_EXTENT.is_power_of_two());
  assert_eq!(1usize << BLOCK_EXTENT_POWER, BLOCK_EXTENT);
  assert_eq!(BLOCK_VOLUME, BLOCK_EXTENT * BLOCK_EXTENT * BLOCK_EXTENT);
}

#[test]
fn coord_to_index_roundtrip() {
  for x in 0..BLOCK_EXTENT {
    for y in 0..BLOCK_EXTENT {
      for z in 0..BLOCK_EXTENT {
        let idx = coord_to_index(x, y, z);
        assert_eq!(index_to_coord(idx), (x, y, z));
      }
    }
  }
}

#[test]
fn corner_offsets_match_unit_offsets() {
  let offsets = corner_offsets(1);
  for (corner, &(dx, dy, dz)) in CORNER_UNIT_OFFSETS.iter().enumerate() {
    let expected = coord_to_index(dx as usize, dy as usize, dz as usize) as isize;
    assert_eq!(offsets[corner], expected, "corner {corner}");
  }
}

#[test]
fn corner_offsets_scale_with_stride() {
  let offsets2 = corner_offsets(2);
  assert_eq!(offsets2[1], 2);
  assert_eq!(offsets2[7], 2 + 2 * BLOCK_EXTENT as isize + 2 * BLOCK_EXTENT_SQ as isize);
}
