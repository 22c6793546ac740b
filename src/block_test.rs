use super::*;
use crate::constants::BLOCK_VOLUME;

fn roundtrip(samples: &[SdfSample]) -> Vec<SdfSample> {
  let encoded = compress(samples);
  let mut out = vec![0i8; BLOCK_VOLUME];
  decompress(&encoded, &mut out);
  out
}

#[test]
fn roundtrip_uniform_block() {
  let samples = vec![3i8; BLOCK_VOLUME];
  assert_eq!(roundtrip(&samples), samples);
}

#[test]
fn roundtrip_alternating_block() {
  let samples: Vec<i8> = (0..BLOCK_VOLUME).map(|i| if i % 2 == 0 { 1 } else { -1 }).collect();
  let decoded = roundtrip(&samples);
  assert_eq!(decoded, samples);
}

#[test]
fn roundtrip_random_like_block() {
  // Pathological for RLE: every sample differs from its neighbor, which
  // forces the raw fallback.
  let samples: Vec<i8> = (0..BLOCK_VOLUME).map(|i| ((i % 9) as i8) - 4).collect();
  let encoded = compress(&samples);
  assert!(encoded.raw, "should abandon RLE and fall back to raw storage");
  let decoded = roundtrip(&samples);
  assert_eq!(decoded, samples);
}

#[test]
fn long_runs_split_at_255() {
  let samples = vec![7i8; BLOCK_VOLUME];
  let encoded = compress(&samples);
  assert!(!encoded.raw);
  // 4096 samples in runs of at most 255 => at least ceil(4096/255) runs.
  let run_count = encoded.bytes.len() / 2;
  assert!(run_count >= (BLOCK_VOLUME + 254) / 255);
  let decoded = roundtrip(&samples);
  assert_eq!(decoded, samples);
}

#[test]
fn empty_iff_no_sign_change() {
  let all_positive = vec![4i8; BLOCK_VOLUME];
  assert!(is_distance_empty(&all_positive));

  let all_negative = vec![-4i8; BLOCK_VOLUME];
  assert!(is_distance_empty(&all_negative));

  let mut mixed = vec![4i8; BLOCK_VOLUME];
  mixed[BLOCK_VOLUME / 2] = -1;
  assert!(!is_distance_empty(&mixed));
}

#[test]
fn zero_sample_counts_as_non_empty() {
  // Per the preserved open question: a sample exactly at the isosurface
  // keeps the block live, even though its sign-product with itself is 0.
  let mut samples = vec![4i8; BLOCK_VOLUME];
  samples[0] = 0;
  assert!(!is_distance_empty(&samples));
}

#[test]
fn block_flags_roundtrip_bits() {
  let mut flags = BlockFlags::empty();
  flags.set(BlockFlags::EMPTY, true);
  flags.set(BlockFlags::DISTANCE_RAW, true);
  assert!(flags.contains(BlockFlags::EMPTY));
  assert!(flags.contains(BlockFlags::DISTANCE_RAW));
  assert!(!flags.contains(BlockFlags::MATERIAL_RAW));

  flags.set(BlockFlags::EMPTY, false);
  assert!(!flags.contains(BlockFlags::EMPTY));
}
