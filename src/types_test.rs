use super::*;

#[test]
fn quantize_rounds_half_away_from_zero() {
  assert_eq!(quantize_distance(0.5), 1);
  assert_eq!(quantize_distance(-0.5), -1);
  assert_eq!(quantize_distance(1.4), 1);
  assert_eq!(quantize_distance(-1.4), -1);
}

#[test]
fn quantize_clamps_to_range() {
  assert_eq!(quantize_distance(100.0), DISTANCE_MAX as SdfSample);
  assert_eq!(quantize_distance(-100.0), DISTANCE_MIN as SdfSample);
}

#[test]
fn case_bit_is_sign_bit() {
  assert_eq!(case_bit(-1), 1);
  assert_eq!(case_bit(-4), 1);
  assert_eq!(case_bit(0), 0);
  assert_eq!(case_bit(4), 0);
}
