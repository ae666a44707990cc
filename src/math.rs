//! Clamped linear remapping between two ranges

use crate::error::{AviatorError, Result};

/// Clamp `value` into `[in_min, in_max]` and map it linearly onto `[out_min, out_max]`.
///
/// Fails with [`AviatorError::InvalidRange`] unless `in_max > in_min` and both
/// input bounds are finite.
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> Result<f32> {
    Ok(RangeMap::new(in_min, in_max, out_min, out_max)?.apply(value))
}

/// A validated input -> output range pair.
///
/// Built once from configuration, then applied every frame without further checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMap {
    in_min: f32,
    in_max: f32,
    out_min: f32,
    out_max: f32,
}

impl RangeMap {
    pub fn new(in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> Result<Self> {
        if !in_min.is_finite() || !in_max.is_finite() || in_max <= in_min {
            return Err(AviatorError::InvalidRange { in_min, in_max });
        }
        Ok(Self { in_min, in_max, out_min, out_max })
    }

    pub fn input(&self) -> (f32, f32) {
        (self.in_min, self.in_max)
    }

    pub fn output(&self) -> (f32, f32) {
        (self.out_min, self.out_max)
    }

    pub fn apply(&self, value: f32) -> f32 {
        // NaN compares false everywhere; pin it to the lower bound
        let value = if value.is_nan() { self.in_min } else { value };
        let clamped = value.clamp(self.in_min, self.in_max);

        // Endpoints map exactly, independent of rounding in the span
        if clamped == self.in_max {
            return self.out_max;
        }

        let fraction = (clamped - self.in_min) / (self.in_max - self.in_min);
        let result = self.out_min + fraction * (self.out_max - self.out_min);

        let (lo, hi) = if self.out_min <= self.out_max {
            (self.out_min, self.out_max)
        } else {
            (self.out_max, self.out_min)
        };
        result.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-4, "expected {b}, got {a}");
    }

    #[test]
    fn test_endpoints_map_exactly() {
        assert_eq!(remap(-0.75, -0.75, 0.75, 25.0, 130.0).unwrap(), 25.0);
        assert_eq!(remap(0.75, -0.75, 0.75, 25.0, 130.0).unwrap(), 130.0);
        assert_eq!(remap(0.1, 0.1, 0.3, -7.3, 11.9).unwrap(), -7.3);
        assert_eq!(remap(0.3, 0.1, 0.3, -7.3, 11.9).unwrap(), 11.9);
    }

    #[test]
    fn test_midpoint() {
        assert_close(remap(0.0, -0.75, 0.75, 25.0, 130.0).unwrap(), 77.5);
        assert_close(remap(0.0, -0.75, 0.75, -100.0, 100.0).unwrap(), 0.0);
    }

    #[test]
    fn test_clamps_outside_input_range() {
        let map = RangeMap::new(-0.75, 0.75, 25.0, 130.0).unwrap();
        assert_eq!(map.apply(-1.0), map.apply(-0.75));
        assert_eq!(map.apply(-1000.0), 25.0);
        assert_eq!(map.apply(1.0), map.apply(0.75));
        assert_eq!(map.apply(f32::INFINITY), 130.0);
        assert_eq!(map.apply(f32::NEG_INFINITY), 25.0);
    }

    #[test]
    fn test_in_range_values_stay_in_output_and_are_monotonic() {
        let map = RangeMap::new(-0.75, 0.75, 25.0, 130.0).unwrap();
        let mut previous = f32::NEG_INFINITY;
        for i in 0..=1000 {
            let value = -0.75 + 1.5 * (i as f32 / 1000.0);
            let out = map.apply(value);
            assert!((25.0..=130.0).contains(&out), "{out} out of range for {value}");
            assert!(out >= previous, "not monotonic at {value}");
            previous = out;
        }
    }

    #[test]
    fn test_inverted_output_range() {
        let map = RangeMap::new(0.0, 1.0, 10.0, -10.0).unwrap();
        assert_eq!(map.apply(0.0), 10.0);
        assert_eq!(map.apply(1.0), -10.0);
        assert_close(map.apply(0.25), 5.0);
        assert!(map.apply(0.9) >= -10.0);
    }

    #[test]
    fn test_rejects_degenerate_input_range() {
        assert!(matches!(
            remap(0.5, 1.0, 1.0, 0.0, 1.0),
            Err(AviatorError::InvalidRange { .. })
        ));
        assert!(RangeMap::new(1.0, -1.0, 0.0, 1.0).is_err());
        assert!(RangeMap::new(f32::NAN, 1.0, 0.0, 1.0).is_err());
        assert!(RangeMap::new(0.0, f32::INFINITY, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_nan_value_maps_to_lower_output() {
        let map = RangeMap::new(-1.0, 1.0, 3.0, 9.0).unwrap();
        assert_eq!(map.apply(f32::NAN), 3.0);
    }
}
