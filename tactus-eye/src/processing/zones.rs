//! Column-zone intensity mapping

use crate::models::DepthMap;
use tactus_core::{ActuationVector, ZONE_COUNT};

/// Split `width` columns into the motor zones, left to right, as
/// half-open `(start, end)` ranges. Every zone gets `width / 7`
/// columns; the rightmost zone also absorbs the remainder, mirroring
/// the motor layout on the vest.
pub fn zone_bounds(width: u32) -> [(u32, u32); ZONE_COUNT] {
    let zone_width = width / ZONE_COUNT as u32;
    let mut bounds = [(0u32, 0u32); ZONE_COUNT];
    for (i, slot) in bounds.iter_mut().enumerate() {
        let start = i as u32 * zone_width;
        let end = if i == ZONE_COUNT - 1 {
            width
        } else {
            start + zone_width
        };
        *slot = (start, end);
    }
    bounds
}

/// Fold a normalized depth field into one intensity per motor: mean
/// nearness over the zone's columns, cubed. The cubic response keeps
/// far clutter quiet and ramps hard once something is actually close.
/// Zones with no columns (frames narrower than 7) stay silent.
pub fn zone_intensities(depth: &DepthMap) -> ActuationVector {
    let mut values = [0.0f32; ZONE_COUNT];
    let height = depth.height();

    for (i, (start, end)) in zone_bounds(depth.width()).into_iter().enumerate() {
        if start >= end {
            continue;
        }
        let mut sum = 0.0f64;
        for y in 0..height {
            for x in start..end {
                sum += depth.get(x, y) as f64;
            }
        }
        let count = ((end - start) as u64 * height as u64) as f64;
        let mean = sum / count;
        values[i] = ((mean * mean * mean) as f32).clamp(0.0, 1.0);
    }

    ActuationVector::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_divide_exactly() {
        let bounds = zone_bounds(700);
        for (i, (start, end)) in bounds.iter().enumerate() {
            assert_eq!(*start, i as u32 * 100);
            assert_eq!(*end, (i as u32 + 1) * 100);
        }
    }

    #[test]
    fn test_bounds_last_zone_takes_remainder() {
        let bounds = zone_bounds(703);
        assert_eq!(bounds[5], (500, 600));
        assert_eq!(bounds[6], (600, 703));
    }

    #[test]
    fn test_bounds_partition_whole_width() {
        for width in [7u32, 64, 100, 639, 700, 703, 1281] {
            let bounds = zone_bounds(width);
            assert_eq!(bounds[0].0, 0);
            assert_eq!(bounds[ZONE_COUNT - 1].1, width);
            for pair in bounds.windows(2) {
                assert_eq!(pair[0].1, pair[1].0);
            }
        }
    }

    #[test]
    fn test_bounds_narrow_frame_leaves_empty_zones() {
        let bounds = zone_bounds(5);
        for (start, end) in &bounds[..ZONE_COUNT - 1] {
            assert_eq!(start, end);
        }
        assert_eq!(bounds[6], (0, 5));
    }

    #[test]
    fn test_uniform_field_cubes_the_mean() {
        let depth = DepthMap::from_fn(70, 10, |_, _| 0.5);
        let v = zone_intensities(&depth);
        for i in 0..ZONE_COUNT {
            assert!((v[i] - 0.125).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ramp_field_increases_left_to_right() {
        let depth = DepthMap::from_fn(700, 4, |x, _| x as f32 / 699.0);
        let v = zone_intensities(&depth);
        for i in 1..ZONE_COUNT {
            assert!(v[i] > v[i - 1]);
        }
        // Zone means are (100i + 49.5) / 699 before cubing.
        let first = (49.5f32 / 699.0).powi(3);
        let last = (649.5f32 / 699.0).powi(3);
        assert!((v[0] - first).abs() < 1e-3);
        assert!((v[6] - last).abs() < 1e-3);
    }

    #[test]
    fn test_single_near_object_lights_one_zone() {
        // Nearness 1.0 in the middle zone only.
        let depth = DepthMap::from_fn(70, 10, |x, _| if (30..40).contains(&x) { 1.0 } else { 0.0 });
        let v = zone_intensities(&depth);
        assert!((v[3] - 1.0).abs() < 1e-6);
        for i in [0, 1, 2, 4, 5, 6] {
            assert_eq!(v[i], 0.0);
        }
    }

    #[test]
    fn test_narrow_frame_empty_zones_stay_silent() {
        let depth = DepthMap::from_fn(5, 3, |_, _| 1.0);
        let v = zone_intensities(&depth);
        for i in 0..ZONE_COUNT - 1 {
            assert_eq!(v[i], 0.0);
        }
        assert!((v[6] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_intensities_stay_in_unit_interval() {
        let depth = DepthMap::from_fn(64, 48, |x, y| ((x * 7 + y * 3) % 11) as f32 / 10.0);
        let v = zone_intensities(&depth);
        for i in 0..ZONE_COUNT {
            assert!((0.0..=1.0).contains(&v[i]));
        }
    }
}
