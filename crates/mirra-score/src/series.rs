//! Time-series angle comparison
//!
//! Both angle tables are resampled onto `samples` evenly spaced timestamps
//! spanning their common time window. At each timestamp the four joint
//! angles form a vector per side; the cosine similarity of the two vectors is
//! mapped from [-1, 1] to [0, 1].

use tracing::debug;

use mirra_core::{AngleChannel, AngleSample, MirraError, MirraResult};

/// Default number of resampled timestamps
pub const DEFAULT_SAMPLES: usize = 200;

/// Vectors shorter than this carry no direction
pub const ZERO_MOTION_EPSILON: f64 = 1e-6;

/// Summary of an offline comparison, similarities in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesComparison {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
    /// Common window the comparison covered
    pub window: (f64, f64),
}

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`
///
/// `xp` must be non-decreasing. Outside its range the boundary value is
/// returned.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let (Some(&first), Some(&last)) = (fp.first(), fp.last()) else {
        return 0.0;
    };

    let j = xp.partition_point(|v| *v <= x);
    if j == 0 {
        return first;
    }
    if j == xp.len() {
        return last;
    }

    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Cosine similarity, 0 when either vector has (near) zero length
pub fn cosine_similarity(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f64>().sqrt();

    if na < ZERO_MOTION_EPSILON || nb < ZERO_MOTION_EPSILON {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// Resample an angle sequence onto a timestamp grid
pub fn resample(sequence: &[AngleSample], grid: &[f64]) -> Vec<AngleSample> {
    let times: Vec<f64> = sequence.iter().map(|s| s.t).collect();
    let channels: Vec<(AngleChannel, Vec<f64>)> = AngleChannel::all()
        .iter()
        .map(|c| (*c, sequence.iter().map(|s| s.channel(*c)).collect()))
        .collect();

    grid.iter()
        .map(|&t| {
            let mut sample = AngleSample::zero(t);
            for (channel, values) in &channels {
                sample.set_channel(*channel, interp(t, &times, values));
            }
            sample
        })
        .collect()
}

fn time_range(sequence: &[AngleSample], name: &str) -> MirraResult<(f64, f64)> {
    let (Some(first), Some(last)) = (sequence.first(), sequence.last()) else {
        return Err(MirraError::InvalidArgument(format!(
            "{name} angle sequence is empty"
        )));
    };
    if sequence.windows(2).any(|w| w[1].t < w[0].t) {
        return Err(MirraError::InvalidArgument(format!(
            "{name} timestamps must be non-decreasing"
        )));
    }
    Ok((first.t, last.t))
}

/// Compare two angle sequences over their common time window
pub fn compare(
    reference: &[AngleSample],
    live: &[AngleSample],
    samples: usize,
) -> MirraResult<SeriesComparison> {
    if samples < 2 {
        return Err(MirraError::InvalidArgument(format!(
            "samples must be at least 2, got {samples}"
        )));
    }

    let (ref_start, ref_end) = time_range(reference, "reference")?;
    let (live_start, live_end) = time_range(live, "live")?;

    let start = ref_start.max(live_start);
    let end = ref_end.min(live_end);
    if start >= end {
        return Err(MirraError::EmptyOverlap { start, end });
    }
    debug!(start, end, samples, "comparing angle timelines");

    let grid = linspace(start, end, samples);
    let ref_resampled = resample(reference, &grid);
    let live_resampled = resample(live, &grid);

    let similarities: Vec<f64> = ref_resampled
        .iter()
        .zip(live_resampled.iter())
        .map(|(r, l)| (cosine_similarity(&r.to_vector(), &l.to_vector()) + 1.0) / 2.0)
        .collect();

    let n = similarities.len();
    let mean = similarities.iter().sum::<f64>() / n as f64;
    let min = similarities.iter().copied().fold(f64::INFINITY, f64::min);
    let max = similarities.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(SeriesComparison {
        mean,
        min,
        max,
        n,
        window: (start, end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timeline(start: f64, end: f64, n: usize) -> Vec<AngleSample> {
        linspace(start, end, n)
            .into_iter()
            .map(|t| AngleSample::new(t, 1.0 + t.sin() * 0.5, 2.0, 2.5 + t.cos(), 3.0))
            .collect()
    }

    #[test]
    fn test_linspace_endpoints() {
        let grid = linspace(1.0, 2.0, 5);
        assert_eq!(grid, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
    }

    #[test]
    fn test_interp_clamps_and_interpolates() {
        let xp = [0.0, 1.0, 3.0];
        let fp = [0.0, 10.0, 30.0];
        assert_eq!(interp(-1.0, &xp, &fp), 0.0);
        assert_eq!(interp(0.5, &xp, &fp), 5.0);
        assert_eq!(interp(2.0, &xp, &fp), 20.0);
        assert_eq!(interp(3.0, &xp, &fp), 30.0);
        assert_eq!(interp(9.0, &xp, &fp), 30.0);
    }

    #[test]
    fn test_identical_tables_score_one() {
        let a = timeline(0.0, 4.0, 60);
        let result = compare(&a, &a, DEFAULT_SAMPLES).unwrap();
        assert!((result.mean - 1.0).abs() < 1e-9);
        assert!((result.min - 1.0).abs() < 1e-9);
        assert!((result.max - 1.0).abs() < 1e-9);
        assert_eq!(result.n, DEFAULT_SAMPLES);
    }

    #[test]
    fn test_opposite_vectors_score_zero() {
        let a = vec![AngleSample::new(0.0, 1.0, 1.0, 1.0, 1.0), AngleSample::new(1.0, 1.0, 1.0, 1.0, 1.0)];
        let b: Vec<_> = a
            .iter()
            .map(|s| AngleSample::new(s.t, -1.0, -1.0, -1.0, -1.0))
            .collect();
        let result = compare(&a, &b, 10).unwrap();
        assert!(result.max.abs() < 1e-12);
    }

    #[test]
    fn test_zero_motion_maps_to_half() {
        let a = vec![AngleSample::zero(0.0), AngleSample::zero(1.0)];
        let b = timeline(0.0, 1.0, 5);
        let result = compare(&a, &b, 4).unwrap();
        assert!((result.mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_window_is_intersection() {
        let a = timeline(0.0, 5.0, 20);
        let b = timeline(2.0, 8.0, 20);
        let result = compare(&a, &b, 50).unwrap();
        assert_eq!(result.window, (2.0, 5.0));
    }

    #[test]
    fn test_non_overlapping_fails() {
        let a = timeline(0.0, 1.0, 10);
        let b = timeline(2.0, 3.0, 10);
        assert!(matches!(
            compare(&a, &b, 10),
            Err(MirraError::EmptyOverlap { .. })
        ));

        // touching ranges have zero width
        let c = timeline(1.0, 2.0, 10);
        assert!(matches!(
            compare(&a, &c, 10),
            Err(MirraError::EmptyOverlap { .. })
        ));
    }

    #[test]
    fn test_invalid_arguments() {
        let a = timeline(0.0, 1.0, 10);
        assert!(matches!(
            compare(&a, &a, 1),
            Err(MirraError::InvalidArgument(_))
        ));
        assert!(matches!(
            compare(&[], &a, 10),
            Err(MirraError::InvalidArgument(_))
        ));

        let mut shuffled = a.clone();
        shuffled.swap(0, 5);
        assert!(compare(&shuffled, &a, 10).is_err());
    }

    fn table(start: f64, span: f64, angles: &[[f64; 4]]) -> Vec<AngleSample> {
        linspace(start, start + span, angles.len())
            .into_iter()
            .zip(angles)
            .map(|(t, a)| AngleSample::new(t, a[0], a[1], a[2], a[3]))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_similarity_bounds(
            ref_start in 0.0f64..1.0,
            ref_span in 1.0f64..3.0,
            live_start in 0.0f64..1.0,
            live_span in 1.0f64..3.0,
            ref_angles in prop::collection::vec(prop::array::uniform4(-4.0f64..4.0), 2..30),
            live_angles in prop::collection::vec(prop::array::uniform4(-4.0f64..4.0), 2..30),
            samples in 2usize..300,
        ) {
            let reference = table(ref_start, ref_span, &ref_angles);
            let live = table(live_start, live_span, &live_angles);
            let result = compare(&reference, &live, samples).unwrap();

            prop_assert_eq!(result.n, samples);
            prop_assert!(0.0 <= result.min);
            prop_assert!(result.min <= result.mean + 1e-12);
            prop_assert!(result.mean <= result.max + 1e-12);
            prop_assert!(result.max <= 1.0);
            prop_assert!(result.window.0 < result.window.1);
        }
    }
}
