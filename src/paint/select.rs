//! Adaptive brush selection: minimum-deviation search with randomized ties
//!
//! For every candidate stamp the search measures how far the source pixels
//! under the footprint stray from their footprint-weighted average color.
//! All so-far-best candidates are kept as a tie set (reset on strict
//! improvement), the scan bails out entirely once a candidate beats the
//! configured threshold, and the final pick is uniform over the tie set.
//! The randomized tie-break and the early bailout both trade optimality for
//! speed and stroke variety.

use rand::rngs::StdRng;
use rand::Rng;

use crate::brush_family::BrushStamp;
use crate::raster::Raster;

/// Footprint-weighted average color of `source` under `stamp` placed with its
/// top-left at (x0, y0). Weights are the stamp intensity channel, normalized
/// by the precomputed intensity sum.
pub fn footprint_average(source: &Raster, stamp: &BrushStamp, x0: i64, y0: i64) -> [u8; 3] {
    let mut acc = [0f64; 3];
    for_each_covered(source, &stamp.raster, x0, y0, |px, h, _| {
        let w = h as f64;
        for k in 0..3 {
            acc[k] += px[k] as f64 * w;
        }
    });
    let mut out = [0u8; 3];
    for k in 0..3 {
        out[k] = (acc[k] / stamp.intensity_sum).clamp(0.0, 255.0) as u8;
    }
    out
}

/// Weighted mean absolute deviation of the covered source pixels from their
/// footprint average, in byte units. When a source alpha is tracked its byte
/// is folded into the same weighted sum.
pub fn footprint_deviation(
    source: &Raster,
    alpha: Option<&Raster>,
    stamp: &BrushStamp,
    x0: i64,
    y0: i64,
) -> f32 {
    let avg = footprint_average(source, stamp, x0, y0);
    let mut dev = 0f64;
    for_each_covered(source, &stamp.raster, x0, y0, |px, h, (x, y)| {
        let w = h as f64;
        let d = (px[0] as i32 - avg[0] as i32).abs()
            + (px[1] as i32 - avg[1] as i32).abs()
            + (px[2] as i32 - avg[2] as i32).abs();
        dev += w * d as f64 / 3.0;
        if let Some(a) = alpha {
            dev += w * a.pixel(x, y)[0] as f64;
        }
    });
    (dev / stamp.intensity_sum) as f32
}

/// Visit every in-bounds source pixel covered by a nonzero stamp intensity.
fn for_each_covered(
    source: &Raster,
    stamp: &Raster,
    x0: i64,
    y0: i64,
    mut visit: impl FnMut([u8; 3], u8, (usize, usize)),
) {
    for sy in 0..stamp.height() {
        let cy = y0 + sy as i64;
        if cy < 0 || cy >= source.height() as i64 {
            continue;
        }
        for sx in 0..stamp.width() {
            let cx = x0 + sx as i64;
            if cx < 0 || cx >= source.width() as i64 {
                continue;
            }
            let h = stamp.pixel(sx, sy)[0];
            if h == 0 {
                continue;
            }
            visit(source.pixel(cx as usize, cy as usize), h, (cx as usize, cy as usize));
        }
    }
}

/// Scan `candidates` with `eval`, returning the chosen flat brush index.
/// Generic over the evaluator so tests can count invocations.
pub fn select_best(
    candidates: &[usize],
    threshold: f32,
    mut eval: impl FnMut(usize) -> f32,
    rng: &mut StdRng,
) -> usize {
    debug_assert!(!candidates.is_empty());
    let mut best_dev = f32::MAX;
    let mut ties: Vec<usize> = Vec::new();
    for &c in candidates {
        let dev = eval(c);
        if dev < best_dev {
            best_dev = dev;
            ties.clear();
            ties.push(c);
        } else if dev == best_dev {
            ties.push(c);
        }
        if dev < threshold {
            break;
        }
    }
    ties[rng.gen_range(0..ties.len())]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_bailout_stops_scan() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut calls = 0usize;
        let devs = [9.0, 3.0, 0.1, 7.0, 0.0];
        let chosen = select_best(
            &[0, 1, 2, 3, 4],
            0.5,
            |i| {
                calls += 1;
                devs[i]
            },
            &mut rng,
        );
        assert_eq!(chosen, 2);
        assert_eq!(calls, 3, "scan must stop at the bailout candidate");
    }

    #[test]
    fn test_tie_set_resets_on_strict_improvement() {
        // Fixed list: 5, 2, 2, 9, 2 with no bailout. The tie set after the
        // scan is {1, 2, 4}; candidate 0 must never win.
        let devs = [5.0, 2.0, 2.0, 9.0, 2.0];
        let mut wins = [0usize; 5];
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let c = select_best(&[0, 1, 2, 3, 4], -1.0, |i| devs[i], &mut rng);
            wins[c] += 1;
        }
        assert_eq!(wins[0], 0);
        assert_eq!(wins[3], 0);
        assert!(wins[1] > 0 && wins[2] > 0 && wins[4] > 0);
    }

    #[test]
    fn test_footprint_average_uniform_source() {
        let mut source = Raster::new(20, 20);
        source.fill([40, 90, 140]);
        let mut mask = Raster::new(4, 4);
        mask.fill([255, 255, 255]);
        let stamp = BrushStamp {
            intensity_sum: 16.0 * 255.0,
            raster: mask,
        };
        assert_eq!(footprint_average(&source, &stamp, 5, 5), [40, 90, 140]);
        assert_eq!(footprint_deviation(&source, None, &stamp, 5, 5), 0.0);
    }

    #[test]
    fn test_alpha_penalty_is_additive() {
        let mut source = Raster::new(20, 20);
        source.fill([100, 100, 100]);
        let mut alpha = Raster::new(20, 20);
        alpha.fill([200, 200, 200]);
        let mut mask = Raster::new(2, 2);
        mask.fill([255, 255, 255]);
        let stamp = BrushStamp {
            intensity_sum: 4.0 * 255.0,
            raster: mask,
        };
        let dev = footprint_deviation(&source, Some(&alpha), &stamp, 3, 3);
        assert!((dev - 200.0).abs() < 1e-3, "alpha-only deviation: {dev}");
    }
}
