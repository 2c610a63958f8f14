//! Phase B: per-pixel orientation and size bucket maps
//!
//! Each map is a grayscale raster (channel 0 meaningful) over the interior
//! image; the engine edge-pads it to the working canvas. Bucket selection is
//! `count * value / 256`.

use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

use crate::config::FieldKind;
use crate::field::{OrientField, SizeField};
use crate::raster::Raster;

/// Build the orientation bucket map, or `None` when the kind needs no map
/// (Random draws per stroke, Adaptive searches per stroke).
pub fn orientation_map(
    kind: FieldKind,
    source: &Raster,
    field: &OrientField,
    rng: &mut StdRng,
) -> Option<Raster> {
    match kind {
        FieldKind::Random | FieldKind::Adaptive => None,
        FieldKind::Manual => Some(manual_map(source, |nx, ny| {
            let deg = field.direction_at(nx, ny).rem_euclid(360.0);
            (deg / 360.0 * 255.0) as u8
        })),
        _ => Some(content_map(kind, source, rng)),
    }
}

/// Build the size bucket map; same `None` cases as `orientation_map`.
pub fn size_map(
    kind: FieldKind,
    source: &Raster,
    field: &SizeField,
    rng: &mut StdRng,
) -> Option<Raster> {
    match kind {
        FieldKind::Random | FieldKind::Adaptive => None,
        FieldKind::Manual => Some(manual_map(source, |nx, ny| {
            (field.size_at(nx, ny) * 255.0) as u8
        })),
        _ => Some(content_map(kind, source, rng)),
    }
}

fn manual_map(source: &Raster, eval: impl Fn(f32, f32) -> u8 + Sync) -> Raster {
    let (w, h) = (source.width(), source.height());
    let mut map = Raster::new(w, h);
    map.data_mut()
        .par_chunks_mut(w * 3)
        .enumerate()
        .for_each(|(y, row)| {
            let ny = y as f32 / h as f32;
            for x in 0..w {
                let v = eval(x as f32 / w as f32, ny);
                row[x * 3..x * 3 + 3].copy_from_slice(&[v, v, v]);
            }
        });
    map
}

fn content_map(kind: FieldKind, source: &Raster, rng: &mut StdRng) -> Raster {
    let (w, h) = (source.width(), source.height());
    if kind == FieldKind::Flowing {
        return flowing_map(w, h, rng);
    }
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    let mut map = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = match kind {
                FieldKind::Radius => {
                    let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                    (d / max_dist * 255.0) as u8
                }
                FieldKind::Radial => {
                    let a = (y as f32 - cy).atan2(x as f32 - cx);
                    ((a / std::f32::consts::PI + 1.0) / 2.0 * 255.0) as u8
                }
                FieldKind::Hue => hue_byte(source.pixel(x, y)),
                // Value: mean of the channels.
                _ => {
                    let p = source.pixel(x, y);
                    ((p[0] as u16 + p[1] as u16 + p[2] as u16) / 3) as u8
                }
            };
            map.set_pixel(x, y, [v, v, v]);
        }
    }
    map
}

/// Hue in [0, 360) scaled to a byte; gray pixels map to 0.
fn hue_byte(px: [u8; 3]) -> u8 {
    let r = px[0] as f32;
    let g = px[1] as f32;
    let b = px[2] as f32;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max <= min {
        return 0;
    }
    let d = max - min;
    let h = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0 * 255.0) as u8
}

/// Smoothed plasma noise: midpoint displacement on a coarse grid, blurred
/// twice, then upscaled to the full canvas.
fn flowing_map(w: usize, h: usize, rng: &mut StdRng) -> Raster {
    let mut small = gray_plasma(w / 6 + 5, h / 6 + 5, rng);
    small.blur(2, 2);
    small.blur(2, 2);
    small.resize(w, h);
    small
}

fn plasma_put(r: &mut Raster, x: usize, y: usize, v: f32) {
    // Zero marks "unset"; shared edge midpoints keep their first value.
    if r.pixel(x, y)[0] == 0 {
        let b = v.clamp(1.0, 255.0) as u8;
        r.set_pixel(x, y, [b, b, b]);
    }
}

fn plasma_sub(r: &mut Raster, x0: usize, y0: usize, x1: usize, y1: usize, amp: f32, rng: &mut StdRng) {
    if x1 - x0 <= 1 && y1 - y0 <= 1 {
        return;
    }
    let mx = (x0 + x1) / 2;
    let my = (y0 + y1) / 2;
    let corner = |r: &Raster, x: usize, y: usize| r.pixel(x, y)[0] as f32;

    let jitter = |rng: &mut StdRng| rng.gen_range(-1.0f32..1.0) * amp;
    let top = (corner(r, x0, y0) + corner(r, x1, y0)) / 2.0 + jitter(rng);
    plasma_put(r, mx, y0, top);
    let bottom = (corner(r, x0, y1) + corner(r, x1, y1)) / 2.0 + jitter(rng);
    plasma_put(r, mx, y1, bottom);
    let left = (corner(r, x0, y0) + corner(r, x0, y1)) / 2.0 + jitter(rng);
    plasma_put(r, x0, my, left);
    let right = (corner(r, x1, y0) + corner(r, x1, y1)) / 2.0 + jitter(rng);
    plasma_put(r, x1, my, right);
    let center = (corner(r, x0, y0) + corner(r, x1, y0) + corner(r, x0, y1) + corner(r, x1, y1))
        / 4.0
        + jitter(rng);
    plasma_put(r, mx, my, center);

    let amp = amp / 2.0;
    plasma_sub(r, x0, y0, mx, my, amp, rng);
    plasma_sub(r, mx, y0, x1, my, amp, rng);
    plasma_sub(r, x0, my, mx, y1, amp, rng);
    plasma_sub(r, mx, my, x1, y1, amp, rng);
}

fn gray_plasma(w: usize, h: usize, rng: &mut StdRng) -> Raster {
    let w = w.max(2);
    let h = h.max(2);
    let mut r = Raster::new(w, h);
    for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
        plasma_put(&mut r, x, y, rng.gen_range(1.0f32..255.0));
    }
    plasma_sub(&mut r, 0, 0, w - 1, h - 1, 128.0, rng);
    r
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_value_map_is_luminance() {
        let mut src = Raster::new(2, 1);
        src.set_pixel(0, 0, [30, 60, 90]);
        src.set_pixel(1, 0, [255, 255, 255]);
        let mut rng = StdRng::seed_from_u64(1);
        let map = orientation_map(FieldKind::Value, &src, &OrientField::default(), &mut rng)
            .unwrap();
        assert_eq!(map.pixel(0, 0)[0], 60);
        assert_eq!(map.pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_radius_map_centered() {
        let src = Raster::new(17, 17);
        let mut rng = StdRng::seed_from_u64(1);
        let map = size_map(FieldKind::Radius, &src, &SizeField::default(), &mut rng).unwrap();
        assert!(map.pixel(8, 8)[0] < 20);
        assert!(map.pixel(0, 0)[0] > 200);
    }

    #[test]
    fn test_random_and_adaptive_have_no_map() {
        let src = Raster::new(4, 4);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(orientation_map(FieldKind::Random, &src, &OrientField::default(), &mut rng)
            .is_none());
        assert!(size_map(FieldKind::Adaptive, &src, &SizeField::default(), &mut rng).is_none());
    }

    #[test]
    fn test_flowing_map_deterministic_per_seed() {
        let src = Raster::new(24, 24);
        let a = orientation_map(
            FieldKind::Flowing,
            &src,
            &OrientField::default(),
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        let b = orientation_map(
            FieldKind::Flowing,
            &src,
            &OrientField::default(),
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!((a.width(), a.height()), (24, 24));
    }

    #[test]
    fn test_hue_byte_primaries() {
        assert_eq!(hue_byte([255, 0, 0]), 0);
        let g = hue_byte([0, 255, 0]);
        assert!((g as i32 - 85).abs() <= 1, "green hue {g}");
        let b = hue_byte([0, 0, 255]);
        assert!((b as i32 - 170).abs() <= 1, "blue hue {b}");
        assert_eq!(hue_byte([128, 128, 128]), 0);
    }
}
