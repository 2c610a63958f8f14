//! Brush preparation: a size/orientation family of prepared stamps
//!
//! One brush asset becomes `size_num * orient_num` rotated and rescaled
//! variants, all padded to common dimensions so indexed access is uniform.
//! Monochrome brushes additionally carry an embossed relief channel (stored in
//! the green byte) and a cached intensity sum for color averaging. When drop
//! shadows are requested a parallel family of blurred, darkened masks is
//! derived.

use crate::config::PaintConfig;
use crate::raster::Raster;

/// One prepared brush variant.
#[derive(Debug, Clone)]
pub struct BrushStamp {
    pub raster: Raster,
    /// Sum of the intensity channel over the whole stamp; normalizes
    /// footprint-weighted color averages.
    pub intensity_sum: f64,
}

/// The full variant family for one paint invocation.
#[derive(Debug, Clone)]
pub struct BrushFamily {
    stamps: Vec<BrushStamp>,
    shadows: Option<Vec<Raster>>,
    orient_count: usize,
    size_count: usize,
    width: usize,
    height: usize,
    shadow_pad: usize,
    monochrome: bool,
}

impl BrushFamily {
    /// Prepare the family from a base brush asset and the paint config.
    pub fn prepare(base: &Raster, cfg: &PaintConfig) -> Self {
        let orient_count = cfg.orient_num.max(1);
        let size_count = cfg.size_num.max(1);
        let min_size = cfg.size_first.max(1.0);
        let max_size = cfg.size_last.max(min_size);

        let mut base = base.clone();
        let monochrome = base.is_grayscale();

        // Aspect distortion scales height by 10^aspect.
        if cfg.brush_aspect.abs() > 1e-4 {
            let new_h = (base.height() as f32 * 10f32.powf(cfg.brush_aspect)).round() as usize;
            let w = base.width();
            base.resize(w, new_h.max(1));
        }
        if (cfg.brush_gamma - 1.0).abs() > 1e-3 {
            base.apply_gamma(cfg.brush_gamma, true, true, true);
        }

        // Rescale so the larger dimension equals the maximum stroke size.
        let long_side = base.width().max(base.height()) as f32;
        let scale = max_size / long_side;
        let (bw, bh) = (
            (base.width() as f32 * scale).round().max(1.0) as usize,
            (base.height() as f32 * scale).round().max(1.0) as usize,
        );
        base.resize(bw, bh);

        // Square-pad so free rotation never clips content.
        let side = (std::f32::consts::SQRT_2 * bw.max(bh) as f32).ceil() as usize;
        let (px, py) = (side - base.width(), side - base.height());
        base.pad(px / 2, px - px / 2, py / 2, py - py / 2, [0, 0, 0]);

        let mut stamps = Vec::with_capacity(size_count * orient_count);
        for sn in 0..size_count {
            let frac = if size_count == 1 {
                1.0
            } else {
                let t = sn as f32 / (size_count - 1) as f32;
                (min_size + (max_size - min_size) * t) / max_size
            };
            for on in 0..orient_count {
                let angle = cfg.orient_first + on as f32 * cfg.orient_last / orient_count as f32;
                let mut stamp = base.clone();
                stamp.rotate(angle);
                if (frac - 1.0).abs() > 1e-6 {
                    let w = (stamp.width() as f32 * frac).round().max(1.0) as usize;
                    let h = (stamp.height() as f32 * frac).round().max(1.0) as usize;
                    stamp.resize(w, h);
                }
                stamp.autocrop(1);
                if monochrome {
                    derive_relief(&mut stamp);
                }
                let intensity_sum = stamp
                    .data()
                    .chunks_exact(3)
                    .map(|px| px[0] as f64)
                    .sum::<f64>()
                    .max(1.0);
                stamps.push(BrushStamp {
                    raster: stamp,
                    intensity_sum,
                });
            }
        }

        // Pad every variant to the family-wide maximum so (size, orient)
        // indexing sees uniform dimensions.
        let width = stamps.iter().map(|s| s.raster.width()).max().unwrap_or(1);
        let height = stamps.iter().map(|s| s.raster.height()).max().unwrap_or(1);
        for s in &mut stamps {
            let (dw, dh) = (width - s.raster.width(), height - s.raster.height());
            if dw > 0 || dh > 0 {
                s.raster
                    .pad(dw / 2, dw - dw / 2, dh / 2, dh - dh / 2, [0, 0, 0]);
            }
        }

        let shadow_pad = 2 * cfg.shadow_blur;
        let shadows = cfg.drop_shadow.then(|| {
            stamps
                .iter()
                .map(|s| derive_shadow(&s.raster, cfg.shadow_blur))
                .collect()
        });

        tracing::debug!(
            "brush family prepared: {}x{} variants, {}x{} px each",
            size_count,
            orient_count,
            width,
            height
        );

        Self {
            stamps,
            shadows,
            orient_count,
            size_count,
            width,
            height,
            shadow_pad,
            monochrome,
        }
    }

    /// True when the source brush was grayscale (relief channel present).
    pub fn monochrome(&self) -> bool {
        self.monochrome
    }

    pub fn orient_count(&self) -> usize {
        self.orient_count
    }

    pub fn size_count(&self) -> usize {
        self.size_count
    }

    /// Common stamp width across the family.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Flat index for a (size bucket, orientation bucket) pair.
    pub fn index(&self, size_idx: usize, orient_idx: usize) -> usize {
        size_idx.min(self.size_count - 1) * self.orient_count
            + orient_idx.min(self.orient_count - 1)
    }

    pub fn stamp(&self, flat: usize) -> &BrushStamp {
        &self.stamps[flat.min(self.stamps.len() - 1)]
    }

    pub fn shadow(&self, flat: usize) -> Option<&Raster> {
        self.shadows
            .as_ref()
            .map(|v| &v[flat.min(self.stamps.len() - 1)])
    }

    /// Padding added around shadow masks relative to their stamps.
    pub fn shadow_pad(&self) -> usize {
        self.shadow_pad
    }
}

/// Emboss the stamp into its green channel: relief is the positive part of
/// the diagonal first difference of the intensity channel.
fn derive_relief(stamp: &mut Raster) {
    let (w, h) = (stamp.width(), stamp.height());
    for y in 0..h {
        for x in 0..w {
            let here = stamp.pixel(x, y)[0] as i16;
            let prev = if x > 0 && y > 0 {
                stamp.pixel(x - 1, y - 1)[0] as i16
            } else {
                0
            };
            let mut px = stamp.pixel(x, y);
            px[1] = (here - prev).max(0) as u8;
            stamp.set_pixel(x, y, px);
        }
    }
}

/// Shadow mask: keep only the blue channel, grow by the blur margin, then
/// blur repeatedly.
fn derive_shadow(stamp: &Raster, blur: usize) -> Raster {
    let mut shadow = stamp.clone();
    for px in shadow.data_mut().chunks_exact_mut(3) {
        px[0] = 0;
        px[1] = 0;
    }
    let pad = 2 * blur;
    shadow.pad(pad, pad, pad, pad, [0, 0, 0]);
    for _ in 0..blur {
        shadow.blur(2, 2);
    }
    shadow
}
