//! Per-pixel filters: box blur, gamma/brightness remap, invert

use rayon::prelude::*;

use super::Raster;

impl Raster {
    /// Box-filter blur over a (2*rx+1) x (2*ry+1) window. Windows are clamped
    /// at the edges, so border pixels average over a smaller neighborhood.
    pub fn blur(&mut self, rx: usize, ry: usize) {
        if rx == 0 && ry == 0 {
            return;
        }
        let w = self.width;
        let h = self.height;

        // Horizontal pass into a float buffer, then vertical back into place.
        // Per-axis clamped windows compose to the exact rectangle average.
        let mut tmp = vec![0f32; w * h * 3];
        tmp.par_chunks_mut(w * 3).enumerate().for_each(|(y, row)| {
            for x in 0..w {
                let x0 = x.saturating_sub(rx);
                let x1 = (x + rx).min(w - 1);
                let n = (x1 - x0 + 1) as f32;
                let mut acc = [0f32; 3];
                for xx in x0..=x1 {
                    let p = self.pixel(xx, y);
                    for k in 0..3 {
                        acc[k] += p[k] as f32;
                    }
                }
                for k in 0..3 {
                    row[x * 3 + k] = acc[k] / n;
                }
            }
        });

        let tmp = &tmp;
        self.data
            .par_chunks_mut(w * 3)
            .enumerate()
            .for_each(|(y, row)| {
                let y0 = y.saturating_sub(ry);
                let y1 = (y + ry).min(h - 1);
                let n = (y1 - y0 + 1) as f32;
                for x in 0..w {
                    for k in 0..3 {
                        let mut acc = 0f32;
                        for yy in y0..=y1 {
                            acc += tmp[(yy * w + x) * 3 + k];
                        }
                        row[x * 3 + k] = (acc / n).round().clamp(0.0, 255.0) as u8;
                    }
                }
            });
    }

    fn remap(&mut self, lut: &[u8; 256], channels: [bool; 3]) {
        for px in self.data.chunks_exact_mut(3) {
            for k in 0..3 {
                if channels[k] {
                    px[k] = lut[px[k] as usize];
                }
            }
        }
    }

    /// Gamma remap via a 256-entry LUT on the selected channels. A negative
    /// exponent inverts first, then applies the gamma of its magnitude; an
    /// exponent of zero is the identity.
    pub fn apply_gamma(&mut self, exponent: f32, r: bool, g: bool, b: bool) {
        if exponent.abs() < 1e-6 {
            return;
        }
        let e = exponent.abs();
        let mut lut = [0u8; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            let v = 255.0 * (i as f32 / 255.0).powf(1.0 / e);
            let v = v.clamp(0.0, 255.0);
            *slot = if exponent > 0.0 {
                v as u8
            } else {
                (255.0 - v) as u8
            };
        }
        self.remap(&lut, [r, g, b]);
    }

    /// Linear brightness remap on the selected channels.
    pub fn apply_brightness(&mut self, factor: f32, r: bool, g: bool, b: bool) {
        let mut lut = [0u8; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = (i as f32 * factor).clamp(0.0, 255.0) as u8;
        }
        self.remap(&lut, [r, g, b]);
    }

    /// 255 - v on every channel.
    pub fn invert(&mut self) {
        for b in &mut self.data {
            *b = 255 - *b;
        }
    }
}
