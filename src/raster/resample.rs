//! Resampling: bilinear point sampling, resize, and free rotation

use super::Raster;

impl Raster {
    /// Bilinear sample of the 2x2 neighborhood at (x, y). Out-of-bounds
    /// queries return black; there is no wraparound.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> [u8; 3] {
        if x < 0.0 || y < 0.0 || x > (self.width - 1) as f32 || y > (self.height - 1) as f32 {
            return [0, 0, 0];
        }
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x1, y0);
        let p01 = self.pixel(x0, y1);
        let p11 = self.pixel(x1, y1);

        let mut out = [0u8; 3];
        for k in 0..3 {
            let top = p00[k] as f32 * (1.0 - fx) + p10[k] as f32 * fx;
            let bot = p01[k] as f32 * (1.0 - fx) + p11[k] as f32 * fx;
            out[k] = (top * (1.0 - fy) + bot * fy) as u8;
        }
        out
    }

    /// Bilinear resize. Scale factors are old/new; target pixels are iterated
    /// and sampled from the source. Degenerate targets clamp to 1.
    pub fn resize(&mut self, new_w: usize, new_h: usize) {
        self.resize_inner(new_w, new_h, false);
    }

    /// Nearest-neighbor resize, same scale convention as `resize`.
    pub fn resize_fast(&mut self, new_w: usize, new_h: usize) {
        self.resize_inner(new_w, new_h, true);
    }

    fn resize_inner(&mut self, new_w: usize, new_h: usize, fast: bool) {
        let new_w = new_w.max(1);
        let new_h = new_h.max(1);
        if new_w == self.width && new_h == self.height {
            return;
        }
        let sx = self.width as f32 / new_w as f32;
        let sy = self.height as f32 / new_h as f32;
        let mut out = Raster::new(new_w, new_h);
        for y in 0..new_h {
            for x in 0..new_w {
                let px = if fast {
                    let ix = ((x as f32 * sx) as usize).min(self.width - 1);
                    let iy = ((y as f32 * sy) as usize).min(self.height - 1);
                    self.pixel(ix, iy)
                } else {
                    self.sample_bilinear(x as f32 * sx, y as f32 * sy)
                };
                out.set_pixel(x, y, px);
            }
        }
        *self = out;
    }

    /// Free rotation about the center by `degrees`, inverse-mapped with
    /// bilinear sampling. The bounding box is unchanged; content rotated
    /// outside the original footprint is lost and incoming area is black.
    pub fn rotate(&mut self, degrees: f32) {
        let rad = degrees.to_radians();
        let (sin, cos) = rad.sin_cos();
        let cx = (self.width as f32 - 1.0) / 2.0;
        let cy = (self.height as f32 - 1.0) / 2.0;
        let mut out = Raster::new(self.width, self.height);
        for y in 0..self.height {
            let dy = y as f32 - cy;
            for x in 0..self.width {
                let dx = x as f32 - cx;
                let sxf = cx + dx * cos - dy * sin;
                let syf = cy + dx * sin + dy * cos;
                out.set_pixel(x, y, self.sample_bilinear(sxf, syf));
            }
        }
        *self = out;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mean_channel(r: &Raster) -> f32 {
        let sum: u64 = r.data().iter().map(|&b| b as u64).sum();
        sum as f32 / r.data().len() as f32
    }

    #[test]
    fn test_sample_out_of_bounds_is_black() {
        let mut r = Raster::new(4, 4);
        r.fill([200, 200, 200]);
        assert_eq!(r.sample_bilinear(-0.5, 1.0), [0, 0, 0]);
        assert_eq!(r.sample_bilinear(1.0, 4.2), [0, 0, 0]);
        assert_eq!(r.sample_bilinear(1.5, 1.5), [200, 200, 200]);
    }

    #[test]
    fn test_resize_degenerate_clamps() {
        let mut r = Raster::new(8, 8);
        r.resize(0, 0);
        assert_eq!((r.width(), r.height()), (1, 1));
    }

    #[test]
    fn test_resize_roundtrip_preserves_mean() {
        // Smooth gradient: down and back up should keep the mean close.
        let mut r = Raster::new(32, 32);
        for y in 0..32 {
            for x in 0..32 {
                let v = ((x + y) * 4) as u8;
                r.set_pixel(x, y, [v, v, v]);
            }
        }
        let before = mean_channel(&r);
        r.resize(16, 16);
        r.resize(32, 32);
        let after = mean_channel(&r);
        assert!((before - after).abs() < 6.0, "{before} vs {after}");
    }

    #[test]
    fn test_rotate_full_turn_keeps_center() {
        let mut r = Raster::new(15, 15);
        r.set_pixel(7, 7, [250, 250, 250]);
        r.rotate(360.0);
        assert!(r.pixel(7, 7)[0] > 200);
    }

    #[test]
    fn test_rotate_quarter_turn_moves_content() {
        let mut r = Raster::new(21, 21);
        r.set_pixel(18, 10, [255, 255, 255]);
        r.rotate(90.0);
        // Inverse mapping: the bright pixel shows up rotated about the center.
        let mut found = false;
        for y in 0..21 {
            for x in 0..21 {
                if r.pixel(x, y)[0] > 100 {
                    found = true;
                    assert!(
                        y < 6 || y > 14,
                        "content should leave the horizontal axis, got ({x},{y})"
                    );
                }
            }
        }
        assert!(found);
    }
}
