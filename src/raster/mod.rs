//! Raster buffer - RGB8 pixel storage and geometry primitives
//!
//! Every other part of the engine works on `Raster`: interleaved RGB, 8 bits
//! per channel, row-major, no padding. An alpha companion uses the same layout
//! with inverted coverage in channel 0 (0 = opaque, 255 = fully transparent).

mod codec;
mod filters;
mod resample;

pub use codec::{decode, decode_lenient, LoadOutcome};

/// Dimensions of the black placeholder substituted for undecodable assets.
pub const PLACEHOLDER_SIZE: usize = 10;

/// An owned RGB8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Create a black raster. Dimensions are clamped to at least 1x1.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    /// The 10x10 black placeholder used when an asset fails to decode.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)
    }

    /// Build from an existing RGB byte buffer. `data` must be exactly
    /// `width * height * 3` bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width * height * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 3
    }

    /// Read one pixel. `x`/`y` must be in bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = self.idx(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = self.idx(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Fill with a solid color. Uniform gray hits the memset fast path.
    pub fn fill(&mut self, rgb: [u8; 3]) {
        if rgb[0] == rgb[1] && rgb[1] == rgb[2] {
            self.data.fill(rgb[0]);
            return;
        }
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
    }

    /// True when every pixel has r == g == b.
    pub fn is_grayscale(&self) -> bool {
        self.data
            .chunks_exact(3)
            .all(|px| px[0] == px[1] && px[1] == px[2])
    }

    /// Soft single-point plot: distributes `rgb` over the four neighboring
    /// integer pixels by fractional position, lerping with the existing color.
    /// Out of bounds is a silent no-op.
    pub fn splat(&mut self, x: f32, y: f32, rgb: [u8; 3]) {
        if x < 0.0 || y < 0.0 || x >= (self.width - 1) as f32 || y >= (self.height - 1) as f32 {
            return;
        }
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;
        let weights = [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x0 + 1, y0, fx * (1.0 - fy)),
            (x0, y0 + 1, (1.0 - fx) * fy),
            (x0 + 1, y0 + 1, fx * fy),
        ];
        for (px, py, w) in weights {
            let i = self.idx(px, py);
            for k in 0..3 {
                let old = self.data[i + k] as f32;
                self.data[i + k] = (old * (1.0 - w) + rgb[k] as f32 * w) as u8;
            }
        }
    }

    /// Antialiased line from (x0, y0) to (x1, y1): unit steps along the
    /// dominant axis, fractional steps on the minor axis, plotted via `splat`.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, rgb: [u8; 3]) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        let n = steps as usize;
        for i in 0..=n {
            let t = i as f32 / steps;
            self.splat(x0 + dx * t, y0 + dy * t, rgb);
        }
    }

    /// Crop to the half-open region [x0, x1) x [y0, y1), clamped to bounds.
    pub fn crop(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        let x0 = x0.min(self.width.saturating_sub(1));
        let y0 = y0.min(self.height.saturating_sub(1));
        let x1 = x1.clamp(x0 + 1, self.width);
        let y1 = y1.clamp(y0 + 1, self.height);
        let (nw, nh) = (x1 - x0, y1 - y0);
        let mut out = Vec::with_capacity(nw * nh * 3);
        for y in y0..y1 {
            let start = self.idx(x0, y);
            out.extend_from_slice(&self.data[start..start + nw * 3]);
        }
        self.width = nw;
        self.height = nh;
        self.data = out;
    }

    /// Pad with a solid fill color on each side.
    pub fn pad(&mut self, left: usize, right: usize, top: usize, bottom: usize, fill: [u8; 3]) {
        let nw = self.width + left + right;
        let nh = self.height + top + bottom;
        let mut out = Raster::new(nw, nh);
        out.fill(fill);
        for y in 0..self.height {
            let src = self.idx(0, y);
            let dst = out.idx(left, y + top);
            out.data[dst..dst + self.width * 3]
                .copy_from_slice(&self.data[src..src + self.width * 3]);
        }
        *self = out;
    }

    /// Pad by replicating the nearest edge pixel instead of a solid fill.
    pub fn edge_pad(&mut self, left: usize, right: usize, top: usize, bottom: usize) {
        let nw = self.width + left + right;
        let nh = self.height + top + bottom;
        let mut out = Raster::new(nw, nh);
        for y in 0..nh {
            let sy = y.saturating_sub(top).min(self.height - 1);
            for x in 0..nw {
                let sx = x.saturating_sub(left).min(self.width - 1);
                let px = self.pixel(sx, sy);
                out.set_pixel(x, y, px);
            }
        }
        *self = out;
    }

    /// Trim borders matching the top-left corner color, then re-add `margin`
    /// pixels on each side. A fully uniform raster is left untouched.
    pub fn autocrop(&mut self, margin: usize) {
        let bg = self.pixel(0, 0);
        let mut min_x = self.width;
        let mut min_y = self.height;
        let mut max_x = 0usize;
        let mut max_y = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) != bg {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        if min_x > max_x {
            return;
        }
        let x0 = min_x.saturating_sub(margin);
        let y0 = min_y.saturating_sub(margin);
        let x1 = (max_x + 1 + margin).min(self.width);
        let y1 = (max_y + 1 + margin).min(self.height);
        self.crop(x0, y0, x1, y1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black_and_clamped() {
        let r = Raster::new(0, 0);
        assert_eq!((r.width(), r.height()), (1, 1));
        assert_eq!(r.pixel(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_fill_and_grayscale() {
        let mut r = Raster::new(4, 3);
        r.fill([120, 120, 120]);
        assert!(r.is_grayscale());
        r.set_pixel(2, 1, [10, 20, 30]);
        assert!(!r.is_grayscale());
        assert_eq!(r.pixel(2, 1), [10, 20, 30]);
    }

    #[test]
    fn test_splat_out_of_bounds_is_noop() {
        let mut r = Raster::new(4, 4);
        let before = r.clone();
        r.splat(-1.0, 2.0, [255, 255, 255]);
        r.splat(3.5, 2.0, [255, 255, 255]);
        assert_eq!(r, before);
    }

    #[test]
    fn test_splat_integer_position_hits_one_pixel() {
        let mut r = Raster::new(4, 4);
        r.splat(1.0, 2.0, [200, 100, 50]);
        assert_eq!(r.pixel(1, 2), [200, 100, 50]);
        assert_eq!(r.pixel(2, 2), [0, 0, 0]);
    }

    #[test]
    fn test_crop() {
        let mut r = Raster::new(5, 5);
        r.set_pixel(2, 2, [9, 9, 9]);
        r.crop(1, 1, 4, 4);
        assert_eq!((r.width(), r.height()), (3, 3));
        assert_eq!(r.pixel(1, 1), [9, 9, 9]);
    }

    #[test]
    fn test_edge_pad_replicates() {
        let mut r = Raster::new(2, 1);
        r.set_pixel(0, 0, [10, 10, 10]);
        r.set_pixel(1, 0, [99, 99, 99]);
        r.edge_pad(2, 2, 1, 1);
        assert_eq!((r.width(), r.height()), (6, 3));
        assert_eq!(r.pixel(0, 0), [10, 10, 10]);
        assert_eq!(r.pixel(5, 2), [99, 99, 99]);
    }

    #[test]
    fn test_autocrop_undoes_uniform_pad() {
        let mut r = Raster::new(3, 4);
        r.fill([50, 60, 70]);
        let orig = r.clone();
        r.pad(2, 2, 2, 2, [0, 0, 0]);
        r.autocrop(0);
        assert_eq!((r.width(), r.height()), (orig.width(), orig.height()));
        assert_eq!(r, orig);
    }

    #[test]
    fn test_autocrop_uniform_is_noop() {
        let mut r = Raster::new(4, 4);
        r.fill([7, 7, 7]);
        let before = r.clone();
        r.autocrop(1);
        assert_eq!(r, before);
    }

    #[test]
    fn test_draw_line_touches_endpoints() {
        let mut r = Raster::new(10, 10);
        r.draw_line(1.0, 1.0, 8.0, 1.0, [255, 255, 255]);
        assert_ne!(r.pixel(1, 1), [0, 0, 0]);
        assert_ne!(r.pixel(8, 1), [0, 0, 0]);
        assert_eq!(r.pixel(5, 5), [0, 0, 0]);
    }
}
