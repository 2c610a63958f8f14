//! Paper relief post-filter
//!
//! Runs after the final crop: the scaled paper texture is tiled over the
//! result and either embossed (diagonal first difference of the texel) or
//! overlaid (texel offset from mid-gray), scaled by the relief percentage and
//! added to every channel.

use rayon::prelude::*;

use crate::config::PaintConfig;
use crate::raster::Raster;

/// Add the tiled paper relief to `canvas` in place. `paper` is already
/// scaled and inverted per the config.
pub fn apply_paper_relief(canvas: &mut Raster, paper: &Raster, cfg: &PaintConfig) {
    let relief = cfg.paper_relief / 100.0;
    if relief <= 0.0 {
        return;
    }
    let (w, pw, ph) = (canvas.width(), paper.width(), paper.height());
    let overlay = cfg.paper_overlay;

    canvas
        .data_mut()
        .par_chunks_mut(w * 3)
        .enumerate()
        .for_each(|(y, row)| {
            let py = y % ph;
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let tx = x % pw;
                let texel = paper.pixel(tx, py)[0] as f32;
                let h = if overlay {
                    texel - 128.0
                } else {
                    // Emboss against the diagonal neighbor, wrapping inside
                    // the tile so the relief itself stays seamless.
                    let diag = paper.pixel((tx + 1) % pw, (py + 1) % ph)[0] as f32;
                    texel - diag
                } * relief;
                for c in px.iter_mut() {
                    *c = (*c as f32 + h).clamp(0.0, 255.0) as u8;
                }
            }
        });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gradient_paper() -> Raster {
        let mut p = Raster::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let v = (x * 60 + y * 4) as u8;
                p.set_pixel(x, y, [v, v, v]);
            }
        }
        p
    }

    #[test]
    fn test_zero_relief_is_identity() {
        let mut canvas = Raster::new(8, 8);
        canvas.fill([100, 100, 100]);
        let before = canvas.clone();
        let cfg = PaintConfig {
            paper_relief: 0.0,
            ..PaintConfig::default()
        };
        apply_paper_relief(&mut canvas, &gradient_paper(), &cfg);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_overlay_pushes_away_from_midgray() {
        let mut canvas = Raster::new(4, 4);
        canvas.fill([100, 100, 100]);
        let mut paper = Raster::new(4, 4);
        paper.fill([228, 228, 228]);
        let cfg = PaintConfig {
            paper_relief: 100.0,
            paper_overlay: true,
            ..PaintConfig::default()
        };
        apply_paper_relief(&mut canvas, &paper, &cfg);
        // 100 + (228 - 128) = 200 on every channel.
        assert_eq!(canvas.pixel(2, 2), [200, 200, 200]);
    }

    #[test]
    fn test_emboss_flat_paper_is_identity() {
        let mut canvas = Raster::new(8, 8);
        canvas.fill([50, 60, 70]);
        let before = canvas.clone();
        let mut paper = Raster::new(4, 4);
        paper.fill([137, 137, 137]);
        let cfg = PaintConfig {
            paper_relief: 100.0,
            ..PaintConfig::default()
        };
        apply_paper_relief(&mut canvas, &paper, &cfg);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_result_is_clamped() {
        let mut canvas = Raster::new(4, 4);
        canvas.fill([250, 250, 250]);
        let mut paper = Raster::new(2, 2);
        paper.fill([255, 255, 255]);
        let cfg = PaintConfig {
            paper_relief: 100.0,
            paper_overlay: true,
            ..PaintConfig::default()
        };
        apply_paper_relief(&mut canvas, &paper, &cfg);
        assert_eq!(canvas.pixel(0, 0), [255, 255, 255]);
    }
}
