//! Phase A: canvas background construction

use crate::config::{BackgroundKind, PaintConfig};
use crate::raster::Raster;

/// Scale the paper texture by `paper_scale` percent of its own size and
/// apply the invert flag. Done once per invocation.
pub fn prepare_paper(paper: &Raster, cfg: &PaintConfig) -> Raster {
    let mut p = paper.clone();
    let scale = (cfg.paper_scale / 100.0).max(0.01);
    let w = (p.width() as f32 * scale).round().max(1.0) as usize;
    let h = (p.height() as f32 * scale).round().max(1.0) as usize;
    p.resize(w, h);
    if cfg.paper_invert {
        p.invert();
    }
    p
}

/// Build the canvas the strokes land on. `source` is already edge-padded by
/// `(pad_x, pad_y)`; paper tiling is offset by the pad so the tiling lines up
/// identically whether or not edge painting is active.
pub fn build_background(
    source: &Raster,
    paper: Option<&Raster>,
    cfg: &PaintConfig,
    pad_x: usize,
    pad_y: usize,
) -> Raster {
    match cfg.background {
        BackgroundKind::KeepOriginal => source.clone(),
        BackgroundKind::Solid => {
            let mut c = Raster::new(source.width(), source.height());
            c.fill(cfg.bg_color);
            c
        }
        BackgroundKind::FromPaper => {
            let mut c = Raster::new(source.width(), source.height());
            if let Some(paper) = paper {
                let (pw, ph) = (paper.width() as i64, paper.height() as i64);
                for y in 0..c.height() {
                    let py = (y as i64 - pad_y as i64).rem_euclid(ph) as usize;
                    for x in 0..c.width() {
                        let px = (x as i64 - pad_x as i64).rem_euclid(pw) as usize;
                        c.set_pixel(x, y, paper.pixel(px, py));
                    }
                }
            } else {
                tracing::warn!("paper background requested without a paper texture");
                c.fill(cfg.bg_color);
            }
            c
        }
        // Alpha is initialized fully transparent by the caller; the color
        // content underneath does not matter.
        BackgroundKind::Transparent => Raster::new(source.width(), source.height()),
    }
}
