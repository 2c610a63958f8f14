//! Stamp compositing: shadow, edge-darkened deposit, relief highlight

use crate::brush_family::BrushFamily;
use crate::config::PaintConfig;
use crate::raster::Raster;

/// Composite one brush variant onto `canvas` with its top-left at (x0, y0).
/// `alpha` (inverted coverage) is darkened toward opaque alongside the color.
pub fn apply_stamp(
    canvas: &mut Raster,
    mut alpha: Option<&mut Raster>,
    family: &BrushFamily,
    flat: usize,
    x0: i64,
    y0: i64,
    color: [u8; 3],
    cfg: &PaintConfig,
) {
    if let Some(shadow) = family.shadow(flat) {
        let off = cfg.shadow_depth as i64 - family.shadow_pad() as i64;
        apply_shadow(
            canvas,
            alpha.as_deref_mut(),
            shadow,
            x0 + off,
            y0 + off,
            cfg.shadow_darkness / 100.0,
        );
    }

    let stamp = &family.stamp(flat).raster;
    let dark_edge = cfg.dark_edge.clamp(0.0, 1.0);
    for sy in 0..stamp.height() {
        let cy = y0 + sy as i64;
        if cy < 0 || cy >= canvas.height() as i64 {
            continue;
        }
        for sx in 0..stamp.width() {
            let cx = x0 + sx as i64;
            if cx < 0 || cx >= canvas.width() as i64 {
                continue;
            }
            let spx = stamp.pixel(sx, sy);
            let h = spx[0];
            if h == 0 {
                continue;
            }
            let (ux, uy) = (cx as usize, cy as usize);
            let mut px = canvas.pixel(ux, uy);

            // Color brushes pre-multiply the canvas by their own texture.
            if !family.monochrome() {
                let t = spx[2] as f32 / 255.0;
                for c in &mut px {
                    *c = (*c as f32 * t) as u8;
                }
            }

            let cover = h as f32 / 255.0;
            let v = (1.0 - cover) * (1.0 - dark_edge);
            for (k, c) in px.iter_mut().enumerate() {
                *c = (*c as f32 * v + color[k] as f32 * cover).clamp(0.0, 255.0) as u8;
            }
            canvas.set_pixel(ux, uy, px);

            if let Some(a) = alpha.as_deref_mut() {
                let av = (a.pixel(ux, uy)[0] as f32 * v) as u8;
                a.set_pixel(ux, uy, [av, av, av]);
            }
        }
    }

    if cfg.brush_relief > 0.001 {
        apply_relief(canvas, stamp, x0, y0, cfg.brush_relief / 100.0);
    }
}

/// Darken canvas and alpha under the blurred shadow mask.
fn apply_shadow(
    canvas: &mut Raster,
    mut alpha: Option<&mut Raster>,
    shadow: &Raster,
    x0: i64,
    y0: i64,
    darkness: f32,
) {
    for sy in 0..shadow.height() {
        let cy = y0 + sy as i64;
        if cy < 0 || cy >= canvas.height() as i64 {
            continue;
        }
        for sx in 0..shadow.width() {
            let cx = x0 + sx as i64;
            if cx < 0 || cx >= canvas.width() as i64 {
                continue;
            }
            let mask = shadow.pixel(sx, sy)[2];
            if mask == 0 {
                continue;
            }
            let v = 1.0 - (mask as f32 / 255.0) * darkness;
            let (ux, uy) = (cx as usize, cy as usize);
            let mut px = canvas.pixel(ux, uy);
            for c in &mut px {
                *c = (*c as f32 * v) as u8;
            }
            canvas.set_pixel(ux, uy, px);
            if let Some(a) = alpha.as_deref_mut() {
                let av = (a.pixel(ux, uy)[0] as f32 * v) as u8;
                a.set_pixel(ux, uy, [av, av, av]);
            }
        }
    }
}

/// Second pass over the relief channel: blend toward white in proportion to
/// the embossed edge value.
fn apply_relief(canvas: &mut Raster, stamp: &Raster, x0: i64, y0: i64, relief: f32) {
    for sy in 0..stamp.height() {
        let cy = y0 + sy as i64;
        if cy < 0 || cy >= canvas.height() as i64 {
            continue;
        }
        for sx in 0..stamp.width() {
            let cx = x0 + sx as i64;
            if cx < 0 || cx >= canvas.width() as i64 {
                continue;
            }
            let r = stamp.pixel(sx, sy)[1];
            if r == 0 {
                continue;
            }
            let t = r as f32 / 255.0 * relief;
            let (ux, uy) = (cx as usize, cy as usize);
            let mut px = canvas.pixel(ux, uy);
            for c in &mut px {
                *c = (*c as f32 + (255.0 - *c as f32) * t).clamp(0.0, 255.0) as u8;
            }
            canvas.set_pixel(ux, uy, px);
        }
    }
}
