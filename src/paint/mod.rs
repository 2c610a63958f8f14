//! The painting engine: background, bucket maps, stroke loop, final crop
//!
//! One `paint` invocation runs four phases over a working canvas that may be
//! edge-padded by one stamp dimension on each side. Phase A builds the
//! background and companion alpha, phase B derives per-pixel orientation and
//! size bucket maps, phase C runs the stroke loop (placement, brush variant
//! selection, color sampling, compositing), and phase D crops back to the
//! source window and applies the paper relief post-filter. All randomness
//! flows through one seeded generator so identical inputs repaint
//! identically.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::brush_family::BrushFamily;
use crate::config::{BackgroundKind, ColorKind, FieldKind, PaintConfig};
use crate::error::PaintError;
use crate::paper::apply_paper_relief;
use crate::progress::ProgressSink;
use crate::raster::Raster;

mod background;
mod maps;
mod placement;
mod select;
mod stamp;


use background::{build_background, prepare_paper};
use placement::Placement;
use select::{footprint_average, footprint_deviation, select_best};
use stamp::apply_stamp;

/// Serializes paint invocations; a second concurrent call fails fast with
/// `PaintError::Busy` instead of queueing.
#[derive(Debug, Default)]
pub struct PaintEngine {
    guard: parking_lot::Mutex<()>,
}

impl PaintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repaint `image` in place. `alpha` is the inverted-coverage companion
    /// (0 opaque, 255 transparent, channel 0 meaningful) and is updated in
    /// place when given. `paper` is required for the paper background and the
    /// relief post-filter; without it those features degrade with a warning.
    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &self,
        image: &mut Raster,
        mut alpha: Option<&mut Raster>,
        brush: &Raster,
        paper: Option<&Raster>,
        cfg: &PaintConfig,
        seed: u64,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), PaintError> {
        let _lock = self.guard.try_lock().ok_or(PaintError::Busy)?;
        let cfg = cfg.sanitized();
        let mut rng = StdRng::seed_from_u64(seed);

        let family = BrushFamily::prepare(brush, &cfg);
        let paper = paper.map(|p| prepare_paper(p, &cfg));

        let (src_w, src_h) = (image.width(), image.height());
        let (mx, my) = if cfg.paint_edges {
            (family.width(), family.height())
        } else {
            (0, 0)
        };

        let mut source = image.clone();
        source.edge_pad(mx, mx, my, my);
        let source_alpha = alpha.as_deref().map(|a| {
            let mut a = a.clone();
            a.edge_pad(mx, mx, my, my);
            a
        });

        // Phase B runs over the interior so padding never skews the maps.
        let orient_map = maps::orientation_map(cfg.orient_kind, image, &cfg.orient_field, &mut rng)
            .map(|mut m| {
                m.edge_pad(mx, mx, my, my);
                m
            });
        let size_map = maps::size_map(cfg.size_kind, image, &cfg.size_field, &mut rng).map(
            |mut m| {
                m.edge_pad(mx, mx, my, my);
                m
            },
        );

        // Phase A.
        let mut canvas = build_background(&source, paper.as_ref(), &cfg, mx, my);
        let mut canvas_alpha = match (&source_alpha, cfg.background) {
            (_, BackgroundKind::Transparent) => {
                let mut a = Raster::new(canvas.width(), canvas.height());
                a.fill([255, 255, 255]);
                Some(a)
            }
            (Some(a), _) => Some(a.clone()),
            (None, _) => None,
        };

        // Phase C.
        let plc = Placement::new(
            &cfg,
            canvas.width(),
            canvas.height(),
            family.width(),
            family.height(),
            &mut rng,
        );
        let total = plc.total();
        let step = (total / 30).max(10);
        tracing::debug!(
            "painting {} strokes over {}x{} ({} brush variants)",
            total,
            canvas.width(),
            canvas.height(),
            family.len()
        );

        for i in (1..=total).rev() {
            let Some((tx, ty)) = plc.candidate(i, &mut rng) else {
                break;
            };
            if !plc.in_bounds(tx, ty) {
                continue;
            }
            // Mostly-transparent source pixels never seed a stroke.
            if let Some(a) = &source_alpha {
                if a.pixel(tx as usize, ty as usize)[0] > 128 {
                    continue;
                }
            }

            let x0 = tx - (family.width() / 2) as i64;
            let y0 = ty - (family.height() / 2) as i64;
            let flat = self.pick_variant(
                &cfg,
                &family,
                &source,
                source_alpha.as_ref(),
                orient_map.as_ref(),
                size_map.as_ref(),
                tx,
                ty,
                x0,
                y0,
                &mut rng,
            );

            let mut color = match cfg.color_kind {
                ColorKind::Average => footprint_average(&source, family.stamp(flat), x0, y0),
                ColorKind::Center => source.pixel(tx as usize, ty as usize),
            };
            if cfg.color_noise > 0.0 {
                let half = cfg.color_noise / 2.0;
                for c in &mut color {
                    let n = rng.gen_range(-half..=half);
                    *c = (*c as f32 + n).clamp(0.0, 255.0) as u8;
                }
            }

            apply_stamp(
                &mut canvas,
                canvas_alpha.as_mut(),
                &family,
                flat,
                x0,
                y0,
                color,
                &cfg,
            );
            if cfg.tileable {
                for (dx, dy) in wrap_offsets(x0, y0, &family, mx, my, src_w, src_h) {
                    apply_stamp(
                        &mut canvas,
                        canvas_alpha.as_mut(),
                        &family,
                        flat,
                        x0 + dx,
                        y0 + dy,
                        color,
                        &cfg,
                    );
                }
            }

            if (total - i) % step == 0 {
                progress.report((total - i) as f64 / total as f64);
            }
        }
        progress.report(1.0);

        // Phase D.
        canvas.crop(mx, my, mx + src_w, my + src_h);
        if let Some(a) = &mut canvas_alpha {
            a.crop(mx, my, mx + src_w, my + src_h);
        }
        if cfg.paper_relief > 0.001 {
            match &paper {
                Some(p) => apply_paper_relief(&mut canvas, p, &cfg),
                None => tracing::warn!("paper relief requested without a paper texture"),
            }
        }

        *image = canvas;
        if let (Some(out), Some(dst)) = (canvas_alpha, alpha.as_deref_mut()) {
            *dst = out;
        }
        Ok(())
    }

    /// Pick the flat brush variant index for one stroke.
    #[allow(clippy::too_many_arguments)]
    fn pick_variant(
        &self,
        cfg: &PaintConfig,
        family: &BrushFamily,
        source: &Raster,
        source_alpha: Option<&Raster>,
        orient_map: Option<&Raster>,
        size_map: Option<&Raster>,
        tx: i64,
        ty: i64,
        x0: i64,
        y0: i64,
        rng: &mut StdRng,
    ) -> usize {
        let orient_adaptive = cfg.orient_kind == FieldKind::Adaptive;
        let size_adaptive = cfg.size_kind == FieldKind::Adaptive;

        let orient_bucket = match (orient_adaptive, orient_map) {
            (true, _) => None,
            (false, Some(m)) => Some(bucket(m, tx, ty, family.orient_count())),
            (false, None) => Some(rng.gen_range(0..family.orient_count())),
        };
        let size_bucket = match (size_adaptive, size_map) {
            (true, _) => None,
            (false, Some(m)) => Some(bucket(m, tx, ty, family.size_count())),
            (false, None) => Some(rng.gen_range(0..family.size_count())),
        };

        match (size_bucket, orient_bucket) {
            (Some(sn), Some(on)) => family.index(sn, on),
            _ => {
                let candidates: Vec<usize> = match (size_bucket, orient_bucket) {
                    // Orientation adaptive within a fixed size row.
                    (Some(sn), None) => {
                        let base = sn * family.orient_count();
                        (base..base + family.orient_count()).collect()
                    }
                    // Size adaptive within a fixed orientation column.
                    (None, Some(on)) => (0..family.size_count())
                        .map(|sn| sn * family.orient_count() + on)
                        .collect(),
                    _ => (0..family.len()).collect(),
                };
                select_best(
                    &candidates,
                    cfg.deviation_threshold,
                    |flat| footprint_deviation(source, source_alpha, family.stamp(flat), x0, y0),
                    rng,
                )
            }
        }
    }
}

/// Map a bucket-map byte at (tx, ty) to a bucket in [0, count).
fn bucket(map: &Raster, tx: i64, ty: i64, count: usize) -> usize {
    let v = map.pixel(tx as usize, ty as usize)[0] as usize;
    (count * v / 256).min(count - 1)
}

/// Extra stamp placements that keep a tileable result seamless: whenever the
/// footprint crosses an interior edge, the stroke repeats one period away on
/// the opposite side (and diagonally when it crosses both).
fn wrap_offsets(
    x0: i64,
    y0: i64,
    family: &BrushFamily,
    mx: usize,
    my: usize,
    src_w: usize,
    src_h: usize,
) -> Vec<(i64, i64)> {
    let (fw, fh) = (family.width() as i64, family.height() as i64);
    let (mx, my) = (mx as i64, my as i64);
    let (pw, ph) = (src_w as i64, src_h as i64);

    let mut dxs = vec![0i64];
    if x0 < mx {
        dxs.push(pw);
    } else if x0 + fw > mx + pw {
        dxs.push(-pw);
    }
    let mut dys = vec![0i64];
    if y0 < my {
        dys.push(ph);
    } else if y0 + fh > my + ph {
        dys.push(-ph);
    }

    let mut out = Vec::with_capacity(3);
    for &dx in &dxs {
        for &dy in &dys {
            if dx != 0 || dy != 0 {
                out.push((dx, dy));
            }
        }
    }
    out
}
