//! Legacy preset text format: newline-delimited `key=value` lines
//!
//! The first line is the literal magic `Preset`. Keys map 1:1 onto
//! `PaintConfig` fields; unknown keys are ignored and missing keys keep the
//! factory defaults, so presets written by older builds still load.

use thiserror::Error;

use crate::config::{BackgroundKind, ColorKind, FieldKind, PaintConfig, PlacementKind};
use crate::field::{ControlVector, SizeVector, VectorKind, MAX_VECTORS};

const MAGIC: &str = "Preset";

/// Errors from preset parsing.
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("missing preset magic line")]
    MissingMagic,

    #[error("malformed line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

fn fmt_bool(b: bool) -> u32 {
    u32::from(b)
}

/// Serialize a config as preset text. `parse` round-trips the result.
pub fn serialize(cfg: &PaintConfig) -> String {
    let mut out = String::new();
    out.push_str(MAGIC);
    out.push('\n');

    let mut line = |k: &str, v: String| {
        out.push_str(k);
        out.push('=');
        out.push_str(&v);
        out.push('\n');
    };

    line("orientnum", cfg.orient_num.to_string());
    line("orientfirst", cfg.orient_first.to_string());
    line("orientlast", cfg.orient_last.to_string());
    line("orienttype", cfg.orient_kind.to_index().to_string());
    line("orientangoff", cfg.orient_field.angle_offset.to_string());
    line("orientstrexp", cfg.orient_field.strength_exponent.to_string());
    line("orientvoronoi", fmt_bool(cfg.orient_field.voronoi).to_string());
    line("numorientvector", cfg.orient_field.vectors.len().to_string());
    for (i, v) in cfg.orient_field.vectors.iter().enumerate() {
        line(
            "orientvector",
            format!(
                "{i},{},{},{},{},{},{},{}",
                v.x,
                v.y,
                v.dir,
                v.dx,
                v.dy,
                v.strength,
                v.kind.to_index()
            ),
        );
    }

    line("sizenum", cfg.size_num.to_string());
    line("sizefirst", cfg.size_first.to_string());
    line("sizelast", cfg.size_last.to_string());
    line("sizetype", cfg.size_kind.to_index().to_string());
    line("sizestrexp", cfg.size_field.strength_exponent.to_string());
    line("sizevoronoi", fmt_bool(cfg.size_field.voronoi).to_string());
    line("numsizevector", cfg.size_field.vectors.len().to_string());
    for (i, v) in cfg.size_field.vectors.iter().enumerate() {
        line(
            "sizevector",
            format!("{i},{},{},{},{}", v.x, v.y, v.size, v.strength),
        );
    }

    line("brushrelief", cfg.brush_relief.to_string());
    line("brushaspect", cfg.brush_aspect.to_string());
    line("brushdensity", cfg.brush_density.to_string());
    line("brushgamma", cfg.brush_gamma.to_string());

    line("generalbgtype", cfg.background.to_index().to_string());
    line(
        "color",
        format!(
            "{:02x}{:02x}{:02x}",
            cfg.bg_color[0], cfg.bg_color[1], cfg.bg_color[2]
        ),
    );
    line("generaldarkedge", cfg.dark_edge.to_string());
    line("generalpaintedges", fmt_bool(cfg.paint_edges).to_string());
    line("generaltileable", fmt_bool(cfg.tileable).to_string());
    line("generaldropshadow", fmt_bool(cfg.drop_shadow).to_string());
    line("generalshadowdarkness", cfg.shadow_darkness.to_string());
    line("generalshadowdepth", cfg.shadow_depth.to_string());
    line("generalshadowblur", cfg.shadow_blur.to_string());

    line(
        "placetype",
        match cfg.placement {
            PlacementKind::Random => "0",
            PlacementKind::Even => "1",
        }
        .to_string(),
    );
    line("placecenter", fmt_bool(cfg.placement_center).to_string());

    line(
        "colortype",
        match cfg.color_kind {
            ColorKind::Average => "0",
            ColorKind::Center => "1",
        }
        .to_string(),
    );
    line("colornoise", cfg.color_noise.to_string());

    line("paperrelief", cfg.paper_relief.to_string());
    line("paperscale", cfg.paper_scale.to_string());
    line("paperinvert", fmt_bool(cfg.paper_invert).to_string());
    line("paperoverlay", fmt_bool(cfg.paper_overlay).to_string());

    line("devthresh", cfg.deviation_threshold.to_string());

    out
}

fn malformed(line: usize, reason: impl Into<String>) -> PresetError {
    PresetError::Malformed {
        line,
        reason: reason.into(),
    }
}

fn parse_num<T: std::str::FromStr>(s: &str, line: usize) -> Result<T, PresetError> {
    s.trim()
        .parse::<T>()
        .map_err(|_| malformed(line, format!("bad number {s:?}")))
}

fn parse_fields(s: &str, n: usize, line: usize) -> Result<Vec<f32>, PresetError> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != n {
        return Err(malformed(line, format!("expected {n} fields")));
    }
    parts.iter().map(|p| parse_num::<f32>(p, line)).collect()
}

/// Parse preset text into a config, starting from factory defaults.
pub fn parse(text: &str) -> Result<PaintConfig, PresetError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, first)) if first.trim() == MAGIC => {}
        _ => return Err(PresetError::MissingMagic),
    }

    let mut cfg = PaintConfig::default();
    let mut orient_vectors: Vec<(usize, ControlVector)> = Vec::new();
    let mut size_vectors: Vec<(usize, SizeVector)> = Vec::new();

    for (lineno, raw) in lines {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let Some((key, value)) = raw.split_once('=') else {
            return Err(malformed(lineno + 1, "missing '='"));
        };
        match key {
            "orientnum" => cfg.orient_num = parse_num(value, lineno + 1)?,
            "orientfirst" => cfg.orient_first = parse_num(value, lineno + 1)?,
            "orientlast" => cfg.orient_last = parse_num(value, lineno + 1)?,
            "orienttype" => cfg.orient_kind = FieldKind::from_index(parse_num(value, lineno + 1)?),
            "orientangoff" => cfg.orient_field.angle_offset = parse_num(value, lineno + 1)?,
            "orientstrexp" => cfg.orient_field.strength_exponent = parse_num(value, lineno + 1)?,
            "orientvoronoi" => cfg.orient_field.voronoi = parse_num::<u32>(value, lineno + 1)? != 0,
            "numorientvector" => {}
            "orientvector" => {
                let f = parse_fields(value, 8, lineno + 1)?;
                let idx = f[0] as usize;
                orient_vectors.push((
                    idx,
                    ControlVector {
                        x: f[1],
                        y: f[2],
                        dir: f[3],
                        dx: f[4],
                        dy: f[5],
                        strength: f[6],
                        kind: VectorKind::from_index(f[7] as u32),
                    },
                ));
            }
            "sizenum" => cfg.size_num = parse_num(value, lineno + 1)?,
            "sizefirst" => cfg.size_first = parse_num(value, lineno + 1)?,
            "sizelast" => cfg.size_last = parse_num(value, lineno + 1)?,
            "sizetype" => cfg.size_kind = FieldKind::from_index(parse_num(value, lineno + 1)?),
            "sizestrexp" => cfg.size_field.strength_exponent = parse_num(value, lineno + 1)?,
            "sizevoronoi" => cfg.size_field.voronoi = parse_num::<u32>(value, lineno + 1)? != 0,
            "numsizevector" => {}
            "sizevector" => {
                let f = parse_fields(value, 5, lineno + 1)?;
                let idx = f[0] as usize;
                size_vectors.push((
                    idx,
                    SizeVector {
                        x: f[1],
                        y: f[2],
                        size: f[3],
                        strength: f[4],
                    },
                ));
            }
            "brushrelief" => cfg.brush_relief = parse_num(value, lineno + 1)?,
            "brushaspect" => cfg.brush_aspect = parse_num(value, lineno + 1)?,
            "brushdensity" => cfg.brush_density = parse_num(value, lineno + 1)?,
            "brushgamma" => cfg.brush_gamma = parse_num(value, lineno + 1)?,
            "generalbgtype" => {
                cfg.background = BackgroundKind::from_index(parse_num(value, lineno + 1)?)
            }
            "color" => {
                let v = value.trim();
                if v.len() != 6 {
                    return Err(malformed(lineno + 1, "expected 6 hex digits"));
                }
                for k in 0..3 {
                    cfg.bg_color[k] = u8::from_str_radix(&v[k * 2..k * 2 + 2], 16)
                        .map_err(|_| malformed(lineno + 1, "bad hex color"))?;
                }
            }
            "generaldarkedge" => cfg.dark_edge = parse_num(value, lineno + 1)?,
            "generalpaintedges" => cfg.paint_edges = parse_num::<u32>(value, lineno + 1)? != 0,
            "generaltileable" => cfg.tileable = parse_num::<u32>(value, lineno + 1)? != 0,
            "generaldropshadow" => cfg.drop_shadow = parse_num::<u32>(value, lineno + 1)? != 0,
            "generalshadowdarkness" => cfg.shadow_darkness = parse_num(value, lineno + 1)?,
            "generalshadowdepth" => cfg.shadow_depth = parse_num(value, lineno + 1)?,
            "generalshadowblur" => cfg.shadow_blur = parse_num(value, lineno + 1)?,
            "placetype" => {
                cfg.placement = if parse_num::<u32>(value, lineno + 1)? == 1 {
                    PlacementKind::Even
                } else {
                    PlacementKind::Random
                }
            }
            "placecenter" => cfg.placement_center = parse_num::<u32>(value, lineno + 1)? != 0,
            "colortype" => {
                cfg.color_kind = if parse_num::<u32>(value, lineno + 1)? == 1 {
                    ColorKind::Center
                } else {
                    ColorKind::Average
                }
            }
            "colornoise" => cfg.color_noise = parse_num(value, lineno + 1)?,
            "paperrelief" => cfg.paper_relief = parse_num(value, lineno + 1)?,
            "paperscale" => cfg.paper_scale = parse_num(value, lineno + 1)?,
            "paperinvert" => cfg.paper_invert = parse_num::<u32>(value, lineno + 1)? != 0,
            "paperoverlay" => cfg.paper_overlay = parse_num::<u32>(value, lineno + 1)? != 0,
            "devthresh" => cfg.deviation_threshold = parse_num(value, lineno + 1)?,
            _ => {
                // Forward compatibility: unknown keys keep their defaults.
                tracing::debug!("ignoring unknown preset key {key:?}");
            }
        }
    }

    orient_vectors.sort_by_key(|(i, _)| *i);
    cfg.orient_field.vectors = orient_vectors
        .into_iter()
        .map(|(_, v)| v)
        .take(MAX_VECTORS)
        .collect();
    size_vectors.sort_by_key(|(i, _)| *i);
    cfg.size_field.vectors = size_vectors
        .into_iter()
        .map(|(_, v)| v)
        .take(MAX_VECTORS)
        .collect();

    Ok(cfg)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_default() {
        let cfg = PaintConfig::default();
        let text = serialize(&cfg);
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_roundtrip_full() {
        let mut cfg = PaintConfig {
            orient_num: 7,
            orient_first: 12.5,
            orient_last: 270.0,
            orient_kind: FieldKind::Manual,
            size_kind: FieldKind::Adaptive,
            background: BackgroundKind::FromPaper,
            bg_color: [10, 200, 3],
            dark_edge: 0.3,
            tileable: true,
            drop_shadow: true,
            placement: PlacementKind::Even,
            placement_center: true,
            color_kind: ColorKind::Center,
            color_noise: 12.0,
            ..PaintConfig::default()
        };
        cfg.orient_field.vectors = vec![
            ControlVector::new(0.1, 0.2, 45.0, 2.0, VectorKind::VortexCcw),
            ControlVector::new(0.9, 0.8, 180.0, 0.5, VectorKind::Plain),
        ];
        cfg.orient_field.voronoi = true;
        cfg.size_field.vectors = vec![SizeVector {
            x: 0.4,
            y: 0.6,
            size: 77.0,
            strength: 1.5,
        }];

        let text = serialize(&cfg);
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_missing_magic_rejected() {
        assert!(matches!(
            parse("orientnum=3\n"),
            Err(PresetError::MissingMagic)
        ));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let cfg = parse("Preset\nfrobnicate=9\norientnum=5\n").unwrap();
        assert_eq!(cfg.orient_num, 5);
        assert_eq!(cfg.size_num, PaintConfig::default().size_num);
    }

    #[test]
    fn test_color_hex() {
        let cfg = parse("Preset\ncolor=0a14ff\n").unwrap();
        assert_eq!(cfg.bg_color, [10, 20, 255]);
    }
}
