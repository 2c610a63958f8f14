//! Paint configuration: every knob the engine consumes, with factory defaults
//!
//! The engine never reaches into ambient state; callers hand it one immutable
//! `PaintConfig` per invocation. The same record round-trips the legacy
//! `key=value` preset format (see `preset`).

use serde::{Deserialize, Serialize};

use crate::field::{OrientField, SizeField};

/// How per-stroke orientation or size buckets are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Source luminance drives the bucket.
    #[default]
    Value,
    /// Distance from the canvas center.
    Radius,
    /// Uniform random bucket per stroke.
    Random,
    /// Angle from the canvas center.
    Radial,
    /// Smoothed plasma-noise pattern.
    Flowing,
    /// Source hue.
    Hue,
    /// Minimum-deviation search over the brush family.
    Adaptive,
    /// User-authored control-vector field.
    Manual,
}

impl FieldKind {
    pub fn to_index(self) -> u32 {
        match self {
            Self::Value => 0,
            Self::Radius => 1,
            Self::Random => 2,
            Self::Radial => 3,
            Self::Flowing => 4,
            Self::Hue => 5,
            Self::Adaptive => 6,
            Self::Manual => 7,
        }
    }

    pub fn from_index(i: u32) -> Self {
        match i {
            1 => Self::Radius,
            2 => Self::Random,
            3 => Self::Radial,
            4 => Self::Flowing,
            5 => Self::Hue,
            6 => Self::Adaptive,
            7 => Self::Manual,
            _ => Self::Value,
        }
    }
}

/// Canvas background before any strokes land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundKind {
    #[default]
    Solid,
    KeepOriginal,
    FromPaper,
    Transparent,
}

impl BackgroundKind {
    pub fn to_index(self) -> u32 {
        match self {
            Self::Solid => 0,
            Self::KeepOriginal => 1,
            Self::FromPaper => 2,
            Self::Transparent => 3,
        }
    }

    pub fn from_index(i: u32) -> Self {
        match i {
            1 => Self::KeepOriginal,
            2 => Self::FromPaper,
            3 => Self::Transparent,
            _ => Self::Solid,
        }
    }
}

/// Stroke placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementKind {
    #[default]
    Random,
    /// Shuffled even grid.
    Even,
}

/// Stroke color sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorKind {
    /// Intensity-weighted average under the stamp footprint.
    #[default]
    Average,
    /// The single pixel at the stamp centroid.
    Center,
}

/// Full configuration record for one paint invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintConfig {
    // Orientation family
    pub orient_num: usize,
    pub orient_first: f32,
    pub orient_last: f32,
    pub orient_kind: FieldKind,
    pub orient_field: OrientField,

    // Size family
    pub size_num: usize,
    pub size_first: f32,
    pub size_last: f32,
    pub size_kind: FieldKind,
    pub size_field: SizeField,

    // Brush
    pub brush_relief: f32,
    pub brush_aspect: f32,
    pub brush_density: f32,
    pub brush_gamma: f32,

    // General
    pub background: BackgroundKind,
    pub bg_color: [u8; 3],
    /// Edge darkening fraction in [0, 1].
    pub dark_edge: f32,
    pub paint_edges: bool,
    pub tileable: bool,
    pub drop_shadow: bool,
    /// Percent.
    pub shadow_darkness: f32,
    pub shadow_depth: usize,
    pub shadow_blur: usize,

    // Placement
    pub placement: PlacementKind,
    pub placement_center: bool,

    // Color
    pub color_kind: ColorKind,
    /// Per-channel uniform noise amplitude in byte units.
    pub color_noise: f32,

    // Paper
    pub paper_relief: f32,
    pub paper_scale: f32,
    pub paper_invert: bool,
    pub paper_overlay: bool,

    // Adaptive selection
    pub deviation_threshold: f32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            orient_num: 2,
            orient_first: 0.0,
            orient_last: 60.0,
            orient_kind: FieldKind::Value,
            orient_field: OrientField::default(),

            size_num: 4,
            size_first: 8.0,
            size_last: 30.0,
            size_kind: FieldKind::Value,
            size_field: SizeField::default(),

            brush_relief: 0.0,
            brush_aspect: 0.0,
            brush_density: 20.0,
            brush_gamma: 1.0,

            background: BackgroundKind::Solid,
            bg_color: [255, 255, 255],
            dark_edge: 0.0,
            paint_edges: true,
            tileable: false,
            drop_shadow: false,
            shadow_darkness: 20.0,
            shadow_depth: 5,
            shadow_blur: 10,

            placement: PlacementKind::Random,
            placement_center: false,

            color_kind: ColorKind::Average,
            color_noise: 0.0,

            paper_relief: 0.0,
            paper_scale: 30.0,
            paper_invert: false,
            paper_overlay: false,

            deviation_threshold: 0.5,
        }
    }
}

impl PaintConfig {
    /// Counts clamped to usable minimums; the engine calls this once on entry.
    pub(crate) fn sanitized(&self) -> Self {
        let mut cfg = self.clone();
        cfg.orient_num = cfg.orient_num.max(1);
        cfg.size_num = cfg.size_num.max(1);
        if cfg.size_last < cfg.size_first {
            std::mem::swap(&mut cfg.size_first, &mut cfg.size_last);
        }
        cfg.size_first = cfg.size_first.max(1.0);
        cfg.size_last = cfg.size_last.max(1.0);
        cfg.brush_density = cfg.brush_density.max(0.0);
        cfg.dark_edge = cfg.dark_edge.clamp(0.0, 1.0);
        cfg
    }
}
