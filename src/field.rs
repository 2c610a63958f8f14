//! Vector field evaluation for manual orientation and size control
//!
//! A field is a sparse set of user-placed control vectors in normalized
//! [0,1] x [0,1] coordinates. Evaluation is inverse-distance weighting across
//! all vectors, or nearest-vector (Voronoi) selection when flagged. Both
//! evaluations are pure functions of the field and the query point.

use serde::{Deserialize, Serialize};

/// Upper bound on control vectors per field.
pub const MAX_VECTORS: usize = 50;

/// Distance floor that keeps the inverse-distance weight finite.
const DIST_FLOOR: f32 = 1e-4;

/// How a control vector contributes direction around itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VectorKind {
    /// The vector's own direction everywhere.
    #[default]
    Plain,
    /// Direction swirls clockwise around the control point.
    VortexCw,
    /// Direction swirls counter-clockwise around the control point.
    VortexCcw,
    /// Counter-clockwise swirl at double the angular rate.
    Vortex2x,
}

impl VectorKind {
    /// Integer encoding used by the preset text format.
    pub fn to_index(self) -> u32 {
        match self {
            Self::Plain => 0,
            Self::VortexCw => 1,
            Self::VortexCcw => 2,
            Self::Vortex2x => 3,
        }
    }

    pub fn from_index(i: u32) -> Self {
        match i {
            1 => Self::VortexCw,
            2 => Self::VortexCcw,
            3 => Self::Vortex2x,
            _ => Self::Plain,
        }
    }
}

/// One orientation control vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlVector {
    /// Position in image-fraction coordinates.
    pub x: f32,
    pub y: f32,
    /// Direction in degrees, with `dx`/`dy` its unit components.
    pub dir: f32,
    pub dx: f32,
    pub dy: f32,
    pub strength: f32,
    pub kind: VectorKind,
}

impl ControlVector {
    /// Build a vector pointing at `dir` degrees with unit components derived.
    pub fn new(x: f32, y: f32, dir: f32, strength: f32, kind: VectorKind) -> Self {
        let rad = dir.to_radians();
        Self {
            x,
            y,
            dir,
            dx: rad.cos(),
            dy: rad.sin(),
            strength,
            kind,
        }
    }
}

impl Default for ControlVector {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.0, 1.0, VectorKind::Plain)
    }
}

/// One size control vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeVector {
    pub x: f32,
    pub y: f32,
    /// Percentage-like size value; evaluation divides by 100.
    pub size: f32,
    pub strength: f32,
}

impl Default for SizeVector {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            size: 50.0,
            strength: 1.0,
        }
    }
}

/// Manual orientation field: control vectors plus global modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientField {
    pub vectors: Vec<ControlVector>,
    /// Subtracted from the evaluated angle, in degrees.
    pub angle_offset: f32,
    /// Exponent on the inverse-distance weight.
    pub strength_exponent: f32,
    /// Nearest-vector selection instead of blending.
    pub voronoi: bool,
}

impl Default for OrientField {
    fn default() -> Self {
        Self {
            vectors: Vec::new(),
            angle_offset: 0.0,
            strength_exponent: 1.0,
            voronoi: false,
        }
    }
}

/// Manual size field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeField {
    pub vectors: Vec<SizeVector>,
    pub strength_exponent: f32,
    pub voronoi: bool,
}

impl Default for SizeField {
    fn default() -> Self {
        Self {
            vectors: Vec::new(),
            strength_exponent: 1.0,
            voronoi: false,
        }
    }
}

fn dist2(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

fn nearest_index<T>(vectors: &[T], x: f32, y: f32, pos: impl Fn(&T) -> (f32, f32)) -> usize {
    let mut best = 0;
    let mut best_d = f32::MAX;
    for (i, v) in vectors.iter().enumerate() {
        let (vx, vy) = pos(v);
        let d = dist2(x, y, vx, vy);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

impl OrientField {
    /// Evaluate the stroke direction at a normalized query point, in degrees.
    /// The result uses the engine's "90 - angle" convention so 0 means "up".
    pub fn direction_at(&self, x: f32, y: f32) -> f32 {
        let fallback = [ControlVector::default()];
        let vectors: &[ControlVector] = if self.vectors.is_empty() {
            &fallback
        } else {
            &self.vectors
        };

        let range = if self.voronoi {
            let n = nearest_index(vectors, x, y, |v| (v.x, v.y));
            n..n + 1
        } else {
            0..vectors.len()
        };

        let mut sum = 0.0f32;
        let mut dx = 0.0f32;
        let mut dy = 0.0f32;
        for v in &vectors[range] {
            let dist = dist2(x, y, v.x, v.y).sqrt().max(DIST_FLOOR);
            let weight = v.strength / dist.powf(self.strength_exponent);
            let (tx, ty) = match v.kind {
                VectorKind::Plain => (v.dx, v.dy),
                kind => {
                    // Swirl: rotate the vector's direction by the angle from
                    // the control point to the query point.
                    let ang = (y - v.y).atan2(x - v.x);
                    let ang = match kind {
                        VectorKind::VortexCw => ang,
                        VectorKind::VortexCcw => -ang,
                        _ => -2.0 * ang,
                    };
                    let (s, c) = ang.sin_cos();
                    (v.dx * c - v.dy * s, v.dx * s + v.dy * c)
                }
            };
            dx += tx * weight;
            dy += ty * weight;
            sum += weight;
        }
        if sum > 0.0 {
            dx /= sum;
            dy /= sum;
        }
        90.0 - dy.atan2(dx).to_degrees() - self.angle_offset
    }
}

impl SizeField {
    /// Evaluate the stroke size fraction at a normalized query point, in [0,1].
    pub fn size_at(&self, x: f32, y: f32) -> f32 {
        let fallback = [SizeVector::default()];
        let vectors: &[SizeVector] = if self.vectors.is_empty() {
            &fallback
        } else {
            &self.vectors
        };

        let range = if self.voronoi {
            let n = nearest_index(vectors, x, y, |v| (v.x, v.y));
            n..n + 1
        } else {
            0..vectors.len()
        };

        let mut sum = 0.0f32;
        let mut acc = 0.0f32;
        for v in &vectors[range] {
            let dist = dist2(x, y, v.x, v.y).sqrt().max(DIST_FLOOR);
            let weight = v.strength / dist.powf(self.strength_exponent);
            acc += v.size * weight;
            sum += weight;
        }
        if sum > 0.0 {
            acc /= sum;
        }
        (acc / 100.0).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_vector_is_its_own_direction_everywhere() {
        let field = OrientField {
            vectors: vec![ControlVector::new(0.3, 0.7, 30.0, 1.0, VectorKind::Plain)],
            ..OrientField::default()
        };
        let expected = 90.0 - 30.0;
        for (x, y) in [(0.0, 0.0), (0.5, 0.5), (1.0, 0.2)] {
            let d = field.direction_at(x, y);
            assert!((d - expected).abs() < 1e-3, "at ({x},{y}): {d}");
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let field = OrientField {
            vectors: vec![
                ControlVector::new(0.2, 0.2, 10.0, 1.0, VectorKind::VortexCw),
                ControlVector::new(0.8, 0.8, 200.0, 2.5, VectorKind::Plain),
            ],
            angle_offset: 15.0,
            strength_exponent: 2.0,
            voronoi: false,
        };
        let a = field.direction_at(0.37, 0.61);
        let b = field.direction_at(0.37, 0.61);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_voronoi_locality() {
        let field = OrientField {
            vectors: vec![
                ControlVector::new(0.1, 0.5, 0.0, 1.0, VectorKind::Plain),
                ControlVector::new(0.9, 0.5, 90.0, 1.0, VectorKind::Plain),
            ],
            voronoi: true,
            ..OrientField::default()
        };
        // Points on A's side evaluate to exactly A's contribution.
        assert!((field.direction_at(0.2, 0.4) - 90.0).abs() < 1e-3);
        assert!((field.direction_at(0.8, 0.6) - 0.0).abs() < 1e-3);
    }

    #[test]
    fn test_size_single_vector_everywhere() {
        let field = SizeField {
            vectors: vec![SizeVector {
                x: 0.5,
                y: 0.5,
                size: 40.0,
                strength: 1.0,
            }],
            ..SizeField::default()
        };
        for (x, y) in [(0.0, 0.0), (0.5, 0.5), (0.9, 0.1)] {
            assert!((field.size_at(x, y) - 0.4).abs() < 1e-4);
        }
    }

    #[test]
    fn test_size_clamped_to_unit() {
        let field = SizeField {
            vectors: vec![SizeVector {
                size: 400.0,
                ..SizeVector::default()
            }],
            ..SizeField::default()
        };
        assert_eq!(field.size_at(0.5, 0.5), 1.0);
    }

    #[test]
    fn test_empty_field_uses_default_vector() {
        let field = OrientField::default();
        let d = field.direction_at(0.1, 0.9);
        assert!((d - 90.0).abs() < 1e-3);
        let sf = SizeField::default();
        assert!((sf.size_at(0.2, 0.2) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_angle_offset_subtracted() {
        let field = OrientField {
            vectors: vec![ControlVector::new(0.5, 0.5, 0.0, 1.0, VectorKind::Plain)],
            angle_offset: 25.0,
            ..OrientField::default()
        };
        assert!((field.direction_at(0.4, 0.4) - 65.0).abs() < 1e-3);
    }
}
