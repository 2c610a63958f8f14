//! impasto - procedural painting engine
//!
//! Repaints a raster image as a field of brush strokes: a brush asset is
//! expanded into a family of rotated and rescaled stamps, per-pixel fields
//! choose each stroke's orientation and size, and the strokes are composited
//! over a configurable background with optional drop shadows, relief
//! highlights and a paper texture post-filter. Everything is deterministic
//! under a caller-supplied seed.

pub mod brush_family;
pub mod config;
pub mod error;
pub mod field;
pub mod paint;
pub mod paper;
pub mod preset;
pub mod progress;
pub mod raster;

pub use brush_family::{BrushFamily, BrushStamp};
pub use config::{BackgroundKind, ColorKind, FieldKind, PaintConfig, PlacementKind};
pub use error::{LoadError, PaintError};
pub use paint::PaintEngine;
pub use progress::{NullProgress, ProgressSink};
pub use raster::{decode, decode_lenient, LoadOutcome, Raster};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber. Call once from the host binary;
/// library users bring their own subscriber instead.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impasto=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
