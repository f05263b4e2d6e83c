//! Client position on the shared canvas.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Canvas width in logical units. Spawn positions fall in `[0, CANVAS_WIDTH)`.
pub const CANVAS_WIDTH: f64 = 800.0;

/// Canvas height in logical units. Spawn positions fall in `[0, CANVAS_HEIGHT)`.
pub const CANVAS_HEIGHT: f64 = 600.0;

/// Last-known position of a client.
///
/// Updates are a full replace (last-write-wins) — there is no merging of
/// concurrent moves for the same client, and only the owning connection ever
/// writes its own entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position from coordinates.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Uniformly random spawn position inside the canvas bounds.
    #[must_use]
    pub fn random_spawn() -> Self {
        let mut rng = rand::rng();
        Self {
            x: rng.random_range(0.0..CANVAS_WIDTH),
            y: rng.random_range(0.0..CANVAS_HEIGHT),
        }
    }
}
