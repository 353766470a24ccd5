//! Gameplay constants, all given in reference-layout units (an 800×600 canvas)
//! and multiplied by the session `Scale` at use.

use glam::Vec2;
use pigshot_engine::SolverIterations;

/// Reference canvas the layout was authored against.
pub const REFERENCE_SIZE: Vec2 = Vec2::new(800.0, 600.0);

/// Where the bird sits before a launch and after every reset.
pub const BIRD_REST: Vec2 = Vec2::new(150.0, 450.0);
pub const SLINGSHOT_POS: Vec2 = Vec2::new(200.0, 450.0);

/// Source texture sizes; bodies and sprites are derived from these.
pub const BIRD_TEXTURE_SIZE: f32 = 64.0;
pub const PIG_TEXTURE_SIZE: f32 = 64.0;
pub const SLINGSHOT_TEXTURE_SIZE: Vec2 = Vec2::new(48.0, 96.0);

pub const BIRD_SCALE: f32 = 0.5;
pub const PIG_SCALE: f32 = 0.7;

/// Divisor turning drag distance into launch speed.
pub const LAUNCH_DAMPING: f32 = 8.0;

pub const HIT_POINTS: i32 = 10;
pub const MISS_PENALTY: i32 = 10;

pub const INITIAL_PIGS: usize = 3;
pub const PIG_SPAWN_MIN: Vec2 = Vec2::new(400.0, 200.0);
pub const PIG_SPAWN_MAX: Vec2 = Vec2::new(800.0, 600.0);
/// Per-axis spawn speed range, in units per frame.
pub const PIG_SPAWN_SPEED: i32 = 2;

/// Gameplay speeds are authored per frame at this rate.
pub const FRAME_RATE: f32 = 60.0;
/// Downward gravity in units/s² ("1" in per-millisecond engine terms).
pub const GRAVITY: f32 = 1000.0;

pub const DRAG_SOLVER: SolverIterations = SolverIterations {
    position: 30,
    velocity: 30,
};

pub const SCORE_POS: Vec2 = Vec2::new(16.0, 16.0);
pub const SCORE_FONT_SIZE: f32 = 32.0;

/// Game event kinds sent to the host.
pub const EVENT_SCORE: f32 = 1.0;

/// Collision categories. The bird only ever collides with pigs.
pub const GROUP_BIRD: u32 = 1 << 0;
pub const GROUP_SLINGSHOT: u32 = 1 << 1;
pub const GROUP_PIG: u32 = 1 << 2;

/// Convert a per-frame speed into the per-second velocity the physics world uses.
pub fn per_second(per_frame: Vec2) -> Vec2 {
    per_frame * FRAME_RATE
}

/// Viewport-derived multiplier applied to every spatial constant.
/// Fixed for the session once computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(pub f32);

impl Scale {
    /// Fit the reference layout inside the viewport, keeping its aspect ratio.
    pub fn from_viewport(viewport: Vec2) -> Self {
        let fit = viewport / REFERENCE_SIZE;
        Self(fit.x.min(fit.y))
    }

    pub fn of(self, value: f32) -> f32 {
        value * self.0
    }

    pub fn point(self, value: Vec2) -> Vec2 {
        value * self.0
    }

    pub fn bird_radius(self) -> f32 {
        self.of(BIRD_TEXTURE_SIZE / 2.0 * BIRD_SCALE)
    }

    pub fn pig_radius(self) -> f32 {
        self.of(PIG_TEXTURE_SIZE / 2.0 * PIG_SCALE)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}
