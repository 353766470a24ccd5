//! Per-frame play-area checks for the bird and the pigs.

use glam::Vec2;
use pigshot_engine::{Bounds, EngineContext, EntityId};

/// The bird is lost once it is fully past the left or right edge, or has
/// dropped below the bottom. Leaving through the top is allowed: it comes back down.
pub fn bird_out_of_bounds(bounds: &Bounds, world: Vec2) -> bool {
    bounds.right() < 0.0 || bounds.left() > world.x || bounds.top() > world.y
}

/// Velocity and optional corrected position for a pig after an edge check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rebound {
    pub velocity: Vec2,
    pub position: Option<Vec2>,
}

/// Point a pig's velocity back into the field at every edge it crosses.
///
/// Only the bottom edge also pushes the pig back inside; the other edges just
/// turn it around.
pub fn rebound(pos: Vec2, half: Vec2, velocity: Vec2, world: Vec2) -> Rebound {
    let mut out = Rebound {
        velocity,
        position: None,
    };

    if pos.x - half.x < 0.0 {
        out.velocity.x = velocity.x.abs();
    } else if pos.x + half.x > world.x {
        out.velocity.x = -velocity.x.abs();
    }

    if pos.y - half.y < 0.0 {
        out.velocity.y = velocity.y.abs();
    } else if pos.y + half.y > world.y {
        out.position = Some(Vec2::new(pos.x, world.y - half.y));
        out.velocity.y = -velocity.y.abs();
    }

    out
}

/// Apply `rebound` to every pig in `pigs`.
pub fn contain_pigs(ctx: &mut EngineContext, pigs: &[EntityId]) {
    let world = ctx.world_size();
    for &id in pigs {
        let (Some(pos), Some(bounds)) = (ctx.position(id), ctx.bounds(id)) else {
            continue;
        };
        let velocity = ctx.velocity(id);
        let out = rebound(pos, bounds.half_extents(), velocity, world);

        if let Some(clamped) = out.position {
            ctx.set_position(id, clamped);
        }
        if out.velocity != velocity {
            ctx.set_velocity(id, out.velocity);
        }
    }
}
