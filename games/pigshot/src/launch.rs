//! Slingshot controls: the bird follows the pointer while held and flies off
//! opposite to the pull when released.

use glam::Vec2;
use pigshot_engine::{BodyType, EngineContext, EntityId};

use crate::tuning::{per_second, Scale, BIRD_REST, DRAG_SOLVER, LAUNCH_DAMPING};

/// Launch velocity in units per frame for a bird released at `release`.
pub fn launch_velocity(rest: Vec2, release: Vec2) -> Vec2 {
    (rest - release) / LAUNCH_DAMPING
}

/// The bird was grabbed. It stops reacting to forces until released.
pub fn grab(ctx: &mut EngineContext, bird: EntityId) {
    ctx.set_solver_iterations(DRAG_SOLVER);
    ctx.set_body_type(bird, BodyType::KinematicPositionBased);
}

/// Move the held bird straight to `pos`.
pub fn pull(ctx: &mut EngineContext, bird: EntityId, pos: Vec2) {
    ctx.set_position(bird, pos);
}

/// Let go: the bird becomes dynamic and is flung back past its rest point.
pub fn release(ctx: &mut EngineContext, bird: EntityId, scale: Scale) {
    ctx.restore_solver_iterations();
    ctx.set_body_type(bird, BodyType::Dynamic);

    let Some(pos) = ctx.position(bird) else {
        return;
    };
    let velocity = launch_velocity(scale.point(BIRD_REST), pos);
    ctx.set_velocity(bird, per_second(velocity));
    log::debug!("bird launched at ({:.2}, {:.2}) per frame", velocity.x, velocity.y);
}
