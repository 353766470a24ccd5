use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::api::types::{EntityId, GameEvent};
use crate::assets::registry::SpriteRegistry;
use crate::components::entity::Entity;
use crate::core::physics::{
    BodyDesc, BodyType, Bounds, ColliderMaterial, CollisionPair, PhysicsWorld, SolverIterations,
};
use crate::core::scene::Scene;
use crate::input::drag::DragEvent;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units. The host overrides this with the viewport size.
    pub world_width: f32,
    /// World height in game units. The host overrides this with the viewport size.
    pub world_height: f32,
    /// Gravity vector in units/s². Positive Y pulls toward the bottom of the screen.
    pub gravity: Vec2,
    /// Default solver precision.
    pub solver: SolverIterations,
    /// Seed for the engine RNG.
    pub seed: u64,
    /// Maximum number of render instances (default: 256).
    pub max_instances: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            gravity: Vec2::ZERO,
            solver: SolverIterations::default(),
            seed: 42,
            max_instances: 256,
            max_events: 32,
        }
    }
}

impl GameConfig {
    /// Fit the world to the host viewport (the canvas fills the window).
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.world_width = width;
        self.world_height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The lifecycle every game implements. The host loop owns the game and calls
/// back into it; games never drive the loop themselves.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// Per-frame update, called once per fixed step before physics steps.
    fn update(&mut self, ctx: &mut EngineContext);

    /// A drag gesture step on a draggable entity.
    fn on_drag(&mut self, _ctx: &mut EngineContext, _event: DragEvent) {}

    /// Two bodies started touching during the last physics step.
    fn on_collision_start(&mut self, _ctx: &mut EngineContext, _pair: CollisionPair) {}
}

/// Mutable access to engine state, passed to every `Game` callback.
pub struct EngineContext {
    pub scene: Scene,
    pub physics: PhysicsWorld,
    pub sprites: SpriteRegistry,
    pub events: Vec<GameEvent>,
    world_size: Vec2,
    default_solver: SolverIterations,
    rng: Pcg32,
    next_id: u32,
    collision_events: Vec<CollisionPair>,
}

impl EngineContext {
    pub fn new(config: &GameConfig) -> Self {
        let mut physics = PhysicsWorld::new(config.gravity);
        physics.set_dt(config.fixed_dt);
        physics.set_solver_iterations(config.solver);

        Self {
            scene: Scene::new(),
            physics,
            sprites: SpriteRegistry::new(),
            events: Vec::with_capacity(config.max_events),
            world_size: Vec2::new(config.world_width, config.world_height),
            default_solver: config.solver,
            rng: Pcg32::seed_from_u64(config.seed),
            next_id: 1,
            collision_events: Vec::new(),
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Size of the play area (the canvas) in world units.
    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Uniform random integer in `[min, max]` (both inclusive).
    /// Bounds given in the wrong order are swapped.
    pub fn random_between(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.random_range(lo..=hi)
    }

    /// Emit a game event to be forwarded to the host.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data (events).
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. Returns the EntityId.
    /// The entity's position is set from the BodyDesc.
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity.with_pos(desc.position).with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    /// Returns `false` if the entity was already gone.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.scene.despawn(id) {
            Some(entity) => {
                if let Some(body) = &entity.body {
                    self.physics.remove_body(body);
                }
                true
            }
            None => false,
        }
    }

    /// Teleport an entity (and its body) to `pos`.
    pub fn set_position(&mut self, id: EntityId, pos: Vec2) {
        if let Some(entity) = self.scene.get_mut(id) {
            entity.pos = pos;
            if let Some(body) = &entity.body {
                self.physics.set_position(body, pos);
            }
        }
    }

    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.scene.get(id).map(|e| e.pos)
    }

    /// Set the linear velocity of an entity's physics body.
    pub fn set_velocity(&mut self, id: EntityId, vel: Vec2) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.set_velocity(&body, vel);
        }
    }

    /// Get the linear velocity of an entity's physics body.
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        self.scene
            .get(id)
            .and_then(|e| e.body.as_ref())
            .map(|body| self.physics.velocity(body))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_body_type(&mut self, id: EntityId, body_type: BodyType) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.set_body_type(&body, body_type);
        }
    }

    pub fn body_type(&self, id: EntityId) -> Option<BodyType> {
        let body = self.scene.get(id)?.body?;
        self.physics.body_type(&body)
    }

    /// World-space bounds of an entity's collider.
    pub fn bounds(&self, id: EntityId) -> Option<Bounds> {
        let body = self.scene.get(id)?.body?;
        self.physics.bounds(&body)
    }

    /// Raise solver precision, e.g. while a body is moved by hand.
    pub fn set_solver_iterations(&mut self, iterations: SolverIterations) {
        self.physics.set_solver_iterations(iterations);
    }

    /// Back to the precision the game was configured with.
    pub fn restore_solver_iterations(&mut self) {
        self.physics.set_solver_iterations(self.default_solver);
    }

    /// Take ownership of the most recent step's collision events.
    pub fn take_collisions(&mut self) -> Vec<CollisionPair> {
        std::mem::take(&mut self.collision_events)
    }

    /// Step the physics simulation and sync positions back to entities.
    /// Called by the host loop after `Game::update()`.
    pub fn step_physics(&mut self) {
        self.collision_events = self.physics.step();

        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                let (pos, rot) = self.physics.body_position(body);
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::ColliderDesc;

    fn spawn_ball(ctx: &mut EngineContext, desc: BodyDesc) -> EntityId {
        let id = ctx.next_id();
        ctx.spawn_with_body(Entity::new(id), desc, ColliderMaterial::default())
    }

    #[test]
    fn spawn_with_body_creates_entity_and_physics() {
        let mut ctx = EngineContext::default();
        let id = spawn_ball(
            &mut ctx,
            BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 }).with_position(Vec2::new(100.0, 200.0)),
        );

        assert_eq!(ctx.scene.len(), 1);
        assert_eq!(ctx.physics.body_count(), 1);
        assert_eq!(ctx.position(id), Some(Vec2::new(100.0, 200.0)));
    }

    #[test]
    fn despawn_cleans_up_physics_once() {
        let mut ctx = EngineContext::default();
        let id = spawn_ball(&mut ctx, BodyDesc::dynamic(ColliderDesc::Ball { radius: 10.0 }));

        assert!(ctx.despawn(id));
        assert_eq!(ctx.scene.len(), 0);
        assert_eq!(ctx.physics.body_count(), 0);
        assert!(!ctx.despawn(id));
    }

    #[test]
    fn step_physics_syncs_positions() {
        let config = GameConfig {
            gravity: Vec2::new(0.0, 100.0),
            ..GameConfig::default()
        };
        let mut ctx = EngineContext::new(&config);
        let id = spawn_ball(&mut ctx, BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 }));

        for _ in 0..10 {
            ctx.step_physics();
        }

        let y = ctx.position(id).unwrap().y;
        assert!(y > 0.0, "Entity should have moved down: y={}", y);
    }

    #[test]
    fn set_position_moves_entity_and_bounds() {
        let mut ctx = EngineContext::default();
        let id = spawn_ball(&mut ctx, BodyDesc::fixed(ColliderDesc::Ball { radius: 5.0 }));
        ctx.set_position(id, Vec2::new(-50.0, 10.0));
        assert_eq!(ctx.position(id), Some(Vec2::new(-50.0, 10.0)));
        let b = ctx.bounds(id).unwrap();
        assert!((b.right() - (-45.0)).abs() < 0.01);
    }

    #[test]
    fn solver_restore_returns_to_config() {
        let config = GameConfig::default();
        let mut ctx = EngineContext::new(&config);
        ctx.set_solver_iterations(SolverIterations { position: 30, velocity: 30 });
        assert_eq!(ctx.physics.solver_iterations().position, 30);
        ctx.restore_solver_iterations();
        assert_eq!(ctx.physics.solver_iterations(), config.solver);
    }

    #[test]
    fn random_between_is_inclusive_and_seeded() {
        let mut a = EngineContext::new(&GameConfig::default().with_seed(7));
        let mut b = EngineContext::new(&GameConfig::default().with_seed(7));
        let mut seen = [false; 5];
        for _ in 0..500 {
            let v = a.random_between(-2, 2);
            assert_eq!(v, b.random_between(-2, 2));
            assert!((-2..=2).contains(&v));
            seen[(v + 2) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "every value should appear: {:?}", seen);
        assert_eq!(a.random_between(5, 5), 5);
        assert!((3..=9).contains(&a.random_between(9, 3)));
    }

    #[test]
    fn missing_entities_are_harmless() {
        let mut ctx = EngineContext::default();
        let ghost = EntityId(99);
        ctx.set_position(ghost, Vec2::ONE);
        ctx.set_velocity(ghost, Vec2::ONE);
        ctx.set_body_type(ghost, BodyType::Dynamic);
        assert_eq!(ctx.velocity(ghost), Vec2::ZERO);
        assert!(ctx.bounds(ghost).is_none());
        assert!(ctx.body_type(ghost).is_none());
    }

    #[test]
    fn viewport_overrides_world_size() {
        let config = GameConfig::default().with_viewport(1280.0, 720.0);
        let ctx = EngineContext::new(&config);
        assert_eq!(ctx.world_size(), Vec2::new(1280.0, 720.0));
    }
}
