//! Rigid-body simulation on top of rapier2d.
//!
//! Everything crossing this module's boundary is glam / `EntityId`; rapier and
//! nalgebra types stay inside. Y grows downward, matching screen space.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use glam::Vec2;
use rapier2d::na;
use rapier2d::parry::shape::Shape;
use rapier2d::prelude::*;

use crate::api::types::EntityId;

fn to_na(v: Vec2) -> na::Vector2<f32> {
    na::Vector2::new(v.x, v.y)
}

fn from_na(v: &na::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// How a body takes part in the simulation.
///
/// `Fixed` bodies ignore forces and velocity, `KinematicPositionBased` bodies
/// are moved only by explicit position writes (used while a body is dragged),
/// `Dynamic` bodies are fully simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
    KinematicPositionBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }

    fn from_rapier(body_type: RigidBodyType) -> Self {
        match body_type {
            RigidBodyType::Dynamic => BodyType::Dynamic,
            RigidBodyType::Fixed => BodyType::Fixed,
            RigidBodyType::KinematicPositionBased | RigidBodyType::KinematicVelocityBased => {
                BodyType::KinematicPositionBased
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn shape(&self) -> SharedShape {
        match *self {
            ColliderDesc::Ball { radius } => SharedShape::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                SharedShape::cuboid(half_width, half_height)
            }
        }
    }
}

/// Surface response of a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.1,
            density: 1.0,
        }
    }
}

/// Collision category bitmasks.
///
/// Two bodies are tested for contact only when each one's `memberships`
/// intersect the other's `filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionGroups {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionGroups {
    /// Member of everything, collides with everything.
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filter: u32::MAX,
    };

    pub const fn new(memberships: u32, filter: u32) -> Self {
        Self { memberships, filter }
    }

    fn to_rapier(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.memberships),
            Group::from_bits_truncate(self.filter),
        )
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// Constraint solver precision.
///
/// Raised while a body is being dragged by hand so that teleported bodies
/// cannot tunnel through what they touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverIterations {
    pub position: usize,
    pub velocity: usize,
}

impl Default for SolverIterations {
    fn default() -> Self {
        Self {
            position: 6,
            velocity: 4,
        }
    }
}

/// Everything needed to create one body with a single collider.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub ccd: bool,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
    pub groups: CollisionGroups,
}

impl BodyDesc {
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            fixed_rotation: false,
            ccd: false,
            collider,
            linear_damping: 0.0,
            groups: CollisionGroups::ALL,
        }
    }

    /// A static body. Gravity scale stays at 1 so the body falls normally if
    /// later made dynamic.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            fixed_rotation: true,
            ..Self::dynamic(collider)
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    /// Air friction. Zero keeps bodies moving forever.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }

    /// The owning entity is kept in `user_data` so contacts map back to it.
    fn rigid_body(&self, owner: EntityId) -> RigidBody {
        let mut rb = RigidBodyBuilder::new(self.body_type.to_rapier())
            .translation(to_na(self.position))
            .linvel(to_na(self.velocity))
            .gravity_scale(self.gravity_scale)
            .linear_damping(self.linear_damping)
            .ccd_enabled(self.ccd)
            .user_data(u128::from(owner.0));
        if self.fixed_rotation {
            rb = rb.lock_rotations();
        }
        rb.build()
    }

    fn collider(&self, material: ColliderMaterial) -> Collider {
        ColliderBuilder::new(self.collider.shape())
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .collision_groups(self.groups.to_rapier())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build()
    }
}

/// Handles of an entity's body and its collider.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// Axis-aligned bounding box in world space (Y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn left(&self) -> f32 {
        self.min.x
    }

    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn top(&self) -> f32 {
        self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

/// Two entities that started or stopped touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the collision just started, `false` when it ended.
    pub started: bool,
}

impl CollisionPair {
    pub fn started(entity_a: EntityId, entity_b: EntityId) -> Self {
        Self {
            entity_a,
            entity_b,
            started: true,
        }
    }

    /// If `id` is one side of the pair, return the other side.
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.entity_a == id {
            Some(self.entity_b)
        } else if self.entity_b == id {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

/// Collider pairs reported during one step, in the order rapier reports them.
/// Behind a mutex because rapier wants a `Sync` handler.
#[derive(Default)]
struct ContactLog {
    entries: Mutex<Vec<(ColliderHandle, ColliderHandle, bool)>>,
}

impl ContactLog {
    fn take(&self) -> Vec<(ColliderHandle, ColliderHandle, bool)> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventHandler for ContactLog {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let entry = (event.collider1(), event.collider2(), event.started());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

/// The simulated objects.
#[derive(Default)]
struct Sets {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
}

/// Per-step machinery rapier keeps between steps.
#[derive(Default)]
struct Pipeline {
    physics: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd: CCDSolver,
    queries: QueryPipeline,
}

/// A 2D physics world addressed by entity-owned `PhysicsBody` handles.
pub struct PhysicsWorld {
    gravity: na::Vector2<f32>,
    params: IntegrationParameters,
    solver: SolverIterations,
    sets: Sets,
    pipeline: Pipeline,
    contacts: ContactLog,
}

impl PhysicsWorld {
    /// Positive Y gravity pulls bodies toward the bottom of the screen.
    pub fn new(gravity: Vec2) -> Self {
        let mut world = Self {
            gravity: to_na(gravity),
            params: IntegrationParameters::default(),
            solver: SolverIterations::default(),
            sets: Sets::default(),
            pipeline: Pipeline::default(),
            contacts: ContactLog::default(),
        };
        world.set_solver_iterations(SolverIterations::default());
        world
    }

    pub fn set_dt(&mut self, dt: f32) {
        self.params.dt = dt;
    }

    /// Velocity iterations drive rapier's solver iterations, position
    /// iterations its internal PGS iterations.
    pub fn set_solver_iterations(&mut self, iterations: SolverIterations) {
        self.params.num_solver_iterations =
            NonZeroUsize::new(iterations.velocity).unwrap_or(NonZeroUsize::MIN);
        self.params.num_internal_pgs_iterations = iterations.position.max(1);
        self.solver = iterations;
    }

    pub fn solver_iterations(&self) -> SolverIterations {
        self.solver
    }

    pub fn create_body(
        &mut self,
        owner: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let Sets { bodies, colliders, .. } = &mut self.sets;
        let body_handle = bodies.insert(desc.rigid_body(owner));
        let collider_handle =
            colliders.insert_with_parent(desc.collider(material), body_handle, bodies);
        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body together with its collider.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        let Sets {
            bodies,
            colliders,
            impulse_joints,
            multibody_joints,
        } = &mut self.sets;
        bodies.remove(
            body.body_handle,
            &mut self.pipeline.islands,
            colliders,
            impulse_joints,
            multibody_joints,
            true,
        );
    }

    /// Advance one step and return the contacts it started or stopped.
    /// Contacts whose bodies no longer exist are dropped.
    pub fn step(&mut self) -> Vec<CollisionPair> {
        let Pipeline {
            physics,
            islands,
            broad_phase,
            narrow_phase,
            ccd,
            queries,
        } = &mut self.pipeline;
        physics.step(
            &self.gravity,
            &self.params,
            islands,
            broad_phase,
            narrow_phase,
            &mut self.sets.bodies,
            &mut self.sets.colliders,
            &mut self.sets.impulse_joints,
            &mut self.sets.multibody_joints,
            ccd,
            Some(queries),
            &(),
            &self.contacts,
        );

        self.contacts
            .take()
            .into_iter()
            .filter_map(|(c1, c2, started)| {
                Some(CollisionPair {
                    entity_a: self.owner(c1)?,
                    entity_b: self.owner(c2)?,
                    started,
                })
            })
            .collect()
    }

    fn owner(&self, collider: ColliderHandle) -> Option<EntityId> {
        let parent = self.sets.colliders.get(collider)?.parent()?;
        let rb = self.sets.bodies.get(parent)?;
        Some(EntityId(rb.user_data as u32))
    }

    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.sets.bodies.get_mut(body.body_handle) {
            rb.set_linvel(to_na(vel), true);
        }
    }

    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.sets
            .bodies
            .get(body.body_handle)
            .map_or(Vec2::ZERO, |rb| from_na(rb.linvel()))
    }

    /// Teleport a body. Works for every body type and takes effect immediately.
    pub fn set_position(&mut self, body: &PhysicsBody, pos: Vec2) {
        if let Some(rb) = self.sets.bodies.get_mut(body.body_handle) {
            rb.set_translation(to_na(pos), true);
        }
    }

    /// Position and rotation angle of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.sets
            .bodies
            .get(body.body_handle)
            .map_or((Vec2::ZERO, 0.0), |rb| {
                (from_na(rb.translation()), rb.rotation().angle())
            })
    }

    pub fn set_body_type(&mut self, body: &PhysicsBody, body_type: BodyType) {
        if let Some(rb) = self.sets.bodies.get_mut(body.body_handle) {
            rb.set_body_type(body_type.to_rapier(), true);
        }
    }

    pub fn body_type(&self, body: &PhysicsBody) -> Option<BodyType> {
        let rb = self.sets.bodies.get(body.body_handle)?;
        Some(BodyType::from_rapier(rb.body_type()))
    }

    /// Collider AABB at the body's current pose.
    ///
    /// Uses the rigid body rather than the collider so a teleport is visible
    /// before the next step propagates collider positions.
    pub fn bounds(&self, body: &PhysicsBody) -> Option<Bounds> {
        let rb = self.sets.bodies.get(body.body_handle)?;
        let collider = self.sets.colliders.get(body.collider_handle)?;
        let aabb = collider.shape().compute_aabb(rb.position());
        Some(Bounds {
            min: Vec2::new(aabb.mins.x, aabb.mins.y),
            max: Vec2::new(aabb.maxs.x, aabb.maxs.y),
        })
    }

    pub fn body_count(&self) -> usize {
        self.sets.bodies.len()
    }
}
