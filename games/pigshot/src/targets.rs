use glam::Vec2;
use pigshot_engine::{
    AtlasId, BodyDesc, ColliderDesc, ColliderMaterial, CollisionGroups, EngineContext, Entity,
    EntityId, SpriteComponent,
};

use crate::tuning::{
    per_second, Scale, GROUP_PIG, PIG_SPAWN_MAX, PIG_SPAWN_MIN, PIG_SPAWN_SPEED,
};

const PIG_TAG: &str = "pig";

/// Live pigs in spawn order. Every id held here has a body in the scene.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    ids: Vec<EntityId>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    /// Forget `id`. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.ids.iter().position(|&t| t == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Spawn one pig somewhere in the right half of the field, drifting slowly
    /// in a random direction, and register it.
    pub fn spawn(&mut self, ctx: &mut EngineContext, scale: Scale) -> EntityId {
        let min = scale.point(PIG_SPAWN_MIN);
        let max = scale.point(PIG_SPAWN_MAX);
        let pos = Vec2::new(
            ctx.random_between(min.x.round() as i32, max.x.round() as i32) as f32,
            ctx.random_between(min.y.round() as i32, max.y.round() as i32) as f32,
        );
        let drift = Vec2::new(
            ctx.random_between(-PIG_SPAWN_SPEED, PIG_SPAWN_SPEED) as f32,
            ctx.random_between(-PIG_SPAWN_SPEED, PIG_SPAWN_SPEED) as f32,
        );

        let radius = scale.pig_radius();
        let sprite = ctx.sprites.get_or("pig", SpriteComponent::cell(AtlasId(0), 1.0, 0.0));
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag(PIG_TAG)
                .with_scale(Vec2::splat(radius * 2.0))
                .with_sprite(sprite),
            BodyDesc::dynamic(ColliderDesc::Ball { radius })
                .with_position(pos)
                .with_velocity(per_second(drift))
                .with_linear_damping(0.0)
                .with_groups(CollisionGroups::new(GROUP_PIG, CollisionGroups::ALL.filter)),
            ColliderMaterial {
                restitution: 1.0,
                ..ColliderMaterial::default()
            },
        );

        self.ids.push(id);
        log::debug!("pig {:?} spawned at ({:.0}, {:.0})", id, pos.x, pos.y);
        id
    }
}
