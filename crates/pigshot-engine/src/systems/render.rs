use crate::components::entity::Entity;
use crate::components::sprite::AtlasId;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Atlas holding the game's sprites; everything else is drawn after it.
pub const GAME_ATLAS: AtlasId = AtlasId(0);

/// Build the render buffer from a set of entities.
/// Game-atlas sprites come first, other atlases (the font) after `atlas_split`,
/// each group in scene order. Capacity beyond `max_instances` is dropped.
pub fn build_render_buffer<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    buffer: &mut RenderBuffer,
    max_instances: usize,
) {
    buffer.clear();

    let mut overlay: Vec<RenderInstance> = Vec::new();

    for entity in entities.filter(|e| e.active) {
        let Some(sprite) = &entity.sprite else {
            continue;
        };

        let instance = RenderInstance {
            x: entity.pos.x,
            y: entity.pos.y,
            rotation: entity.rotation,
            size: entity.scale.x,
            sprite_col: sprite.col,
            sprite_row: sprite.row,
            cell_span: sprite.cell_span,
            alpha: sprite.alpha,
        };

        if sprite.atlas == GAME_ATLAS {
            buffer.push(instance);
        } else {
            overlay.push(instance);
        }
    }

    buffer.atlas_split = buffer.instance_count();
    buffer.instances.extend(overlay);

    if buffer.instances.len() > max_instances {
        log::warn!(
            "render buffer overflow: {} instances, capacity {}",
            buffer.instances.len(),
            max_instances
        );
        buffer.instances.truncate(max_instances);
        buffer.atlas_split = buffer.atlas_split.min(max_instances as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::sprite::SpriteComponent;
    use glam::Vec2;

    #[test]
    fn game_sprites_before_font_glyphs() {
        let entities = vec![
            Entity::new(EntityId(1))
                .with_pos(Vec2::new(10.0, 20.0))
                .with_sprite(SpriteComponent::cell(AtlasId(1), 3.0, 2.0)),
            Entity::new(EntityId(2))
                .with_pos(Vec2::new(30.0, 40.0))
                .with_scale(Vec2::splat(50.0))
                .with_sprite(SpriteComponent::cell(GAME_ATLAS, 1.0, 0.0)),
            Entity::new(EntityId(3)),
        ];

        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer, 16);

        assert_eq!(buffer.instance_count(), 2);
        assert_eq!(buffer.atlas_split, 1);
        assert_eq!(buffer.instances[0].x, 30.0);
        assert_eq!(buffer.instances[0].size, 50.0);
        assert_eq!(buffer.instances[1].sprite_col, 3.0);
    }

    #[test]
    fn inactive_entities_are_skipped() {
        let mut entity = Entity::new(EntityId(1)).with_sprite(SpriteComponent::default());
        entity.active = false;

        let entities = vec![entity];
        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer, 16);
        assert_eq!(buffer.instance_count(), 0);
    }

    #[test]
    fn overflow_is_truncated() {
        let entities: Vec<Entity> = (0..5)
            .map(|i| Entity::new(EntityId(i)).with_sprite(SpriteComponent::default()))
            .collect();
        let mut buffer = RenderBuffer::new();
        build_render_buffer(entities.iter(), &mut buffer, 3);
        assert_eq!(buffer.instance_count(), 3);
        assert_eq!(buffer.atlas_split, 3);
    }
}
