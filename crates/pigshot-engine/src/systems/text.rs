//! Bitmap font text overlay.
//!
//! Each character becomes an Entity with a SpriteComponent pointing at its glyph
//! in a font atlas laid out in ASCII order (16 columns × 6 rows from space).
//! Text is replaced wholesale: despawn the tag, build again.

use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::components::sprite::{AtlasId, SpriteComponent};
use crate::core::scene::Scene;
use glam::Vec2;

/// Configuration for a bitmap font atlas.
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// Which atlas contains the font glyphs.
    pub atlas: AtlasId,
    pub cols: u32,
    pub rows: u32,
    /// First ASCII code in the atlas (typically 32 = space).
    pub start_char: u8,
    /// Horizontal advance as fraction of glyph size.
    pub spacing: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            atlas: AtlasId(1), // atlas 0 = game sprites, atlas 1 = font
            cols: 16,
            rows: 6,
            start_char: 32,
            spacing: 0.55,
        }
    }
}

/// Convert a character to grid coordinates (col, row) in the font atlas.
///
/// Returns `None` if the character is outside the valid range for this font.
pub fn char_to_grid(c: char, font: &FontConfig) -> Option<(f32, f32)> {
    let index = (c as u32).checked_sub(font.start_char as u32)?;
    if index >= font.cols * font.rows {
        return None;
    }
    Some(((index % font.cols) as f32, (index / font.cols) as f32))
}

/// Build glyph entities for `text`, top-left corner at `pos`, glyphs `size` units tall.
///
/// Characters outside the font are skipped but still advance the cursor.
pub fn build_text_entities<F>(
    text: &str,
    pos: Vec2,
    size: f32,
    font: &FontConfig,
    tag: &str,
    id_gen: &mut F,
) -> Vec<Entity>
where
    F: FnMut() -> EntityId,
{
    let mut entities = Vec::with_capacity(text.len());
    let mut cursor_x = pos.x;

    for c in text.chars() {
        if let Some((col, row)) = char_to_grid(c, font) {
            let entity = Entity::new(id_gen())
                .with_tag(tag)
                .with_pos(Vec2::new(cursor_x + size / 2.0, pos.y + size / 2.0))
                .with_scale(Vec2::splat(size))
                .with_sprite(SpriteComponent::cell(font.atlas, col, row));
            entities.push(entity);
        }
        cursor_x += size * font.spacing;
    }

    entities
}

/// Despawn all entities with the given tag.
pub fn despawn_text(scene: &mut Scene, tag: &str) {
    let ids: Vec<EntityId> = scene
        .iter()
        .filter(|e| e.tag == tag)
        .map(|e| e.id)
        .collect();

    for id in ids {
        scene.despawn(id);
    }
}

/// Read the text back out of glyph entities with `tag`, in spawn order.
/// Skipped characters are not recoverable and are omitted.
pub fn text_of(scene: &Scene, tag: &str, font: &FontConfig) -> String {
    scene
        .iter()
        .filter(|e| e.tag == tag)
        .filter_map(|e| e.sprite.as_ref())
        .filter_map(|s| {
            let index = s.row as u32 * font.cols + s.col as u32;
            char::from_u32(index + font.start_char as u32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> impl FnMut() -> EntityId {
        let mut next = 0u32;
        move || {
            next += 1;
            EntityId(next)
        }
    }

    #[test]
    fn char_to_grid_digits_and_letters() {
        let font = FontConfig::default();
        // '0' is ASCII 48 → index 16 → col 0, row 1
        assert_eq!(char_to_grid('0', &font), Some((0.0, 1.0)));
        // 'S' is ASCII 83 → index 51 → col 3, row 3
        assert_eq!(char_to_grid('S', &font), Some((3.0, 3.0)));
        assert_eq!(char_to_grid(' ', &font), Some((0.0, 0.0)));
    }

    #[test]
    fn char_to_grid_out_of_range() {
        let font = FontConfig::default();
        assert!(char_to_grid('\t', &font).is_none());
        assert!(char_to_grid('\u{80}', &font).is_none());
    }

    #[test]
    fn build_positions_glyphs_left_to_right() {
        let font = FontConfig::default();
        let entities = build_text_entities("-10", Vec2::new(16.0, 16.0), 32.0, &font, "score", &mut ids());

        assert_eq!(entities.len(), 3);
        assert!(entities.iter().all(|e| e.tag == "score"));
        assert_eq!(entities[0].pos, Vec2::new(32.0, 32.0));
        assert!((entities[1].pos.x - (32.0 + 32.0 * 0.55)).abs() < 1e-4);
        assert_eq!(entities[2].scale, Vec2::splat(32.0));
    }

    #[test]
    fn unprintable_chars_are_skipped() {
        let font = FontConfig::default();
        let entities = build_text_entities("A\tB", Vec2::ZERO, 20.0, &font, "t", &mut ids());
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn despawn_and_read_back() {
        let font = FontConfig::default();
        let mut scene = Scene::new();
        for e in build_text_entities("Score: 10", Vec2::ZERO, 20.0, &font, "score", &mut ids()) {
            scene.spawn(e);
        }
        scene.spawn(Entity::new(EntityId(100)).with_tag("pig"));

        assert_eq!(text_of(&scene, "score", &font), "Score: 10");

        despawn_text(&mut scene, "score");
        assert_eq!(scene.len(), 1);
        assert_eq!(text_of(&scene, "score", &font), "");
    }
}
