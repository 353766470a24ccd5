use std::collections::HashMap;
use crate::assets::manifest::{AssetManifest, SpriteDescriptor};
use crate::components::sprite::{AtlasId, SpriteComponent};

/// Registry of named sprites, built from an AssetManifest.
pub struct SpriteRegistry {
    sprites: HashMap<String, SpriteComponent>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self {
            sprites: HashMap::new(),
        }
    }

    /// Build a registry from a parsed AssetManifest.
    ///
    /// When the manifest lists atlases, sprites pointing outside them are
    /// skipped so lookups fall back to built-in cells instead.
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let sprites = manifest
            .sprites
            .iter()
            .filter(|(name, desc)| {
                let fits = manifest.atlases.is_empty() || in_atlas(manifest, desc);
                if !fits {
                    log::warn!(
                        "sprite '{}' points outside atlas {} (cell {},{}), skipped",
                        name, desc.atlas, desc.col, desc.row
                    );
                }
                fits
            })
            .map(|(name, desc)| {
                let sprite = SpriteComponent {
                    atlas: AtlasId(desc.atlas),
                    col: desc.col as f32,
                    row: desc.row as f32,
                    cell_span: desc.span as f32,
                    alpha: 1.0,
                };
                (name.clone(), sprite)
            })
            .collect();
        Self { sprites }
    }

    /// Look up a sprite by name. Returns None if not found.
    pub fn get(&self, name: &str) -> Option<&SpriteComponent> {
        self.sprites.get(name)
    }

    /// Look up a sprite by name, falling back to `fallback` when it is missing.
    pub fn get_or(&self, name: &str, fallback: SpriteComponent) -> SpriteComponent {
        match self.sprites.get(name) {
            Some(sprite) => sprite.clone(),
            None => {
                log::debug!("sprite '{}' not in manifest, using built-in cell", name);
                fallback
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

fn in_atlas(manifest: &AssetManifest, desc: &SpriteDescriptor) -> bool {
    manifest
        .atlases
        .get(desc.atlas as usize)
        .is_some_and(|atlas| desc.col < atlas.cols && desc.row < atlas.rows)
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
