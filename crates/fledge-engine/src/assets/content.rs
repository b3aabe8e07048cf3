//! Resolved content store: the manifest's string references turned into
//! texture descriptors, subtextures and map data ready for components.

use std::collections::HashMap;

use glam::{IVec2, Vec2};
use thiserror::Error;

use crate::assets::manifest::Manifest;
use crate::math::{Rect, RectI};
use crate::renderer::backend::{Texture, TextureId};
use crate::renderer::subtexture::Subtexture;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{owner}` references unknown atlas `{atlas}`")]
    UnknownAtlas { owner: String, atlas: String },
    #[error("map `{map}` {layer} layer has {got} tiles, expected {expected}")]
    BadLayerLength {
        map: String,
        layer: &'static str,
        got: usize,
        expected: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct AnimationFrame {
    pub subtexture: Subtexture,
    pub duration_ms: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub frames: Vec<AnimationFrame>,
}

impl Animation {
    pub fn duration_ms(&self) -> f32 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sprite {
    pub pivot: Vec2,
    animations: HashMap<String, Animation>,
}

impl Sprite {
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }
}

/// Tile graphics source for a map: tile ids index into a fixed atlas grid.
#[derive(Debug, Clone, Copy)]
pub struct Tileset {
    pub texture: Texture,
    pub columns: u32,
    pub tile_size: u32,
}

impl Tileset {
    /// Atlas region of a 1-based tile id.
    pub fn tile_rect(&self, id: u32) -> Rect {
        debug_assert!(id > 0, "tile id 0 is the empty cell");
        let index = id - 1;
        let col = index % self.columns;
        let row = index / self.columns;
        let size = self.tile_size as f32;
        Rect::new(col as f32 * size, row as f32 * size, size, size)
    }

    pub fn tile_subtexture(&self, id: u32) -> Subtexture {
        Subtexture::new(self.texture, self.tile_rect(id))
    }
}

#[derive(Debug, Clone)]
pub struct MapObject {
    pub position: IVec2,
    pub kind: String,
}

/// Everything a tile map component needs to build itself: layout, layers
/// and spawn points. Layers are row-major, `columns * rows` long, 1-based
/// tile ids with 0 meaning empty.
#[derive(Debug, Clone)]
pub struct MapInfo {
    pub name: String,
    pub rect: RectI,
    pub columns: u32,
    pub rows: u32,
    pub tile_size: u32,
    pub tileset: Tileset,
    pub solid: Vec<u32>,
    pub background: Vec<u32>,
    pub objects: Vec<MapObject>,
}

#[derive(Debug, Clone, Default)]
pub struct Content {
    textures: HashMap<String, Texture>,
    sprites: HashMap<String, Sprite>,
    maps: Vec<MapInfo>,
}

impl Content {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Self::from_manifest(&Manifest::from_json(json)?)
    }

    pub fn from_manifest(manifest: &Manifest) -> Result<Self, ContentError> {
        let mut textures = HashMap::new();
        for (index, atlas) in manifest.atlases.iter().enumerate() {
            textures.insert(
                atlas.name.clone(),
                Texture::new(TextureId(index as u32), atlas.width, atlas.height),
            );
        }

        let mut sprites = HashMap::new();
        for (name, desc) in &manifest.sprites {
            let texture = *textures.get(&desc.atlas).ok_or_else(|| {
                ContentError::UnknownAtlas {
                    owner: name.clone(),
                    atlas: desc.atlas.clone(),
                }
            })?;
            let mut animations = HashMap::new();
            for (anim_name, frames) in &desc.animations {
                let frames = frames
                    .iter()
                    .map(|f| AnimationFrame {
                        subtexture: Subtexture::new(
                            texture,
                            Rect::new(f.rect[0], f.rect[1], f.rect[2], f.rect[3]),
                        ),
                        duration_ms: f.duration_ms,
                    })
                    .collect();
                animations.insert(anim_name.clone(), Animation { frames });
            }
            sprites.insert(
                name.clone(),
                Sprite {
                    pivot: Vec2::new(desc.pivot[0], desc.pivot[1]),
                    animations,
                },
            );
        }

        let mut maps = Vec::with_capacity(manifest.maps.len());
        for desc in &manifest.maps {
            let texture = *textures.get(&desc.tileset.atlas).ok_or_else(|| {
                ContentError::UnknownAtlas {
                    owner: desc.name.clone(),
                    atlas: desc.tileset.atlas.clone(),
                }
            })?;
            let expected = (desc.columns * desc.rows) as usize;
            if desc.solid.len() != expected {
                return Err(ContentError::BadLayerLength {
                    map: desc.name.clone(),
                    layer: "solid",
                    got: desc.solid.len(),
                    expected,
                });
            }
            if !desc.background.is_empty() && desc.background.len() != expected {
                return Err(ContentError::BadLayerLength {
                    map: desc.name.clone(),
                    layer: "background",
                    got: desc.background.len(),
                    expected,
                });
            }
            maps.push(MapInfo {
                name: desc.name.clone(),
                rect: RectI::new(desc.rect[0], desc.rect[1], desc.rect[2], desc.rect[3]),
                columns: desc.columns,
                rows: desc.rows,
                tile_size: desc.tile_size,
                tileset: Tileset {
                    texture,
                    columns: desc.tileset.columns,
                    tile_size: desc.tile_size,
                },
                solid: desc.solid.clone(),
                background: desc.background.clone(),
                objects: desc
                    .objects
                    .iter()
                    .map(|o| MapObject {
                        position: IVec2::new(o.x, o.y),
                        kind: o.kind.clone(),
                    })
                    .collect(),
            });
        }

        log::info!(
            "content loaded: {} atlases, {} sprites, {} maps",
            textures.len(),
            sprites.len(),
            maps.len()
        );
        Ok(Self {
            textures,
            sprites,
            maps,
        })
    }

    pub fn find_sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.get(name)
    }

    /// The first map whose world rect contains `position`.
    pub fn find_map_info(&self, position: IVec2) -> Option<&MapInfo> {
        self.maps.iter().find(|m| m.rect.contains(position))
    }

    pub fn maps(&self) -> &[MapInfo] {
        &self.maps
    }

    pub fn texture(&self, atlas: &str) -> Option<Texture> {
        self.textures.get(atlas).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "atlases": [
            { "name": "sheet", "width": 128, "height": 128 },
            { "name": "tiles", "width": 64, "height": 64 }
        ],
        "sprites": {
            "bird": {
                "atlas": "sheet",
                "pivot": [8, 8],
                "animations": {
                    "fly": [
                        { "rect": [0, 0, 16, 16], "duration_ms": 50 },
                        { "rect": [16, 0, 16, 16], "duration_ms": 50 }
                    ]
                }
            }
        },
        "maps": [{
            "name": "start",
            "rect": [0, 0, 32, 32],
            "columns": 2,
            "rows": 2,
            "tile_size": 16,
            "tileset": { "atlas": "tiles", "columns": 4 },
            "solid": [0, 0, 1, 2]
        }]
    }"#;

    #[test]
    fn resolves_sprites_and_maps() {
        let content = Content::from_json(MANIFEST).unwrap();

        let bird = content.find_sprite("bird").unwrap();
        assert_eq!(bird.pivot, Vec2::new(8.0, 8.0));
        let fly = bird.animation("fly").unwrap();
        assert_eq!(fly.frames.len(), 2);
        assert_eq!(fly.duration_ms(), 100.0);
        assert_eq!(fly.frames[1].subtexture.rect, Rect::new(16.0, 0.0, 16.0, 16.0));

        assert!(content.find_sprite("pipe").is_none());
        assert_eq!(content.maps().len(), 1);
    }

    #[test]
    fn map_lookup_is_positional() {
        let content = Content::from_json(MANIFEST).unwrap();
        assert_eq!(content.find_map_info(IVec2::new(10, 10)).unwrap().name, "start");
        assert!(content.find_map_info(IVec2::new(100, 100)).is_none());
    }

    #[test]
    fn tileset_places_one_based_ids() {
        let content = Content::from_json(MANIFEST).unwrap();
        let map = &content.maps()[0];
        assert_eq!(map.tileset.tile_rect(1), Rect::new(0.0, 0.0, 16.0, 16.0));
        assert_eq!(map.tileset.tile_rect(5), Rect::new(0.0, 16.0, 16.0, 16.0));
    }

    #[test]
    fn bad_layer_length_is_rejected() {
        let json = r#"{
            "atlases": [{ "name": "tiles", "width": 64, "height": 64 }],
            "maps": [{
                "name": "broken",
                "rect": [0, 0, 32, 32],
                "columns": 2,
                "rows": 2,
                "tile_size": 16,
                "tileset": { "atlas": "tiles", "columns": 4 },
                "solid": [1, 2, 3]
            }]
        }"#;
        let err = Content::from_json(json).unwrap_err();
        assert!(matches!(err, ContentError::BadLayerLength { .. }));
    }

    #[test]
    fn unknown_atlas_is_rejected() {
        let json = r#"{
            "atlases": [],
            "sprites": {
                "ghost": { "atlas": "nope", "animations": {} }
            }
        }"#;
        let err = Content::from_json(json).unwrap_err();
        assert!(matches!(err, ContentError::UnknownAtlas { .. }));
    }
}
