//! Content manifest describing atlases, sprites and maps for a game.
//! Loaded from JSON at startup and resolved into a
//! [`Content`](crate::assets::Content) store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Texture atlases, referenced by name from sprites and tilesets.
    pub atlases: Vec<AtlasDescriptor>,
    /// Named sprites with their animations.
    #[serde(default)]
    pub sprites: HashMap<String, SpriteDescriptor>,
    /// Tile maps.
    #[serde(default)]
    pub maps: Vec<MapDescriptor>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A packed texture the render device has already created; the manifest
/// carries its dimensions so UV math never needs the pixel data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Relative path to the image file (decoded by the platform layer).
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Name of the atlas holding this sprite's frames.
    pub atlas: String,
    /// Pivot point in frame pixels, shared by all animations.
    #[serde(default)]
    pub pivot: [f32; 2],
    /// Animation name to frame list.
    pub animations: HashMap<String, Vec<FrameDescriptor>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Pixel rect `[x, y, w, h]` inside the atlas.
    pub rect: [f32; 4],
    #[serde(default = "default_duration")]
    pub duration_ms: f32,
}

fn default_duration() -> f32 {
    100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub name: String,
    /// Pixel rect `[x, y, w, h]` the map occupies in world space.
    pub rect: [i32; 4],
    pub columns: u32,
    pub rows: u32,
    pub tile_size: u32,
    pub tileset: TilesetDescriptor,
    /// Row-major tile ids, 1-based into the tileset; 0 = empty.
    /// Cells in this layer are also solid for collision.
    pub solid: Vec<u32>,
    /// Optional decorative layer behind the solid one, same shape.
    #[serde(default)]
    pub background: Vec<u32>,
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilesetDescriptor {
    /// Atlas the tiles are packed in.
    pub atlas: String,
    /// Tiles per atlas row, used to place a tile id in the atlas grid.
    pub columns: u32,
}

/// A typed spawn point placed in a map's object layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub x: i32,
    pub y: i32,
    pub kind: String,
}
