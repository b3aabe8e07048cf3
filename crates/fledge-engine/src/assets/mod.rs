pub mod content;
pub mod manifest;

pub use content::{
    Animation, AnimationFrame, Content, ContentError, MapInfo, MapObject, Sprite, Tileset,
};
pub use manifest::Manifest;
