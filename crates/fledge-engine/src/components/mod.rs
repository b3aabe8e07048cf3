pub mod camera;
pub mod collider;
pub mod hurtable;
pub mod kinetic;
pub mod sprite;
pub mod tilemap;
pub mod timer;

pub use camera::CameraComponent;
pub use collider::{Collider, Mask};
pub use hurtable::Hurtable;
pub use kinetic::Kinetic;
pub use sprite::SpriteComponent;
pub use tilemap::TileMapComponent;
pub use timer::{TimerAction, TimerComponent};
