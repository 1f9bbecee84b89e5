pub mod decode;
pub mod encode;
pub mod ids;
pub mod story;
pub mod tags;

pub use decode::decode;
pub use encode::{MediaResolver, Passthrough, encode};
pub use story::{Character, CharacterSprite, Line, SceneKind, SceneLine, Story, TextLine};
