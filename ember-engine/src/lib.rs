pub mod compiler;
pub mod driver;
pub mod error;
pub mod lua_glue;
pub mod media;
pub mod preload;

pub use compiler::{Chunk, compile};
pub use driver::{StoryDriver, StoryOption, StoryUnit, Tags};
pub use error::{EngineError, EngineResult};
pub use media::MediaLibrary;
pub use preload::{AssetLoader, AssetState, CachedAsset, FsAssetLoader, PreloadCache, preload};
