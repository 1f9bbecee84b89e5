//! Engine error types.
//!
//! Only hard failures live here: the external compiler rejecting a script
//! and the VM faulting. Undecodable documents resolve to `None` on the
//! Decoder side, and individual asset failures become failed cache entries
//! in the preloader; neither surfaces as an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The external compiler rejected the script text.
    #[error("script compilation failed: {message}")]
    Compile { message: String },

    /// The VM faulted while loading a chunk or stepping the story. Fatal
    /// for the session; the driver instance must be discarded.
    #[error("script runtime fault: {message}")]
    Runtime { message: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
