//! ReelCaption Core Engine
//!
//! Word timings flow strictly left to right through the stages below:
//! captions (segmentation) → render (layout) → transitions (timing envelopes).

pub mod captions;
pub mod fs;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod text;
pub mod transitions;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
