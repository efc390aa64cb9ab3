//! Report module - text, CSV and JSON outputs of an analysis run

pub mod emitter;
pub mod export;
pub mod summary;
pub mod tables;

pub use emitter::*;
pub use export::*;
pub use summary::*;
pub use tables::*;
