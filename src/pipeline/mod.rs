//! Pipeline module - ingestion, normalization and segment analysis

pub mod analysis;
pub mod binning;
pub mod config;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod loss;
pub mod missing;
pub mod plan;
pub mod record;
pub mod segment;
pub mod stats;

pub use analysis::*;
pub use binning::*;
pub use config::*;
pub use error::*;
pub use ingest::*;
pub use loader::*;
pub use loss::*;
pub use missing::*;
pub use plan::*;
pub use record::*;
pub use segment::*;
pub use stats::*;
