//! Cut-list layout engine: packs rectangular panel pieces onto fixed-size
//! stock sheets and reports cut counts and edge-banding totals.

pub mod config;
pub mod error;
pub mod free_rects;
pub mod metrics;
pub mod packer;
pub mod render;
pub mod solver;
pub mod strip;
pub mod types;

pub use config::{ItemOrder, Job, PackingConfig};
pub use error::ConfigError;
pub use solver::PackingOrchestrator;
pub use types::{PackingResult, PieceRequest};
