//! NWS hazard map service library.
//!
//! Exposes the pipeline stages so integration tests can drive them
//! without the network.

pub mod config;
pub mod fetch;
pub mod layers;
pub mod run;

pub use config::AppConfig;
pub use fetch::{extract, ArchiveFetcher};
pub use layers::LayerStore;
pub use run::{run, MapRun, RunSummary};
