pub mod api;
pub mod config;
pub mod exporter;
pub mod procfs_reader;
pub mod sampler;
pub mod types;

pub use api::{AppState, router};
pub use config::Config;
pub use procfs_reader::StatReader;
pub use types::{CpuSnapshot, MemorySnapshot};
