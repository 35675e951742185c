pub mod cluster;
pub mod config;
pub mod ctr;
pub mod error;
pub mod export;
pub mod filters;
pub mod ingest;
pub mod io;
pub mod paths;
pub mod pipeline;
pub mod planner;
pub mod rules;
pub mod segments;
pub mod summary;
pub mod taxonomy;
pub mod types;

pub use error::{KwError, Result};
