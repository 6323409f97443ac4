pub mod batch;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod operations;
pub mod provider;

pub use error::{DespikeError, Result};
