pub mod annotation;
pub mod association;
pub mod cache;
pub mod compliance;
pub mod config;
pub mod detection;
pub mod metrics;
pub mod pipeline;
pub mod replay;
pub mod summary;
pub mod zones;

// Re-export the error type so callers only need `zoneguard_core::Error`
pub use anyhow::Error;
pub use anyhow::Result;
