//! # quakemap
//!
//! Keeps a map's earthquake markers in step with the visible region.
//!
//! Every viewport change asks for a fresh batch of quakes. Fetches are
//! single-flight: requests made while one is outstanding collapse into one
//! trailing re-fetch for whatever the viewport is when the first completes.
//! Completed batches are ranked by magnitude, truncated, and reconciled
//! against the markers already on screen so the renderer only ever sees an
//! add/remove delta.

pub mod core;
pub mod data;
pub mod fetch;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod sync;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{FeedConfig, QuakeMapConfig, SyncConfig},
    geo::{LatLng, LatLngBounds},
    viewport::{SharedViewport, Viewport},
};

pub use data::quake::{Quake, QuakeId};

pub use fetch::{loader::QuakeLoader, source::{QuakeSource, UsgsSource}};

pub use layers::{
    manager::MarkerLayer,
    marker::{display_priority, MagnitudeTier, QuakeMarker},
};

pub use sync::{
    coalescer::{CoalescerStats, FetchCoalescer, FetchDecision, FetchState},
    controller::SyncController,
    ranker::rank,
    reconcile::{diff, SetDelta},
};

pub use traits::{EntityRenderer, FetchService, ViewportProvider};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum QuakeMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Error type alias for convenience
pub type Error = QuakeMapError;
