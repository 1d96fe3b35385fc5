//! Prelude module for common quakemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use quakemap::prelude::*;`

pub use crate::core::{
    config::{FeedConfig, QuakeMapConfig, SyncConfig},
    geo::{LatLng, LatLngBounds},
    viewport::{SharedViewport, Viewport},
};

pub use crate::data::quake::{Quake, QuakeId};

pub use crate::fetch::{
    loader::QuakeLoader,
    source::{QuakeSource, UsgsSource},
};

pub use crate::layers::{
    manager::MarkerLayer,
    marker::{display_priority, MagnitudeTier, QuakeMarker},
};

pub use crate::sync::{
    coalescer::{CoalescerStats, FetchCoalescer, FetchDecision, FetchState},
    controller::SyncController,
    ranker::rank,
    reconcile::{diff, SetDelta},
};

pub use crate::traits::{EntityRenderer, FetchService, ViewportProvider};

pub use crate::runtime::{init_runtime, runtime, AsyncHandle, AsyncSpawner};

pub use crate::{Error as QuakeMapError, Result};

pub use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
