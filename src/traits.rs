//! Seams between the sync engine and the rest of the application
//!
//! The engine never talks to the network, the map widget or the marker
//! renderer directly. It goes through these three traits so each side can be
//! swapped out or faked in tests.

use crate::{core::viewport::Viewport, data::quake::Quake, Result};
use async_trait::async_trait;

/// Produces the quakes inside a region.
///
/// `Ok(None)` means the service answered but had nothing usable to say; the
/// engine treats it the same as an empty batch. `Err` is a fetch failure and
/// leaves the markers on screen untouched.
#[async_trait]
pub trait FetchService: Send + Sync {
    async fn fetch(&self, region: &Viewport) -> Result<Option<Vec<Quake>>>;
}

/// Synchronous read of the live, externally mutated viewport
pub trait ViewportProvider {
    fn current_viewport(&self) -> Viewport;
}

impl<F> ViewportProvider for F
where
    F: Fn() -> Viewport,
{
    fn current_viewport(&self) -> Viewport {
        self()
    }
}

/// Applies marker deltas. Both calls are bulk operations and may receive an
/// empty slice.
pub trait EntityRenderer {
    fn add_entities(&mut self, entities: &[Quake]);

    fn remove_entities(&mut self, entities: &[Quake]);
}

impl<R: EntityRenderer + ?Sized> EntityRenderer for Box<R> {
    fn add_entities(&mut self, entities: &[Quake]) {
        (**self).add_entities(entities)
    }

    fn remove_entities(&mut self, entities: &[Quake]) {
        (**self).remove_entities(entities)
    }
}
