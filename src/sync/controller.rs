use super::{
    coalescer::{CoalescerStats, FetchCoalescer, FetchDecision, FetchState},
    ranker::rank,
    reconcile::{diff, SetDelta},
};
use crate::core::{config::SyncConfig, viewport::Viewport};
use crate::data::quake::Quake;
use crate::prelude::Arc;
use crate::runtime::{self, AsyncHandle, AsyncSpawner};
use crate::traits::{EntityRenderer, FetchService, ViewportProvider};
use crate::{Error, Result};
use std::any::Any;
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Result of one fetch as delivered back to the controller's thread
pub type FetchOutcome = Result<Option<Vec<Quake>>>;

/// Drives the fetch → rank → reconcile → render pipeline.
///
/// All state lives on the thread that owns the controller. Fetches run on the
/// spawner and post their outcome to a channel that [`SyncController::poll`]
/// drains, so call `poll` once per frame (or whenever convenient) and feed
/// viewport changes through [`SyncController::on_viewport_changed`].
pub struct SyncController<V, R>
where
    V: ViewportProvider,
    R: EntityRenderer,
{
    config: SyncConfig,
    coalescer: FetchCoalescer,
    display_set: Vec<Quake>,
    fetch_service: Arc<dyn FetchService>,
    viewport_provider: V,
    renderer: R,
    spawner: Arc<dyn AsyncSpawner>,
    result_tx: Sender<FetchOutcome>,
    result_rx: Receiver<FetchOutcome>,
    in_flight: Option<Box<dyn AsyncHandle>>,
}

impl<V, R> SyncController<V, R>
where
    V: ViewportProvider,
    R: EntityRenderer,
{
    /// Creates a controller that spawns fetches on the global runtime
    pub fn new(
        config: SyncConfig,
        fetch_service: Arc<dyn FetchService>,
        viewport_provider: V,
        renderer: R,
    ) -> Self {
        Self::with_spawner(
            config,
            fetch_service,
            viewport_provider,
            renderer,
            runtime::runtime(),
        )
    }

    pub fn with_spawner(
        config: SyncConfig,
        fetch_service: Arc<dyn FetchService>,
        viewport_provider: V,
        renderer: R,
        spawner: Arc<dyn AsyncSpawner>,
    ) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            config,
            coalescer: FetchCoalescer::new(),
            display_set: Vec::new(),
            fetch_service,
            viewport_provider,
            renderer,
            spawner,
            result_tx,
            result_rx,
            in_flight: None,
        }
    }

    /// Requests a fetch for the provider's current viewport, e.g. on first load
    pub fn refresh(&mut self) -> FetchDecision {
        let viewport = self.viewport_provider.current_viewport();
        self.on_viewport_changed(viewport)
    }

    /// Call whenever the visible region changes
    pub fn on_viewport_changed(&mut self, viewport: Viewport) -> FetchDecision {
        let decision = self.coalescer.request_fetch(viewport);
        if let FetchDecision::Issue(region) = decision {
            self.dispatch(region);
        }
        decision
    }

    /// Handles every fetch outcome that has arrived since the last call.
    /// Returns how many were drained.
    pub fn poll(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(outcome) = self.result_rx.try_recv() {
            self.on_fetch_result(outcome);
            drained += 1;
        }
        drained
    }

    /// Handles the completion of the outstanding fetch.
    ///
    /// The coalescer is told first, so a pending re-fetch is issued whatever
    /// the outcome. A failed fetch is logged and leaves the markers alone;
    /// a successful one (absent results count as an empty batch) is ranked,
    /// reconciled against the display set, and applied to the renderer.
    /// Returns the applied delta, or `None` after a failure.
    ///
    /// An outcome that arrives with no fetch outstanding is logged and
    /// dropped, so each fetch is applied at most once.
    pub fn on_fetch_result(&mut self, outcome: FetchOutcome) -> Option<SetDelta> {
        if self.coalescer.is_idle() {
            log::warn!("fetch result arrived with no fetch outstanding, ignoring");
            return None;
        }
        self.in_flight = None;
        if let Some(region) = self.coalescer.on_fetch_completed(&self.viewport_provider) {
            self.dispatch(region);
        }

        let quakes = match outcome {
            Ok(quakes) => quakes.unwrap_or_default(),
            Err(e) => {
                log::error!("Error fetching quakes: {}", e);
                return None;
            }
        };

        Some(self.commit(quakes))
    }

    fn commit(&mut self, quakes: Vec<Quake>) -> SetDelta {
        let fetched = quakes.len();
        let ranked = rank(quakes, self.config.max_displayed_entities);
        let delta = diff(&self.display_set, &ranked);

        if !delta.removed.is_empty() {
            self.renderer.remove_entities(&delta.removed);
        }
        if !delta.added.is_empty() {
            self.renderer.add_entities(&delta.added);
        }
        log::debug!(
            "committed {} of {} fetched quakes (+{} -{})",
            ranked.len(),
            fetched,
            delta.added.len(),
            delta.removed.len()
        );

        self.display_set = ranked;
        delta
    }

    fn dispatch(&mut self, region: Viewport) {
        let service = self.fetch_service.clone();
        let tx = self.result_tx.clone();
        let handle = self.spawner.spawn_boxed(Box::pin(async move {
            // Every dispatched fetch reports exactly one outcome, panics included
            let outcome = match AssertUnwindSafe(service.fetch(&region)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => Err(Error::Fetch(panic_message(panic.as_ref())).into()),
            };
            // The controller may be gone by now
            let _ = tx.send(outcome);
        }));
        self.in_flight = Some(handle);
    }

    /// Markers currently on screen, strongest first
    pub fn display_set(&self) -> &[Quake] {
        &self.display_set
    }

    pub fn fetch_state(&self) -> FetchState {
        self.coalescer.state()
    }

    /// True when no fetch is outstanding and no outcome is waiting to be polled
    pub fn is_settled(&self) -> bool {
        self.coalescer.is_idle() && self.result_rx.is_empty()
    }

    pub fn stats(&self) -> CoalescerStats {
        self.coalescer.stats()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn viewport_provider(&self) -> &V {
        &self.viewport_provider
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("fetch task panicked: {}", detail)
}

impl<V, R> Drop for SyncController<V, R>
where
    V: ViewportProvider,
    R: EntityRenderer,
{
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                log::debug!("controller dropped with a fetch in flight, cancelling");
                handle.cancel();
            }
        }
    }
}
