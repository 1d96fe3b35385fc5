//! Single-flight fetch scheduling
//!
//! At most one fetch is outstanding. Requests that arrive while it is in
//! flight are folded into a single pending flag; when the fetch completes
//! the flag is cleared and one new fetch goes out for whatever the viewport
//! is *then*. The viewport of a deferred request is deliberately dropped.
//!
//! ```text
//!            request_fetch                    request_fetch
//!   Idle ───────────────────▶ Fetching ◀──────────────────┐
//!    ▲                          │  │ (sets refetch_pending) │
//!    │ completed, not pending   │  └────────────────────────┘
//!    └──────────────────────────┤
//!                               │ completed, pending
//!                               └──▶ Fetching (fresh viewport)
//! ```

use crate::core::viewport::Viewport;
use crate::traits::ViewportProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Fetching {
        refetch_pending: bool,
    },
}

/// Observable lifecycle flags. `refetch_pending` is only ever true while
/// `in_flight` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchState {
    pub in_flight: bool,
    pub refetch_pending: bool,
}

/// What the caller must do after a request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchDecision {
    /// Start a fetch for this viewport now
    Issue(Viewport),
    /// A fetch is already running; a re-fetch will follow it
    Deferred,
}

impl FetchDecision {
    pub fn viewport(&self) -> Option<&Viewport> {
        match self {
            Self::Issue(viewport) => Some(viewport),
            Self::Deferred => None,
        }
    }
}

/// Counters for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoalescerStats {
    /// Fetches handed to the caller, including chained re-fetches
    pub issued: u64,
    /// Requests absorbed while a fetch was in flight
    pub deferred: u64,
    /// Re-fetches fired on completion
    pub refetches: u64,
    pub completed: u64,
}

#[derive(Debug, Default)]
pub struct FetchCoalescer {
    phase: Phase,
    stats: CoalescerStats,
}

impl FetchCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks for a fetch of `viewport`.
    ///
    /// When idle the coalescer moves to fetching and returns
    /// [`FetchDecision::Issue`]; the caller must start exactly that fetch and
    /// later report it through [`FetchCoalescer::on_fetch_completed`].
    pub fn request_fetch(&mut self, viewport: Viewport) -> FetchDecision {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Fetching {
                    refetch_pending: false,
                };
                self.stats.issued += 1;
                log::debug!("issuing fetch #{} for {:?}", self.stats.issued, viewport.bounds);
                FetchDecision::Issue(viewport)
            }
            Phase::Fetching { .. } => {
                self.phase = Phase::Fetching {
                    refetch_pending: true,
                };
                self.stats.deferred += 1;
                log::trace!("fetch in flight, deferring request for {:?}", viewport.bounds);
                FetchDecision::Deferred
            }
        }
    }

    /// Records that the outstanding fetch finished, successfully or not.
    ///
    /// Returns the viewport of the chained re-fetch the caller must start,
    /// read from `viewport_provider` at this moment, if any request arrived
    /// while the fetch was running.
    pub fn on_fetch_completed<P>(&mut self, viewport_provider: &P) -> Option<Viewport>
    where
        P: ViewportProvider + ?Sized,
    {
        let refetch = match self.phase {
            Phase::Idle => {
                log::warn!("fetch completion reported while idle, ignoring");
                return None;
            }
            Phase::Fetching { refetch_pending } => refetch_pending,
        };

        self.phase = Phase::Idle;
        self.stats.completed += 1;

        if !refetch {
            log::debug!("fetch completed, coalescer idle");
            return None;
        }

        self.stats.refetches += 1;
        let viewport = viewport_provider.current_viewport();
        log::debug!("fetch completed with a pending request, re-fetching latest viewport");
        self.request_fetch(viewport).viewport().copied()
    }

    pub fn state(&self) -> FetchState {
        match self.phase {
            Phase::Idle => FetchState::default(),
            Phase::Fetching { refetch_pending } => FetchState {
                in_flight: true,
                refetch_pending,
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn stats(&self) -> CoalescerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn region(n: f64) -> Viewport {
        Viewport::from_coords(n, n, n + 1.0, n + 1.0)
    }

    #[test]
    fn test_idle_request_issues_immediately() {
        let mut coalescer = FetchCoalescer::new();
        assert!(coalescer.is_idle());

        assert_eq!(coalescer.request_fetch(region(1.0)), FetchDecision::Issue(region(1.0)));
        assert_eq!(
            coalescer.state(),
            FetchState {
                in_flight: true,
                refetch_pending: false
            }
        );
    }

    #[test]
    fn test_requests_while_fetching_are_deferred() {
        let mut coalescer = FetchCoalescer::new();
        coalescer.request_fetch(region(1.0));

        for n in 2..10 {
            assert_eq!(coalescer.request_fetch(region(n as f64)), FetchDecision::Deferred);
        }
        assert_eq!(
            coalescer.state(),
            FetchState {
                in_flight: true,
                refetch_pending: true
            }
        );
        assert_eq!(coalescer.stats().issued, 1);
        assert_eq!(coalescer.stats().deferred, 8);
    }

    #[test]
    fn test_completion_without_pending_goes_idle() {
        let mut coalescer = FetchCoalescer::new();
        coalescer.request_fetch(region(1.0));

        assert_eq!(coalescer.on_fetch_completed(&|| region(99.0)), None);
        assert!(coalescer.is_idle());
        assert_eq!(coalescer.state(), FetchState::default());
    }

    #[test]
    fn test_many_deferred_requests_chain_one_refetch_for_latest_viewport() {
        let mut coalescer = FetchCoalescer::new();
        let live = Cell::new(region(1.0));
        let provider = || live.get();

        coalescer.request_fetch(live.get());
        for n in 2..=5 {
            live.set(region(n as f64));
            coalescer.request_fetch(live.get());
        }
        // Viewport moves again after the last request
        live.set(region(42.0));

        let refetch = coalescer.on_fetch_completed(&provider);
        assert_eq!(refetch, Some(region(42.0)));
        assert_eq!(
            coalescer.state(),
            FetchState {
                in_flight: true,
                refetch_pending: false
            }
        );

        // The chained fetch settles with nothing further
        assert_eq!(coalescer.on_fetch_completed(&provider), None);
        assert!(coalescer.is_idle());

        let stats = coalescer.stats();
        assert_eq!(stats.issued, 2);
        assert_eq!(stats.refetches, 1);
        assert_eq!(stats.completed, 2);
    }

    #[test]
    fn test_spurious_completion_is_ignored() {
        let mut coalescer = FetchCoalescer::new();
        assert_eq!(coalescer.on_fetch_completed(&|| region(1.0)), None);
        assert!(coalescer.is_idle());
        assert_eq!(coalescer.stats().completed, 0);
    }

    #[test]
    fn test_pending_flag_cleared_once_per_completion() {
        let mut coalescer = FetchCoalescer::new();
        coalescer.request_fetch(region(1.0));
        coalescer.request_fetch(region(2.0));

        assert!(coalescer.on_fetch_completed(&|| region(3.0)).is_some());
        assert!(!coalescer.state().refetch_pending);

        coalescer.request_fetch(region(4.0));
        assert!(coalescer.state().refetch_pending);
        assert_eq!(coalescer.on_fetch_completed(&|| region(5.0)), Some(region(5.0)));
        assert_eq!(coalescer.on_fetch_completed(&|| region(6.0)), None);
    }
}
