use super::marker::QuakeMarker;
use crate::core::constants::{DEFAULT_HIGH_DISPLAY_PRIORITY, DEFAULT_LOW_DISPLAY_PRIORITY};
use crate::core::viewport::Viewport;
use crate::data::quake::{Quake, QuakeId};
use crate::prelude::HashMap;
use crate::traits::EntityRenderer;

/// In-memory marker layer that applies sync deltas.
///
/// Markers are keyed by quake id; adding an id that is already present
/// leaves the existing marker in place.
pub struct MarkerLayer {
    markers: HashMap<QuakeId, QuakeMarker>,
    priority_bounds: (f64, f64),
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::with_priority_bounds(DEFAULT_LOW_DISPLAY_PRIORITY, DEFAULT_HIGH_DISPLAY_PRIORITY)
    }

    pub fn with_priority_bounds(low: f64, high: f64) -> Self {
        Self {
            markers: HashMap::default(),
            priority_bounds: (low, high),
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, id: &QuakeId) -> bool {
        self.markers.contains_key(id)
    }

    pub fn get(&self, id: &QuakeId) -> Option<&QuakeMarker> {
        self.markers.get(id)
    }

    /// All markers, highest display priority first. Equal priorities are
    /// ordered by id so the result is stable.
    pub fn markers_by_priority(&self) -> Vec<&QuakeMarker> {
        let mut markers: Vec<&QuakeMarker> = self.markers.values().collect();
        markers.sort_by(|a, b| {
            b.priority
                .total_cmp(&a.priority)
                .then_with(|| a.id().cmp(b.id()))
        });
        markers
    }

    /// Markers whose position lies inside `viewport`
    pub fn visible_in(&self, viewport: &Viewport) -> Vec<&QuakeMarker> {
        self.markers_by_priority()
            .into_iter()
            .filter(|m| viewport.contains(&m.position()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

impl Default for MarkerLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRenderer for MarkerLayer {
    fn add_entities(&mut self, entities: &[Quake]) {
        let (low, high) = self.priority_bounds;
        for quake in entities {
            self.markers
                .entry(quake.id().clone())
                .or_insert_with(|| QuakeMarker::with_priority_bounds(quake.clone(), low, high));
        }
        log::trace!("marker layer now holds {} markers", self.markers.len());
    }

    fn remove_entities(&mut self, entities: &[Quake]) {
        for quake in entities {
            self.markers.remove(quake.id());
        }
    }
}
