use crate::core::geo::LatLng;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Feed-assigned event id, e.g. `"ci40011567"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuakeId(String);

impl QuakeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuakeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for QuakeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A seismic event snapshot as delivered by one fetch.
///
/// Two quakes are equal when their ids are equal, whatever the other fields
/// say. A re-fetched event whose magnitude was revised is still the same
/// marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quake {
    id: QuakeId,
    pub magnitude: f64,
    pub position: LatLng,
    pub depth_km: Option<f64>,
    pub place: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

impl Quake {
    pub fn new(id: impl Into<QuakeId>, magnitude: f64, position: LatLng) -> Self {
        Self {
            id: id.into(),
            magnitude,
            position,
            depth_km: None,
            place: None,
            time: None,
        }
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    pub fn with_depth(mut self, depth_km: f64) -> Self {
        self.depth_km = Some(depth_km);
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn id(&self) -> &QuakeId {
        &self.id
    }
}

impl PartialEq for Quake {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Quake {}

impl Hash for Quake {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxhash::FxHashSet;

    #[test]
    fn test_identity_equality() {
        let original = Quake::new("us1", 4.2, LatLng::new(10.0, 20.0));
        let revised = Quake::new("us1", 4.6, LatLng::new(10.1, 20.1)).with_place("revised");
        let other = Quake::new("us2", 4.2, LatLng::new(10.0, 20.0));

        assert_eq!(original, revised);
        assert_ne!(original, other);
    }

    #[test]
    fn test_identity_hashing() {
        let mut set = FxHashSet::default();
        set.insert(Quake::new("us1", 1.0, LatLng::default()));
        assert!(!set.insert(Quake::new("us1", 9.0, LatLng::default())));
        assert!(set.insert(Quake::new("us2", 1.0, LatLng::default())));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_builders() {
        let time = DateTime::<Utc>::from_timestamp_millis(1_570_000_000_000).unwrap();
        let quake = Quake::new("nc1", 3.1, LatLng::new(37.0, -122.0))
            .with_place("5km N of Somewhere, CA")
            .with_depth(8.5)
            .with_time(time);

        assert_eq!(quake.id().as_str(), "nc1");
        assert_eq!(quake.place.as_deref(), Some("5km N of Somewhere, CA"));
        assert_eq!(quake.depth_km, Some(8.5));
        assert_eq!(quake.time, Some(time));
    }
}
