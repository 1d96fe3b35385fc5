use crate::core::geo::{LatLng, LatLngBounds};
use crate::prelude::{Arc, RwLock};
use crate::traits::ViewportProvider;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The visible region of the map as an axis-aligned bounding box.
///
/// The map widget owns and mutates the live viewport; the sync engine only
/// ever reads copies of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The visible region in geographical coordinates
    pub bounds: LatLngBounds,
}

impl Viewport {
    /// Creates a new viewport covering `bounds`
    pub fn new(bounds: LatLngBounds) -> Self {
        Self { bounds }
    }

    /// Creates a viewport from its south, west, north and east edges
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLngBounds::from_coords(south, west, north, east))
    }

    /// Creates a viewport centred on `center` spanning `lat_span` x `lng_span` degrees
    pub fn from_center(center: LatLng, lat_span: f64, lng_span: f64) -> Self {
        let half_lat = lat_span.abs() / 2.0;
        let half_lng = lng_span.abs() / 2.0;
        Self::from_coords(
            LatLng::clamp_lat(center.lat - half_lat),
            center.lng - half_lng,
            LatLng::clamp_lat(center.lat + half_lat),
            center.lng + half_lng,
        )
    }

    /// The whole world
    pub fn world() -> Self {
        Self::from_coords(-90.0, -180.0, 90.0, 180.0)
    }

    pub fn center(&self) -> LatLng {
        self.bounds.center()
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        self.bounds.contains(point)
    }

    pub fn intersects(&self, other: &Viewport) -> bool {
        self.bounds.intersects(&other.bounds)
    }

    /// Returns a copy shifted by the given number of degrees.
    ///
    /// Latitude is clamped at the poles; longitude is left unwrapped so a
    /// region can extend past the antimeridian.
    pub fn pan(&self, delta_lat: f64, delta_lng: f64) -> Self {
        let b = &self.bounds;
        Self::from_coords(
            LatLng::clamp_lat(b.south() + delta_lat),
            b.west() + delta_lng,
            LatLng::clamp_lat(b.north() + delta_lat),
            b.east() + delta_lng,
        )
    }

    /// Returns a copy with the span multiplied by `factor` around the same centre.
    /// A factor below 1.0 zooms in.
    pub fn scale(&self, factor: f64) -> Self {
        let span = self.bounds.span();
        Self::from_center(self.center(), span.lat * factor, span.lng * factor)
    }

    /// Checks the edges are ordered and the latitudes are on the globe
    pub fn validate(&self) -> Result<()> {
        let b = &self.bounds;
        let finite = [b.south(), b.west(), b.north(), b.east()]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidViewport(format!("non-finite edge in {:?}", b)).into());
        }
        if b.south() > b.north() || b.west() > b.east() {
            return Err(Error::InvalidViewport(format!(
                "edges out of order: south {} north {} west {} east {}",
                b.south(),
                b.north(),
                b.west(),
                b.east()
            ))
            .into());
        }
        if b.south() < -90.0 || b.north() > 90.0 {
            return Err(
                Error::InvalidViewport(format!("latitude outside [-90, 90] in {:?}", b)).into(),
            );
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::world()
    }
}

/// The live viewport, shared between the map widget that mutates it and the
/// sync engine that reads it when replaying a deferred fetch.
#[derive(Debug, Clone, Default)]
pub struct SharedViewport {
    inner: Arc<RwLock<Viewport>>,
}

impl SharedViewport {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            inner: Arc::new(RwLock::new(viewport)),
        }
    }

    pub fn get(&self) -> Viewport {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, viewport: Viewport) {
        match self.inner.write() {
            Ok(mut guard) => *guard = viewport,
            Err(poisoned) => *poisoned.into_inner() = viewport,
        }
    }

    /// Pans the live viewport and returns the new value
    pub fn pan(&self, delta_lat: f64, delta_lng: f64) -> Viewport {
        let next = self.get().pan(delta_lat, delta_lng);
        self.set(next);
        next
    }
}

impl ViewportProvider for SharedViewport {
    fn current_viewport(&self) -> Viewport {
        self.get()
    }
}
