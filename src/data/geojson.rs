//! Decoding of the USGS GeoJSON event feed
//!
//! The feed is a `FeatureCollection` whose features carry the magnitude and
//! time in `properties` and `[lng, lat, depth]` in a `Point` geometry.

use crate::core::geo::LatLng;
use crate::data::quake::Quake;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// GeoJSON geometry; only points are meaningful for a quake
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum FeedGeometry {
    Point {
        coordinates: Vec<f64>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    /// Milliseconds since the Unix epoch
    pub time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedFeature {
    pub id: Option<String>,
    #[serde(default)]
    pub properties: FeedProperties,
    pub geometry: Option<FeedGeometry>,
}

/// Root of the feed document. Features stay raw until [`QuakeFeed::into_quakes`]
/// so one badly typed feature cannot fail the whole document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuakeFeed {
    #[serde(default)]
    pub features: Option<Vec<serde_json::Value>>,
}

impl FeedFeature {
    /// Converts to a [`Quake`], or `None` if the feature has no id, no
    /// magnitude, or no usable point.
    pub fn to_quake(&self) -> Option<Quake> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let magnitude = self.properties.mag?;
        let (position, depth) = match self.geometry.as_ref()? {
            FeedGeometry::Point { coordinates } if coordinates.len() >= 2 => (
                LatLng::new(coordinates[1], coordinates[0]),
                coordinates.get(2).copied(),
            ),
            _ => return None,
        };

        let mut quake = Quake::new(id, magnitude, position);
        quake.depth_km = depth;
        quake.place = self.properties.place.clone();
        quake.time = self.properties.time.and_then(DateTime::<Utc>::from_timestamp_millis);
        Some(quake)
    }
}

impl QuakeFeed {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::ParseError(format!("Invalid quake feed: {}", e)).into())
    }

    /// Usable quakes in feed order, or `None` when the document has no
    /// `features` member at all.
    pub fn into_quakes(self) -> Option<Vec<Quake>> {
        let features = self.features?;
        let total = features.len();
        let quakes: Vec<Quake> = features
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<FeedFeature>(raw).ok())
            .filter_map(|feature| feature.to_quake())
            .collect();
        if quakes.len() < total {
            log::debug!("skipped {} malformed feed features", total - quakes.len());
        }
        Some(quakes)
    }
}

/// Decodes a response body. An empty body means the server had nothing to
/// report and yields `Ok(None)`.
pub fn parse_feed(body: &[u8]) -> Result<Option<Vec<Quake>>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(QuakeFeed::from_slice(body)?.into_quakes())
}
