use crate::core::constants::{
    DEFAULT_HIGH_DISPLAY_PRIORITY, DEFAULT_LOW_DISPLAY_PRIORITY, PRIORITY_MAGNITUDE_RANGE,
};
use crate::core::geo::LatLng;
use crate::data::quake::{Quake, QuakeId};
use serde::{Deserialize, Serialize};

/// Colour band a quake's marker is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeTier {
    /// Below 3
    Low,
    /// 3 up to 5
    Medium,
    /// 5 up to 7
    High,
    /// 7 and above
    Extreme,
    /// Negative or NaN magnitudes
    Unknown,
}

impl MagnitudeTier {
    pub fn from_magnitude(magnitude: f64) -> Self {
        match magnitude {
            m if (0.0..3.0).contains(&m) => Self::Low,
            m if (3.0..5.0).contains(&m) => Self::Medium,
            m if (5.0..7.0).contains(&m) => Self::High,
            m if m >= 7.0 => Self::Extreme,
            _ => Self::Unknown,
        }
    }

    /// Marker tint as a CSS hex colour
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#ffcc00",
            Self::Medium => "#ff9500",
            Self::High => "#ff3b30",
            Self::Extreme => "#af52de",
            Self::Unknown => "#8e8e93",
        }
    }
}

/// Linear priority between `low` and `high` for a magnitude clamped to 0–10.
/// A NaN magnitude gets `low`.
pub fn display_priority(magnitude: f64, low: f64, high: f64) -> f64 {
    let (min, max) = PRIORITY_MAGNITUDE_RANGE;
    let normalized = if magnitude.is_nan() {
        min
    } else {
        magnitude.clamp(min, max)
    };
    low + (high - low) * (normalized - min) / (max - min)
}

/// A quake as drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuakeMarker {
    quake: Quake,
    pub tier: MagnitudeTier,
    pub priority: f64,
    pub popup_text: Option<String>,
}

impl QuakeMarker {
    pub fn new(quake: Quake) -> Self {
        Self::with_priority_bounds(quake, DEFAULT_LOW_DISPLAY_PRIORITY, DEFAULT_HIGH_DISPLAY_PRIORITY)
    }

    pub fn with_priority_bounds(quake: Quake, low: f64, high: f64) -> Self {
        let tier = MagnitudeTier::from_magnitude(quake.magnitude);
        let priority = display_priority(quake.magnitude, low, high);
        let popup_text = quake
            .place
            .as_ref()
            .map(|place| format!("M {:.1} - {}", quake.magnitude, place));
        Self {
            quake,
            tier,
            priority,
            popup_text,
        }
    }

    pub fn id(&self) -> &QuakeId {
        self.quake.id()
    }

    pub fn quake(&self) -> &Quake {
        &self.quake
    }

    pub fn position(&self) -> LatLng {
        self.quake.position
    }

    pub fn color(&self) -> &'static str {
        self.tier.color()
    }
}
