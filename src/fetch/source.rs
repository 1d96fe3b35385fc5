use crate::core::{config::FeedConfig, viewport::Viewport};
use crate::{Error, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Url;

/// Anything that can produce a quake query URL for a region.
pub trait QuakeSource: Send + Sync {
    /// Build the request URL for `region` as of `now`.
    fn query_url(&self, region: &Viewport, now: DateTime<Utc>) -> Result<Url>;
}

/// The USGS FDSN event service.
#[derive(Debug, Clone)]
pub struct UsgsSource {
    config: FeedConfig,
}

impl UsgsSource {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Query parameters for `region` over the look-back window ending at `now`.
    ///
    /// Fails when the window reaches outside the representable date range.
    pub fn query_params(
        &self,
        region: &Viewport,
        now: DateTime<Utc>,
    ) -> Result<Vec<(&'static str, String)>> {
        let lookback = self.config.lookback_days;
        let start = Duration::try_days(lookback)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| Error::Config(format!("look-back of {} days is out of range", lookback)))?;
        let bounds = &region.bounds;

        let mut params = vec![
            ("format", "geojson".to_string()),
            ("starttime", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("endtime", now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("minlatitude", bounds.south().to_string()),
            ("maxlatitude", bounds.north().to_string()),
            ("minlongitude", bounds.west().to_string()),
            ("maxlongitude", bounds.east().to_string()),
        ];
        if let Some(min) = self.config.min_magnitude {
            params.push(("minmagnitude", min.to_string()));
        }
        Ok(params)
    }
}

impl Default for UsgsSource {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

impl QuakeSource for UsgsSource {
    fn query_url(&self, region: &Viewport, now: DateTime<Utc>) -> Result<Url> {
        region.validate()?;
        let params = self.query_params(region, now)?;
        Url::parse_with_params(&self.config.base_url, &params).map_err(|e| {
            Error::Config(format!("invalid feed base URL {:?}: {}", self.config.base_url, e)).into()
        })
    }
}
