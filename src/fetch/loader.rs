use super::source::{QuakeSource, UsgsSource};
use crate::core::{config::FeedConfig, viewport::Viewport};
use crate::data::{geojson::parse_feed, quake::Quake};
use crate::traits::FetchService;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;

/// Shared client for loaders built without a feed config. Building it once
/// avoids TLS and connection pool setup per loader.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    build_client(&FeedConfig::default()).expect("failed to build reqwest async client")
});

/// Fetches quakes over HTTP from a [`QuakeSource`].
///
/// Loaders built with [`QuakeLoader::new`] share one process-wide client;
/// [`QuakeLoader::usgs`] builds its own from the feed's timeout and user agent.
pub struct QuakeLoader<S: QuakeSource = UsgsSource> {
    source: S,
    client: reqwest::Client,
}

impl QuakeLoader<UsgsSource> {
    /// Loader for the USGS feed described by `config`
    pub fn usgs(config: FeedConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self::with_client(UsgsSource::new(config), client))
    }
}

impl<S: QuakeSource> QuakeLoader<S> {
    pub fn new(source: S) -> Self {
        Self::with_client(source, HTTP_CLIENT.clone())
    }

    pub fn with_client(source: S, client: reqwest::Client) -> Self {
        Self { source, client }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn build_client(config: &FeedConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .tcp_keepalive(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .map_err(|e| Error::Network(e).into())
}

#[async_trait]
impl<S: QuakeSource> FetchService for QuakeLoader<S> {
    async fn fetch(&self, region: &Viewport) -> Result<Option<Vec<Quake>>> {
        let url = self.source.query_url(region, Utc::now())?;
        log::debug!("fetching quakes from {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(Error::Network)?;
        let status = response.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(Error::Network)?;
        let quakes = parse_feed(&body)?;
        log::info!(
            "fetched {} quakes ({} bytes)",
            quakes.as_ref().map_or(0, Vec::len),
            body.len()
        );
        Ok(quakes)
    }
}
