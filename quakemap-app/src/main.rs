use anyhow::{anyhow, Context};
use quakemap::prelude::*;
use std::time::Instant;

/// How often the controller is polled, like a frame tick
const FRAME: Duration = Duration::from_millis(16);

/// Give up waiting for the feed after this long
const SETTLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Scripted pans, in degrees, applied one per frame
const PANS: [(f64, f64); 6] = [
    (0.0, 1.0),
    (0.0, 1.0),
    (0.5, 0.5),
    (-1.0, 0.0),
    (0.0, -2.0),
    (0.25, 0.25),
];

/// Headless viewer: pans over California and prints the markers it ends up with
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => QuakeMapConfig::from_file(&path)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("loading config from {}", path))?,
        None => QuakeMapConfig::default(),
    };

    let loader = QuakeLoader::usgs(config.feed.clone()).map_err(|e| anyhow!(e))?;
    let live = SharedViewport::new(Viewport::from_coords(32.0, -125.0, 42.0, -114.0));
    let mut controller = SyncController::new(
        config.sync.clone(),
        Arc::new(loader),
        live.clone(),
        MarkerLayer::new(),
    );

    controller.refresh();
    for (dlat, dlng) in PANS {
        let viewport = live.pan(dlat, dlng);
        controller.on_viewport_changed(viewport);
        controller.poll();
        tokio::time::sleep(FRAME).await;
    }

    let started = Instant::now();
    while !controller.is_settled() {
        if started.elapsed() > SETTLE_TIMEOUT {
            return Err(anyhow!("feed did not answer within {:?}", SETTLE_TIMEOUT));
        }
        tokio::select! {
            _ = tokio::time::sleep(FRAME) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted");
                return Ok(());
            }
        }
        controller.poll();
    }

    let stats = controller.stats();
    let viewport = live.get();
    println!(
        "Viewport S{:.2} W{:.2} N{:.2} E{:.2}",
        viewport.bounds.south(),
        viewport.bounds.west(),
        viewport.bounds.north(),
        viewport.bounds.east()
    );
    println!(
        "{} fetches issued, {} requests coalesced, {} markers shown",
        stats.issued,
        stats.deferred,
        controller.renderer().len()
    );

    for marker in controller.renderer().markers_by_priority().into_iter().take(10) {
        let quake = marker.quake();
        println!(
            "  M{:>4.1} {:<8} {:>7.3},{:>8.3}  {}",
            quake.magnitude,
            format!("{:?}", marker.tier),
            quake.position.lat,
            quake.position.lng,
            quake.place.as_deref().unwrap_or("unknown location")
        );
    }

    Ok(())
}
