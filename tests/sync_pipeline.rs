use async_trait::async_trait;
use quakemap::prelude::*;
use quakemap::runtime::spawners::manual::ManualSpawner;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves a fixed catalogue of quakes per viewport and counts concurrent calls
#[derive(Default)]
struct CatalogueService {
    by_region: Mutex<Vec<(Viewport, Vec<Quake>)>>,
    calls: Mutex<Vec<Viewport>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl CatalogueService {
    fn insert(&self, region: Viewport, quakes: Vec<Quake>) {
        self.by_region.lock().unwrap().push((region, quakes));
    }

    fn calls(&self) -> Vec<Viewport> {
        self.calls.lock().unwrap().clone()
    }

    fn lookup(&self, region: &Viewport) -> Vec<Quake> {
        self.by_region
            .lock()
            .unwrap()
            .iter()
            .find(|(r, _)| r == region)
            .map(|(_, q)| q.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FetchService for CatalogueService {
    async fn fetch(&self, region: &Viewport) -> quakemap::Result<Option<Vec<Quake>>> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        self.calls.lock().unwrap().push(*region);

        // Under Tokio, give overlapping fetches a chance to show up
        if tokio::runtime::Handle::try_current().is_ok() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let quakes = self.lookup(region);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(Some(quakes))
    }
}

/// Records every bulk call in order
#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<(&'static str, Vec<String>)>,
}

impl EntityRenderer for RecordingRenderer {
    fn add_entities(&mut self, entities: &[Quake]) {
        self.calls
            .push(("add", entities.iter().map(|q| q.id().to_string()).collect()));
    }

    fn remove_entities(&mut self, entities: &[Quake]) {
        self.calls
            .push(("remove", entities.iter().map(|q| q.id().to_string()).collect()));
    }
}

fn quake(id: &str, magnitude: f64) -> Quake {
    Quake::new(id, magnitude, LatLng::new(35.0, -118.0))
}

fn ids(quakes: &[Quake]) -> Vec<&str> {
    quakes.iter().map(|q| q.id().as_str()).collect()
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn setup(
    limit: usize,
    start: Viewport,
) -> (
    SyncController<SharedViewport, RecordingRenderer>,
    Arc<CatalogueService>,
    SharedViewport,
    ManualSpawner,
) {
    let service = Arc::new(CatalogueService::default());
    let viewport = SharedViewport::new(start);
    let spawner = ManualSpawner::new();
    let controller = SyncController::with_spawner(
        SyncConfig {
            max_displayed_entities: limit,
        },
        service.clone(),
        viewport.clone(),
        RecordingRenderer::default(),
        Arc::new(spawner.clone()),
    );
    (controller, service, viewport, spawner)
}

#[test]
fn test_end_to_end_two_viewports() {
    let v1 = Viewport::from_coords(30.0, -125.0, 40.0, -115.0);
    let v2 = v1.pan(2.0, 2.0);
    let (mut controller, service, live, spawner) = setup(2, v1);
    service.insert(v1, vec![quake("1", 2.0), quake("2", 6.0), quake("3", 9.0)]);
    service.insert(v2, vec![quake("2", 6.0), quake("4", 5.0)]);

    controller.refresh();
    spawner.run_all();
    controller.poll();

    assert_eq!(ids(controller.display_set()), vec!["3", "2"]);
    assert_eq!(
        controller.renderer().calls,
        vec![("add", strings(&["3", "2"]))]
    );

    live.set(v2);
    controller.on_viewport_changed(v2);
    spawner.run_all();
    controller.poll();

    assert_eq!(ids(controller.display_set()), vec!["2", "4"]);
    assert_eq!(
        controller.renderer().calls[1..],
        [("remove", strings(&["3"])), ("add", strings(&["4"]))]
    );
    assert!(controller.is_settled());
}

#[test]
fn test_rapid_pans_coalesce_into_one_trailing_fetch() {
    let start = Viewport::from_coords(0.0, 0.0, 10.0, 10.0);
    let (mut controller, service, live, spawner) = setup(200, start);

    controller.on_viewport_changed(start);
    for _ in 0..20 {
        let next = live.pan(0.5, 0.5);
        controller.on_viewport_changed(next);
    }
    let last = live.get();
    service.insert(last, vec![quake("final", 4.0)]);

    // Only the first fetch has been spawned
    assert_eq!(spawner.pending(), 1);
    assert!(controller.fetch_state().refetch_pending);

    spawner.run_next();
    controller.poll();
    assert_eq!(spawner.pending(), 1);

    spawner.run_next();
    controller.poll();

    assert_eq!(service.calls(), vec![start, last]);
    assert_eq!(controller.stats().issued, 2);
    assert_eq!(controller.stats().deferred, 20);
    assert_eq!(ids(controller.display_set()), vec!["final"]);
    assert!(controller.is_settled());
}

#[test]
fn test_convergence_after_changes_stop() {
    let start = Viewport::from_coords(0.0, 0.0, 5.0, 5.0);
    let (mut controller, service, live, spawner) = setup(200, start);

    // Pan, let a fetch finish mid-gesture, pan some more
    controller.on_viewport_changed(start);
    controller.on_viewport_changed(live.pan(1.0, 0.0));
    spawner.run_next();
    controller.poll();
    controller.on_viewport_changed(live.pan(1.0, 0.0));
    controller.on_viewport_changed(live.pan(1.0, 0.0));

    let final_viewport = live.get();
    service.insert(final_viewport, vec![quake("a", 1.0), quake("b", 3.0)]);

    let mut rounds = 0;
    while !controller.is_settled() {
        spawner.run_all();
        controller.poll();
        rounds += 1;
        assert!(rounds < 10, "controller never settled");
    }

    assert_eq!(service.calls().last(), Some(&final_viewport));
    assert_eq!(ids(controller.display_set()), vec!["b", "a"]);
    assert_eq!(controller.fetch_state(), FetchState::default());
}

#[test]
fn test_marker_layer_follows_display_set() {
    let v1 = Viewport::from_coords(0.0, 0.0, 1.0, 1.0);
    let v2 = Viewport::from_coords(1.0, 1.0, 2.0, 2.0);
    let service = Arc::new(CatalogueService::default());
    service.insert(v1, vec![quake("a", 2.0), quake("b", 7.1)]);
    service.insert(v2, vec![quake("b", 7.1), quake("c", 4.4)]);

    let spawner = ManualSpawner::new();
    let live = SharedViewport::new(v1);
    let mut controller = SyncController::with_spawner(
        SyncConfig::default(),
        service,
        live.clone(),
        MarkerLayer::new(),
        Arc::new(spawner.clone()),
    );

    controller.refresh();
    spawner.run_all();
    controller.poll();
    assert_eq!(controller.renderer().len(), 2);

    live.set(v2);
    controller.refresh();
    spawner.run_all();
    controller.poll();

    let layer = controller.renderer();
    assert_eq!(layer.len(), 2);
    assert!(!layer.contains(&QuakeId::from("a")));
    let order: Vec<&str> = layer
        .markers_by_priority()
        .iter()
        .map(|m| m.id().as_str())
        .collect();
    assert_eq!(order, vec!["b", "c"]);
    assert_eq!(
        layer.get(&QuakeId::from("b")).map(|m| m.tier),
        Some(MagnitudeTier::Extreme)
    );
}

#[cfg(feature = "tokio-runtime")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_single_flight() {
    use quakemap::runtime::spawners::tokio_impl::TokioSpawner;

    let start = Viewport::from_coords(10.0, 10.0, 20.0, 20.0);
    let service = Arc::new(CatalogueService::default());
    let live = SharedViewport::new(start);
    let mut controller = SyncController::with_spawner(
        SyncConfig::default(),
        service.clone(),
        live.clone(),
        RecordingRenderer::default(),
        Arc::new(TokioSpawner),
    );

    for _ in 0..10 {
        let next = live.pan(0.1, 0.1);
        controller.on_viewport_changed(next);
        tokio::time::sleep(Duration::from_millis(1)).await;
        controller.poll();
    }
    let last = live.get();
    service.insert(last, vec![quake("z", 5.5)]);

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !controller.is_settled() {
        assert!(std::time::Instant::now() < deadline, "controller never settled");
        tokio::time::sleep(Duration::from_millis(2)).await;
        controller.poll();
    }

    assert_eq!(service.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(service.calls().last(), Some(&last));
    assert_eq!(ids(controller.display_set()), vec!["z"]);
}
