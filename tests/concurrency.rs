//! Counter behaviour under parallel fetching

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, Request, Respond, ResponseTemplate};

use client_fetcher::app::coordinator::{ProgressRenderer, ProgressSnapshot};
use client_fetcher::app::{Coordinator, GraphicsQuality, RunStatus};

use common::{asset_index, linux_host, object_path, Fixture};

const TASKS: usize = 50;

#[derive(Default)]
struct RecordingRenderer {
    frames: Mutex<Vec<ProgressSnapshot>>,
    cleared: AtomicBool,
}

impl ProgressRenderer for RecordingRenderer {
    fn render(&self, snapshot: &ProgressSnapshot) {
        self.frames.lock().unwrap().push(snapshot.clone());
    }

    fn clear(&self) {
        self.cleared.store(true, Ordering::SeqCst);
    }
}

/// Serves known bodies after a fixed delay and records when each request arrived
///
/// The delay starts after the arrival is recorded, so a worker's next
/// request always arrives at least `delay` after its previous one.
struct TimedResponder {
    bodies: HashMap<String, Vec<u8>>,
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for TimedResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        match self.bodies.get(request.url.path()) {
            Some(body) => ResponseTemplate::new(200)
                .set_body_bytes(body.clone())
                .set_delay(self.delay),
            None => ResponseTemplate::new(404),
        }
    }
}

/// Largest number of requests whose response window overlaps one instant
fn peak_in_flight(arrivals: &[Instant], delay: Duration) -> usize {
    arrivals
        .iter()
        .map(|&t| {
            arrivals
                .iter()
                .filter(|&&a| a <= t && t < a + delay)
                .count()
        })
        .max()
        .unwrap_or(0)
}

/// Fifty distinct objects, one of them the client binary
fn bodies() -> Vec<Vec<u8>> {
    (0..TASKS).map(|i| format!("object number {}", i).into_bytes()).collect()
}

fn assert_frame_bounds(frames: &[ProgressSnapshot]) {
    for frame in frames {
        assert!(frame.completed <= TASKS, "completed out of range: {:?}", frame);
        assert!(frame.total <= TASKS, "total out of range: {:?}", frame);
        assert!(frame.completed <= frame.total || frame.total == 0);
        assert_eq!(frame.completed, frame.succeeded + frame.failed);
    }
    assert!(frames.windows(2).all(|w| w[0].completed <= w[1].completed));
}

/// Test fifty tasks on five workers
///
/// Every snapshot taken during the run, by the observer and by an outside
/// poller, stays within `[0, 50]`, and the counter ends at exactly 50.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifty_tasks_five_workers() {
    let fx = Fixture::start().await;
    let bodies = bodies();

    let objects: Vec<(String, &[u8])> = bodies[1..]
        .iter()
        .enumerate()
        .map(|(i, body)| (format!("minecraft/textures/item/{}.png", i), body.as_slice()))
        .collect();
    let object_refs: Vec<(&str, &[u8])> = objects.iter().map(|(n, b)| (n.as_str(), *b)).collect();
    let index = asset_index(&object_refs);
    let manifest = fx.manifest(&bodies[0], vec![], &index);

    fx.serve_descriptors("test", manifest, index).await;
    fx.serve_delayed("/client.jar", bodies[0].clone(), Duration::from_millis(10))
        .await;
    for (_, body) in &object_refs {
        fx.serve_delayed(&object_path(body), body.to_vec(), Duration::from_millis(10))
            .await;
    }

    let renderer = Arc::new(RecordingRenderer::default());
    let config = fx
        .config("test")
        .with_worker_count(5)
        .with_graphics_quality(GraphicsQuality::High)
        .with_progress(true)
        .with_progress_interval(Duration::from_millis(5));
    let coordinator = Arc::new(
        Coordinator::with_host(config, linux_host())
            .unwrap()
            .with_renderer(renderer.clone()),
    );

    let done = Arc::new(AtomicBool::new(false));
    let poller = {
        let coordinator = coordinator.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while !done.load(Ordering::SeqCst) {
                seen.push(coordinator.progress());
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            seen
        })
    };

    let result = coordinator.run_download().await.unwrap();
    done.store(true, Ordering::SeqCst);
    let polled = poller.await.unwrap();

    assert_eq!(result.status, RunStatus::Completed, "{:?}", result.failures);
    assert_eq!(result.summary_line(), "50/50 succeeded");

    let final_snapshot = coordinator.progress();
    assert_eq!(final_snapshot.completed, TASKS);
    assert_eq!(final_snapshot.total, TASKS);
    assert_eq!(final_snapshot.percentage(), 100.0);

    assert_frame_bounds(&polled);
    let frames = renderer.frames.lock().unwrap();
    assert!(!frames.is_empty());
    assert_frame_bounds(&frames);
    assert!(renderer.cleared.load(Ordering::SeqCst));
}

/// Test that failed tasks still advance the counter to the total
#[tokio::test]
async fn test_partial_failure_still_reaches_total() {
    let fx = Fixture::start().await;
    let bodies = bodies();

    let objects: Vec<(String, &[u8])> = bodies[1..]
        .iter()
        .enumerate()
        .map(|(i, body)| (format!("minecraft/textures/block/{}.png", i), body.as_slice()))
        .collect();
    let object_refs: Vec<(&str, &[u8])> = objects.iter().map(|(n, b)| (n.as_str(), *b)).collect();
    let index = asset_index(&object_refs);
    let manifest = fx.manifest(&bodies[0], vec![], &index);

    fx.serve_descriptors("test", manifest, index).await;
    fx.serve("/client.jar", bodies[0].clone(), 1).await;
    // Even-numbered objects exist; everything else is a 404
    for (_, body) in object_refs.iter().step_by(2) {
        fx.serve(&object_path(body), body.to_vec(), 1).await;
    }
    Mock::given(method("GET"))
        .and(path_regex(r"^/objects/.*"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(10)
        .mount(&fx.server)
        .await;

    let coordinator = fx.coordinator("test", 5);
    let result = coordinator.run_download().await.unwrap();

    let served = (object_refs.len() + 1) / 2 + 1;
    assert_eq!(result.status, RunStatus::Incomplete);
    assert_eq!(result.total, TASKS);
    assert_eq!(result.succeeded, served);
    assert_eq!(result.failed, TASKS - served);
    assert_eq!(result.failures.len(), TASKS - served);

    let snapshot = coordinator.progress();
    assert_eq!(snapshot.completed, TASKS);
    assert!(snapshot.is_finished());
}

/// Test that no more than the configured number of fetches overlap
///
/// Fifty tasks on five workers, every response held for 30ms. Each arrival
/// opens a 30ms window; at no instant may more than five windows be open.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_fetches_never_exceed_worker_count() {
    const WORKERS: usize = 5;
    let delay = Duration::from_millis(30);

    let fx = Fixture::start().await;
    let bodies = bodies();

    let objects: Vec<(String, &[u8])> = bodies[1..]
        .iter()
        .enumerate()
        .map(|(i, body)| (format!("minecraft/lang/{}.json", i), body.as_slice()))
        .collect();
    let object_refs: Vec<(&str, &[u8])> = objects.iter().map(|(n, b)| (n.as_str(), *b)).collect();
    let index = asset_index(&object_refs);
    let manifest = fx.manifest(&bodies[0], vec![], &index);
    fx.serve_descriptors("test", manifest, index).await;

    let mut served: HashMap<String, Vec<u8>> = object_refs
        .iter()
        .map(|(_, body)| (object_path(body), body.to_vec()))
        .collect();
    served.insert("/client.jar".to_string(), bodies[0].clone());

    let arrivals = Arc::new(Mutex::new(Vec::new()));
    Mock::given(method("GET"))
        .and(path_regex(r"^/(client\.jar|objects/.*)$"))
        .respond_with(TimedResponder {
            bodies: served,
            delay,
            arrivals: arrivals.clone(),
        })
        .mount(&fx.server)
        .await;

    let coordinator = fx.coordinator("test", WORKERS);
    let result = coordinator.run_download().await.unwrap();
    assert_eq!(result.summary_line(), "50/50 succeeded", "{:?}", result.failures);

    let arrivals = arrivals.lock().unwrap();
    assert_eq!(arrivals.len(), TASKS);
    let peak = peak_in_flight(&arrivals, delay);
    assert!(peak <= WORKERS, "{} fetches in flight with {} workers", peak, WORKERS);
    assert!(peak > 1, "fetches never overlapped");
}
