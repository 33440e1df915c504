//! Tests for the watch loop state, overlay publication and alerts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hazard_common::{DensityGrid, GeoBounds};
use hazard_watch::{DangerLevel, WatchConfig, Watcher};
use renderer::OverlayMetadata;
use test_utils::{bounds, create_constant_rows, example_rows};
use tokio::sync::broadcast;

fn unit_grid(rows: &[Vec<f64>]) -> DensityGrid {
    let b = bounds::UNIT_2X2;
    DensityGrid::from_rows(rows, GeoBounds::new(b.0, b.1, b.2, b.3).unwrap()).unwrap()
}

fn watcher(dir: &std::path::Path) -> Watcher {
    let config = WatchConfig {
        // Nothing listens on the discard port; refreshes fail fast
        base_url: "http://127.0.0.1:9".to_string(),
        output_dir: dir.to_path_buf(),
        scale: 1,
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    Watcher::new(config).unwrap()
}

// ============================================================================
// Overlay installation
// ============================================================================

#[tokio::test]
async fn test_apply_grid_publishes_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let w = watcher(dir.path());

    let generation = w.apply_grid(unit_grid(&example_rows())).await.unwrap();
    assert_eq!(generation, Some(1));

    let png = tokio::fs::read(w.config().png_path()).await.unwrap();
    assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

    let sidecar = tokio::fs::read(w.config().metadata_path()).await.unwrap();
    let meta: OverlayMetadata = serde_json::from_slice(&sidecar).unwrap();
    assert_eq!(meta.generation, 1);
    assert_eq!(meta.corners, [[0.0, 0.0], [2.0, 2.0]]);
    assert_eq!((meta.width, meta.height), (2, 2));
}

#[tokio::test]
async fn test_reapply_keeps_single_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let w = watcher(dir.path());

    w.apply_grid(unit_grid(&example_rows())).await.unwrap();
    let first = w.state().overlays().current().unwrap();
    let weak = Arc::downgrade(&first);
    drop(first);

    w.apply_grid(unit_grid(&create_constant_rows(2, 1.0))).await.unwrap();
    assert!(weak.upgrade().is_none(), "previous overlay still alive");

    let current = w.state().overlays().current().unwrap();
    assert_eq!(current.generation(), 2);
    assert_eq!(current.image().painted_pixels(), 4);

    // The lookup grid moves together with the overlay
    let snapshot = w.state().snapshot().await.unwrap();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.grid.cell(0, 0), Some(1.0));
    assert_eq!((snapshot.range.min, snapshot.range.max), (1.0, 1.0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_apply_grid_stays_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let w = Arc::new(watcher(dir.path()));

    for round in 0..40 {
        let calls: Vec<_> = (0..6)
            .map(|k| {
                let w = Arc::clone(&w);
                let rows = create_constant_rows(2, 1.0 + k as f64);
                tokio::spawn(async move { w.apply_grid(unit_grid(&rows)).await })
            })
            .collect();

        let mut installed = Vec::new();
        for call in calls {
            let result = call.await.unwrap();
            let generation = result.unwrap_or_else(|e| panic!("round {}: apply_grid failed: {}", round, e));
            installed.extend(generation);
        }
        assert!(!installed.is_empty(), "round {}: nothing installed", round);

        // Files, slot and lookup grid all describe the newest installed render
        let newest = *installed.iter().max().unwrap();
        let sidecar = tokio::fs::read(w.config().metadata_path()).await.unwrap();
        let meta: OverlayMetadata = serde_json::from_slice(&sidecar).unwrap();
        assert_eq!(meta.generation, newest, "round {}", round);
        assert_eq!(w.state().overlays().generation(), newest, "round {}", round);
        assert_eq!(w.state().snapshot().await.unwrap().generation, newest, "round {}", round);
    }

    // Only the two published files remain, no temp leftovers
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

// ============================================================================
// Position checks
// ============================================================================

#[tokio::test]
async fn test_no_alert_without_grid() {
    let dir = tempfile::tempdir().unwrap();
    let mut w = watcher(dir.path());
    assert!(w.check_position(0.5, 1.5, Instant::now()).await.is_none());
}

#[tokio::test]
async fn test_alert_on_hot_cell_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut w = watcher(dir.path());
    w.apply_grid(unit_grid(&example_rows())).await.unwrap();

    let t0 = Instant::now();
    // Zero cell and outside the grid never alert
    assert!(w.check_position(1.5, 1.5, t0).await.is_none());
    assert!(w.check_position(5.0, 5.0, t0).await.is_none());

    let alert = w.check_position(0.5, 1.5, t0).await.unwrap();
    assert_eq!(alert.reading.value, 4.0);
    assert_eq!(alert.reading.intensity, 1.0);
    assert_eq!(alert.reading.level, DangerLevel::Critical);
    assert_eq!((alert.reading.row, alert.reading.col), (0, 1));
}

#[tokio::test]
async fn test_alert_cooldown() {
    let dir = tempfile::tempdir().unwrap();
    let mut w = watcher(dir.path());
    w.apply_grid(unit_grid(&example_rows())).await.unwrap();

    let t0 = Instant::now();
    assert!(w.check_position(0.5, 1.5, t0).await.is_some());
    assert!(w.check_position(1.5, 0.5, t0 + Duration::from_secs(5)).await.is_none());

    let later = w.check_position(1.5, 0.5, t0 + Duration::from_secs(31)).await.unwrap();
    // Lowest positive value sits at the bottom of the range
    assert_eq!(later.reading.level, DangerLevel::Low);
}

// ============================================================================
// Loop
// ============================================================================

#[tokio::test]
async fn test_run_stops_at_end_of_input() {
    let dir = tempfile::tempdir().unwrap();
    let w = watcher(dir.path());
    w.apply_grid(unit_grid(&example_rows())).await.unwrap();

    let input: &[u8] = b"# walk\n0.5,1.5\nnot a position\n1.5,1.5\n0.5,1.5\n";
    let (_tx, rx) = broadcast::channel::<()>(1);
    let summary = w.run(input, rx).await.unwrap();

    assert_eq!(summary.positions, 3);
    // Second hit lands inside the cooldown
    assert_eq!(summary.alerts, 1);
    assert_eq!(summary.refreshes, summary.failed_refreshes);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let w = watcher(dir.path());

    let (client, _server) = tokio::io::duplex(64);
    let input = tokio::io::BufReader::new(client);
    let (tx, rx) = broadcast::channel::<()>(1);
    tx.send(()).unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(10), w.run(input, rx))
        .await
        .expect("watch loop did not stop")
        .unwrap();
    assert_eq!(summary.positions, 0);
}
