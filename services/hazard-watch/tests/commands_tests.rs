//! Tests for the file-based subcommands.

use grid_builder::BuildOptions;
use hazard_watch::commands::{build_file, load_grid, lookup_file, render_file};
use hazard_watch::DangerLevel;
use renderer::OverlayMetadata;
use test_utils::{
    bare_heatmap_json, bounds, enveloped_heatmap_json, example_rows, no_data_json, reports_json,
    write_temp_file,
};

// ============================================================================
// render
// ============================================================================

#[test]
fn test_render_file_writes_png_and_sidecar() {
    let input = write_temp_file(&enveloped_heatmap_json(&example_rows(), bounds::UNIT_2X2));
    let dir = tempfile::tempdir().unwrap();
    let png_path = dir.path().join("heat.png");
    let meta_path = dir.path().join("heat.json");

    let image = render_file(input.path(), &png_path, 2, Some(&meta_path)).unwrap();
    assert_eq!((image.width(), image.height()), (4, 4));
    assert_eq!(image.painted_pixels(), 8);

    let png = std::fs::read(&png_path).unwrap();
    assert_eq!(&png[1..4], b"PNG");

    let meta: OverlayMetadata = serde_json::from_slice(&std::fs::read(&meta_path).unwrap()).unwrap();
    assert_eq!(meta, OverlayMetadata::for_image(&image, 0));
    assert_eq!(meta.bounds.max_lat, 2.0);
    assert_eq!(meta.width, 4);
}

#[test]
fn test_render_file_rejects_zero_scale() {
    let input = write_temp_file(&bare_heatmap_json(&example_rows(), bounds::UNIT_2X2));
    let dir = tempfile::tempdir().unwrap();
    let png_path = dir.path().join("heat.png");

    assert!(render_file(input.path(), &png_path, 0, None).is_err());
    assert!(!png_path.exists());
}

#[test]
fn test_load_grid_error_envelope() {
    let input = write_temp_file(&no_data_json());
    let err = load_grid(input.path()).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("No data available"), "{}", chain);
}

// ============================================================================
// lookup
// ============================================================================

#[test]
fn test_lookup_file() {
    let input = write_temp_file(&bare_heatmap_json(&example_rows(), bounds::UNIT_2X2));

    let hot = lookup_file(input.path(), 0.5, 1.5).unwrap();
    assert_eq!(hot.value, Some(4.0));
    assert_eq!(hot.level, Some(DangerLevel::Critical));
    assert_eq!(hot.describe(), "4 (CRITICAL)");

    let empty = lookup_file(input.path(), 1.5, 1.5).unwrap();
    assert_eq!(empty.value, Some(0.0));
    assert_eq!(empty.level, None);

    let outside = lookup_file(input.path(), -1.0, 1.0).unwrap();
    assert_eq!(outside.describe(), "outside grid");
}

// ============================================================================
// build
// ============================================================================

#[test]
fn test_build_file_round_trips_through_render() {
    let reports = write_temp_file(&reports_json());
    let dir = tempfile::tempdir().unwrap();
    let heatmap = dir.path().join("heatmap.json");

    let options = BuildOptions { resolution: 40, ..Default::default() };
    let info = build_file(reports.path(), &heatmap, &options).unwrap().unwrap();
    assert_eq!(info.num_points, Some(3));

    let (grid, _) = load_grid(&heatmap).unwrap();
    assert_eq!(grid.resolution(), 40);
    assert!(grid.positive_count() > 0);

    let png_path = dir.path().join("heatmap.png");
    let image = render_file(&heatmap, &png_path, 1, None).unwrap();
    assert!(image.painted_pixels() > 0);
}

#[test]
fn test_build_file_without_positions() {
    let reports = write_temp_file(r#"[{"id": 1, "label": "nowhere"}]"#);
    let dir = tempfile::tempdir().unwrap();
    let heatmap = dir.path().join("heatmap.json");

    assert!(build_file(reports.path(), &heatmap, &BuildOptions::default()).unwrap().is_none());
    assert!(!heatmap.exists());
}
