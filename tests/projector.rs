// tests/projector.rs

use std::error::Error;

use batchroute::api::Fetched;
use batchroute::config::MapSection;
use batchroute::errors::BatchrouteError;
use batchroute::render::{ProjectorOptions, RouteProjector};
use batchroute::types::{BatchId, LatLng};
use batchroute_test_utils::builders::{BatchResourceBuilder, optimizing};

type TestResult = Result<(), Box<dyn Error>>;

fn known(resource: batchroute::api::BatchResource) -> batchroute::batch::DeliveryBatch {
    match resource.classify(&BatchId::new("b1")) {
        Ok(Fetched::Known(batch)) => batch,
        other => panic!("expected a known batch, got {other:?}"),
    }
}

#[test]
fn ready_batch_projects_markers_and_polyline() -> TestResult {
    let batch = known(
        BatchResourceBuilder::new("b1")
            .status("ready")
            .delivery("Calle 1", Some((18.50, -69.90)), Some("Ana"))
            .delivery("Calle 2", None, Some("Luis"))
            .delivery("Calle 3", Some((18.52, -69.88)), None)
            .geometry(&[[18.48, -69.93], [18.50, -69.90], [18.52, -69.88]])
            .build(),
    );

    let model = RouteProjector::default().project(&batch)?;

    assert_eq!(model.zoom, 13);
    assert_eq!(model.center, LatLng::new(18.50, -69.90));
    assert_eq!(model.markers.len(), 2);
    assert_eq!(model.markers[0].label, "Ana - Calle 1");
    assert_eq!(model.markers[0].stop, 1);
    assert_eq!(model.markers[1].label, "Calle 3");
    assert_eq!(model.markers[1].stop, 3);
    assert_eq!(model.polyline.as_ref().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn projection_is_idempotent() -> TestResult {
    let batch = known(
        BatchResourceBuilder::new("b1")
            .status("ready")
            .delivery("Calle 1", Some((18.50, -69.90)), Some("Ana"))
            .geometry(&[[18.48, -69.93], [18.50, -69.90]])
            .build(),
    );
    let projector = RouteProjector::default();

    let first = projector.project(&batch)?;
    let second = projector.project(&batch)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn ready_without_geometry_or_coordinates_still_renders() -> TestResult {
    let batch = known(
        BatchResourceBuilder::new("b1")
            .status("ready")
            .delivery("Calle 1", None, None)
            .build(),
    );

    let options = ProjectorOptions::from(MapSection {
        fallback_center: [10.0, 20.0],
        zoom: 9,
    });
    let model = RouteProjector::new(options).project(&batch)?;

    assert!(model.markers.is_empty());
    assert_eq!(model.polyline, None);
    assert_eq!(model.center, LatLng::new(10.0, 20.0));
    assert_eq!(model.zoom, 9);
    Ok(())
}

#[test]
fn optimizing_batch_cannot_be_projected() {
    let batch = known(optimizing("b1"));
    assert!(matches!(
        RouteProjector::default().project(&batch),
        Err(BatchrouteError::Precondition(_))
    ));
}

#[test]
fn render_model_serializes_for_the_map() -> TestResult {
    let batch = known(
        BatchResourceBuilder::new("b1")
            .status("ready")
            .delivery("Calle 1", Some((18.50, -69.90)), Some("Ana"))
            .geometry(&[[18.48, -69.93]])
            .build(),
    );
    let model = RouteProjector::default().project(&batch)?;
    let json = serde_json::to_value(&model)?;

    assert_eq!(json["zoom"], 13);
    assert_eq!(json["markers"][0]["label"], "Ana - Calle 1");
    assert_eq!(json["center"]["lat"], 18.5);
    assert_eq!(json["polyline"][0]["lng"], -69.93);
    Ok(())
}
