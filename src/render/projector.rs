// src/render/projector.rs

//! Turns a `ready` batch into the primitives a map component draws: a
//! center, one marker per placed delivery, and the route polyline.

use serde::Serialize;
use tracing::debug;

use crate::batch::{Delivery, DeliveryBatch};
use crate::config::MapSection;
use crate::errors::{BatchrouteError, Result};
use crate::types::LatLng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectorOptions {
    /// Center used when no delivery has coordinates.
    pub fallback_center: LatLng,
    pub zoom: u8,
}

impl Default for ProjectorOptions {
    fn default() -> Self {
        MapSection::default().into()
    }
}

impl From<MapSection> for ProjectorOptions {
    fn from(map: MapSection) -> Self {
        Self {
            fallback_center: map.fallback_center(),
            zoom: map.zoom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// 1-based position of the delivery in the batch.
    pub stop: usize,
    pub position: LatLng,
    pub label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderModel {
    pub center: LatLng,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    /// Route geometry exactly as reported; `None` when there is none.
    pub polyline: Option<Vec<LatLng>>,
}

/// Stateless projection of ready batches.
#[derive(Debug, Clone, Default)]
pub struct RouteProjector {
    options: ProjectorOptions,
}

impl RouteProjector {
    pub fn new(options: ProjectorOptions) -> Self {
        Self { options }
    }

    /// Project a `ready` batch.
    ///
    /// Deliveries without coordinates are left out of the markers; an empty
    /// marker list is a valid result. Calling this on a batch that is not
    /// `ready` is a [`BatchrouteError::Precondition`] error.
    pub fn project(&self, batch: &DeliveryBatch) -> Result<RenderModel> {
        if !batch.is_ready() {
            return Err(BatchrouteError::Precondition(format!(
                "batch {} is {}, only ready batches can be projected",
                batch.id, batch.status
            )));
        }

        let markers: Vec<MapMarker> = batch
            .deliveries
            .iter()
            .enumerate()
            .filter_map(|(i, d)| marker_for(i + 1, d))
            .collect();

        let unplaced = batch.deliveries.len() - markers.len();
        if unplaced > 0 {
            debug!(batch_id = %batch.id, unplaced, "deliveries without coordinates left off the map");
        }

        let center = markers
            .first()
            .map(|m| m.position)
            .unwrap_or(self.options.fallback_center);

        let polyline = batch
            .route_geometry
            .as_ref()
            .filter(|line| !line.is_empty())
            .cloned();

        Ok(RenderModel {
            center,
            zoom: self.options.zoom,
            markers,
            polyline,
        })
    }
}

fn marker_for(stop: usize, delivery: &Delivery) -> Option<MapMarker> {
    let position = delivery.coordinates?;
    let label = match delivery.customer.as_ref().and_then(|c| c.display_name()) {
        Some(name) => format!("{name} - {}", delivery.address),
        None => delivery.address.clone(),
    };
    Some(MapMarker {
        stop,
        position,
        label,
        phone: delivery.phone.clone(),
    })
}
