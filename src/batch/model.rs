// src/batch/model.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{BatchId, BatchStatus, CustomerRef, LatLng};

/// One delivery as entered by dispatch staff, before submission.
///
/// ```toml
/// [[deliveries]]
/// address = "Calle 1"
/// phone = "809-555-0101"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    /// Free-text address; a delivery without one is rejected.
    #[serde(default)]
    pub address: String,

    /// Optional contact phone. Only its formatting is checked.
    #[serde(default)]
    pub phone: String,
}

impl DeliveryRequest {
    pub fn new(address: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            phone: phone.into(),
        }
    }
}

/// One delivery as reported back by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Delivery {
    pub id: Option<String>,
    pub address: String,
    pub phone: String,

    /// Present once the service geocoded the address. A delivery without
    /// coordinates is unplaced and is left off the map.
    pub coordinates: Option<LatLng>,

    pub customer: Option<CustomerRef>,
    pub reference_number: Option<String>,
    pub special_instructions: Option<String>,
}

impl Delivery {
    pub fn is_placed(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// Totals the optimizer reports alongside a computed route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RouteSummary {
    pub total_stops: Option<u32>,
    pub total_distance_km: Option<f64>,
    pub estimated_duration_minutes: Option<u32>,
}

/// A delivery batch as observed on the server.
///
/// Instances are only built at the wire boundary (see
/// [`crate::api::wire::BatchResource::classify`]), which guarantees that
/// `route_geometry` is `Some` exactly when `status` is `Ready`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryBatch {
    pub id: BatchId,
    pub name: String,
    pub delivery_date: Option<NaiveDate>,
    pub depot_address: String,
    pub depot_coordinates: Option<LatLng>,
    pub status: BatchStatus,

    /// Insertion order is the default stop order shown before optimization.
    pub deliveries: Vec<Delivery>,

    pub route_geometry: Option<Vec<LatLng>>,
    pub summary: RouteSummary,
}

impl DeliveryBatch {
    pub fn is_ready(&self) -> bool {
        self.status == BatchStatus::Ready
    }

    /// Deliveries that have coordinates, in batch order.
    pub fn placed_deliveries(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.is_placed())
    }
}
