// src/api/wire.rs

//! JSON shapes exchanged with `/delivery-batches/` and the boundary step that
//! turns them into domain values.
//!
//! The service is loosely typed: decimals may arrive as strings, the customer
//! may be a bare id or a nested object, and `status` is free text. Nothing
//! here trusts the payload; [`BatchResource::classify`] is the single place
//! where a raw resource becomes a [`DeliveryBatch`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::batch::model::{Delivery, DeliveryBatch, DeliveryRequest, RouteSummary};
use crate::types::{BatchId, BatchStatus, CustomerRef, LatLng};

use super::backend::ApiError;

/// Body of `POST /delivery-batches/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBatchRequest {
    pub name: String,
    pub delivery_date: NaiveDate,
    pub depot_address: String,
    pub deliveries: Vec<DeliveryRequest>,
}

/// Batch resource as returned by both endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub depot_address: Option<String>,
    #[serde(default)]
    pub depot_coordinates: Option<CoordinatesResource>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub deliveries: Vec<DeliveryResource>,
    #[serde(default, alias = "routeGeometry", skip_serializing_if = "Option::is_none")]
    pub route_geometry: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_stops: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance_km: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub coordinates: Option<CoordinatesResource>,
    #[serde(default)]
    pub customer: Option<CustomerResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// `{"lat": .., "lng": ..}`; geocoder output uses `latitude`/`longitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesResource {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerResource {
    Nested {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
    Id(String),
}

/// Decimal fields are serialized as strings by the service (`"12.50"`), but
/// plain numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decimal {
    Number(f64),
    Text(String),
}

impl Decimal {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Decimal::Number(n) => Some(*n),
            Decimal::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Outcome of validating a fetched resource against the closed status set.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Known(DeliveryBatch),
    /// The server reported a status outside `optimizing | ready | failed`.
    /// An empty string means the field was missing altogether.
    Unrecognized { status: String },
}

impl BatchResource {
    /// Validate the payload and build the domain batch.
    ///
    /// `requested` is the id that was asked for; it is used when the payload
    /// omits its own id. Route geometry is kept only for `ready` batches, and
    /// a `ready` batch without geometry gets an empty one.
    pub fn classify(self, requested: &BatchId) -> Result<Fetched, ApiError> {
        let raw_status = self.status.clone().unwrap_or_default();
        let status = match raw_status.parse::<BatchStatus>() {
            Ok(status) => status,
            Err(_) => return Ok(Fetched::Unrecognized { status: raw_status }),
        };

        let id = self.id.map(BatchId::from).unwrap_or_else(|| requested.clone());

        let delivery_date = self
            .delivery_date
            .as_deref()
            .map(|d| {
                NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|e| {
                    ApiError::Decode(format!("batch {id}: bad delivery_date {d:?}: {e}"))
                })
            })
            .transpose()?;

        let route_geometry = match status {
            BatchStatus::Ready => Some(
                self.route_geometry
                    .unwrap_or_default()
                    .into_iter()
                    .map(LatLng::from)
                    .collect(),
            ),
            _ => {
                if self.route_geometry.is_some() {
                    debug!(batch_id = %id, %status, "ignoring route geometry on non-ready batch");
                }
                None
            }
        };

        let deliveries = self
            .deliveries
            .into_iter()
            .map(|d| d.into_delivery(&id))
            .collect();

        Ok(Fetched::Known(DeliveryBatch {
            depot_coordinates: self.depot_coordinates.and_then(|c| placed(&id, c)),
            name: self.name.unwrap_or_default(),
            delivery_date,
            depot_address: self.depot_address.unwrap_or_default(),
            status,
            deliveries,
            route_geometry,
            summary: RouteSummary {
                total_stops: self.total_stops,
                total_distance_km: self.total_distance_km.as_ref().and_then(Decimal::to_f64),
                estimated_duration_minutes: self.estimated_duration_minutes,
            },
            id,
        }))
    }
}

impl DeliveryResource {
    fn into_delivery(self, batch_id: &BatchId) -> Delivery {
        Delivery {
            coordinates: self.coordinates.and_then(|c| placed(batch_id, c)),
            customer: self.customer.map(|c| match c {
                CustomerResource::Nested { id, name } => CustomerRef { id, name },
                CustomerResource::Id(id) => CustomerRef { id, name: None },
            }),
            id: self.id,
            address: self.address,
            phone: self.phone.unwrap_or_default(),
            reference_number: self.reference_number,
            special_instructions: self.special_instructions,
        }
    }
}

/// Out-of-range coordinates are treated as "not geocoded".
fn placed(batch_id: &BatchId, c: CoordinatesResource) -> Option<LatLng> {
    let point = LatLng::new(c.lat, c.lng);
    if point.is_valid() {
        Some(point)
    } else {
        warn!(batch_id = %batch_id, lat = c.lat, lng = c.lng, "dropping out-of-range coordinates");
        None
    }
}
