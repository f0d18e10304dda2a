#![allow(dead_code)]

use batchroute::api::wire::{CoordinatesResource, CustomerResource, DeliveryResource};
use batchroute::api::BatchResource;
use batchroute::batch::{BatchDraft, DeliveryRequest};

/// Builder for `BatchDraft`. Starts out valid.
pub struct BatchDraftBuilder {
    draft: BatchDraft,
}

impl BatchDraftBuilder {
    pub fn new() -> Self {
        Self {
            draft: BatchDraft {
                name: "Ruta AM".to_string(),
                delivery_date: "2024-05-01".to_string(),
                depot_address: "Av. X".to_string(),
                deliveries: vec![DeliveryRequest::new("Calle 1", "")],
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.draft.name = name.to_string();
        self
    }

    pub fn delivery_date(mut self, date: &str) -> Self {
        self.draft.delivery_date = date.to_string();
        self
    }

    pub fn depot_address(mut self, address: &str) -> Self {
        self.draft.depot_address = address.to_string();
        self
    }

    pub fn with_delivery(mut self, address: &str, phone: &str) -> Self {
        self.draft.deliveries.push(DeliveryRequest::new(address, phone));
        self
    }

    pub fn no_deliveries(mut self) -> Self {
        self.draft.deliveries.clear();
        self
    }

    pub fn build(self) -> BatchDraft {
        self.draft
    }
}

impl Default for BatchDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for server-side `BatchResource` payloads.
pub struct BatchResourceBuilder {
    resource: BatchResource,
}

impl BatchResourceBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            resource: BatchResource {
                id: Some(id.to_string()),
                name: Some("Ruta AM".to_string()),
                delivery_date: Some("2024-05-01".to_string()),
                depot_address: Some("Av. X".to_string()),
                status: Some("optimizing".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.resource.status = Some(status.to_string());
        self
    }

    pub fn no_status(mut self) -> Self {
        self.resource.status = None;
        self
    }

    /// Add a delivery; `customer` is a nested customer name.
    pub fn delivery(mut self, address: &str, coords: Option<(f64, f64)>, customer: Option<&str>) -> Self {
        let n = self.resource.deliveries.len() + 1;
        self.resource.deliveries.push(DeliveryResource {
            id: Some(format!("d{n}")),
            address: address.to_string(),
            phone: Some(String::new()),
            coordinates: coords.map(|(lat, lng)| CoordinatesResource { lat, lng }),
            customer: customer.map(|name| CustomerResource::Nested {
                id: format!("c{n}"),
                name: Some(name.to_string()),
            }),
            ..Default::default()
        });
        self
    }

    pub fn geometry(mut self, points: &[[f64; 2]]) -> Self {
        self.resource.route_geometry = Some(points.to_vec());
        self
    }

    pub fn build(self) -> BatchResource {
        self.resource
    }
}

pub fn optimizing(id: &str) -> BatchResource {
    BatchResourceBuilder::new(id).build()
}

pub fn ready(id: &str) -> BatchResource {
    BatchResourceBuilder::new(id)
        .status("ready")
        .delivery("Calle 1", Some((18.5, -69.9)), Some("Ana"))
        .geometry(&[[18.48, -69.93], [18.5, -69.9]])
        .build()
}

pub fn failed(id: &str) -> BatchResource {
    BatchResourceBuilder::new(id).status("failed").build()
}
