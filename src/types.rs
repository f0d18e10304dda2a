use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a delivery batch as reported by the optimization service.
///
/// This is a closed set. Anything else the server sends is surfaced as an
/// unrecognized status at the wire boundary and never coerced into one of
/// these variants.
///
/// - `Optimizing`: the batch was accepted and the route is being computed.
/// - `Ready`: a route was computed; route geometry is available.
/// - `Failed`: optimization finished without a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Optimizing,
    Ready,
    Failed,
}

impl BatchStatus {
    /// `ready` and `failed` are terminal; nothing transitions out of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchStatus::Ready | BatchStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Optimizing => "optimizing",
            BatchStatus::Ready => "ready",
            BatchStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "optimizing" => Ok(BatchStatus::Optimizing),
            "ready" => Ok(BatchStatus::Ready),
            "failed" => Ok(BatchStatus::Failed),
            other => Err(format!(
                "unrecognized batch status: {other} (expected \"optimizing\", \"ready\" or \"failed\")"
            )),
        }
    }
}

/// Server-assigned batch identity. Opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Self {
        BatchId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BatchId {
    fn from(s: &str) -> Self {
        BatchId::new(s)
    }
}

impl From<String> for BatchId {
    fn from(s: String) -> Self {
        BatchId(s)
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within lat [-90, 90], lng [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        LatLng { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

/// Weak link to a customer record owned elsewhere.
///
/// Only the identity and display name are carried; customer data is never
/// created or deleted through this crate.
///
/// The service may return only the customer id; in that case the reference
/// does not resolve to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: String,
    pub name: Option<String>,
}

impl CustomerRef {
    /// Display name, if the reference resolved to a non-blank one.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}
