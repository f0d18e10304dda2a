// src/api/backend.rs

//! Pluggable batch service abstraction.
//!
//! `BatchSubmitter` and `JobStatusTracker` talk to a `BatchApi` instead of an
//! HTTP client directly, so tests can script server responses and count
//! requests without a network.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::types::BatchId;

use super::wire::{BatchResource, CreateBatchRequest};

/// Failure of a single request against the batch service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, timeout, TLS failure and the like.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// The body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The two calls this crate makes against the remote service.
pub trait BatchApi: Send + Sync {
    /// `POST /delivery-batches/`. Must send exactly one request; no retries.
    fn create_batch(&self, request: &CreateBatchRequest) -> ApiFuture<'_, BatchResource>;

    /// `GET /delivery-batches/{id}/`.
    fn fetch_batch(&self, id: &BatchId) -> ApiFuture<'_, BatchResource>;
}
