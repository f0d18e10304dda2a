// src/api/mod.rs

//! Remote batch service access.
//!
//! - [`backend`] defines the [`BatchApi`] trait the submitter and tracker talk
//!   to. Tests swap in a scripted fake.
//! - [`wire`] holds the JSON shapes of `/delivery-batches/` and the boundary
//!   step that turns raw payloads into domain values.
//! - [`http`] is the production implementation on top of `reqwest`.

pub mod backend;
pub mod http;
pub mod wire;

pub use backend::{ApiError, ApiFuture, BatchApi};
pub use http::HttpBatchApi;
pub use wire::{BatchResource, CreateBatchRequest, Fetched};
