// src/batch/mod.rs

//! Delivery batches: the shared data model, drafts and submission.

pub mod draft;
pub mod model;
pub mod submitter;

pub use draft::{BatchDraft, load_draft};
pub use model::{Delivery, DeliveryBatch, DeliveryRequest, RouteSummary};
pub use submitter::BatchSubmitter;
