// src/render/mod.rs

//! Map-ready projection of optimized batches.

pub mod projector;

pub use projector::{MapMarker, ProjectorOptions, RenderModel, RouteProjector};
