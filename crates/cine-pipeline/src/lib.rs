//! Batch orchestrator for the movie champion training pipeline.
//!
//! Sequences collection, preprocessing and training, mirroring each
//! stage's output to the configured artifact store. See [`Pipeline`].

pub mod pipeline;

pub use pipeline::{Pipeline, DEFAULT_PAGE_LIMIT};
