//! Matching pipeline: turns a detected activity (typed by the user or
//! extracted from a shared reel) into a ranked, deduplicated set of bookable
//! experiences drawn from the internal catalog and the external tour
//! inventory provider.
//!
//! The orchestrator is [`engine::Recommender`]; everything else is a pipeline
//! stage it composes.

pub mod aggregator;
pub mod analysis_cache;
pub mod catalog;
pub mod engine;
pub mod gate;
pub mod keyword_gate;
pub mod location;
pub mod mixer;
pub mod oracle;
pub mod pg;
pub mod query_cache;
pub mod relevance;
pub mod traits;

mod claude;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use engine::{Recommender, RecommenderDeps};
