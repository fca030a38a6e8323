//! MetaSense scoring engine.
//!
//! This crate implements the deterministic reputation pipeline:
//!
//! ```text
//! dataset ──filter by wallet──▶ MetricsExtractor ──▶ ReputationScorer
//!                                                          │
//!                     ProfileAssembler ◀── Classifier ◀────┘
//! ```
//!
//! Every stage is a pure function of its inputs plus an explicit evaluation
//! time. There is no I/O here beyond reading the transaction feed, no system
//! clock access, and no shared mutable state; scoring the same dataset at the
//! same evaluation instant is bit-identical.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod profile;
pub mod scorer;

pub use classifier::{classify_user, reasoning_tags, trust_tier};
pub use dataset::TransactionDataset;
pub use error::{EngineError, Result};
pub use metrics::extract_metrics;
pub use profile::assemble_profile;
pub use scorer::score_metrics;
