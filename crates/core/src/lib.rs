//! # MetaSense Core
//!
//! Core types, constants, and enum tables for the MetaSense reputation system.
//!
//! This crate provides the fundamental building blocks used across all MetaSense
//! components, ensuring consistent data types and a single bidirectional mapping
//! between profile labels and the integer codes the reputation contract expects.
//!
//! ## Features
//!
//! - **Ethereum Types**: Uses Alloy primitives for Address
//! - **Domain Types**: TransactionRecord, BehavioralMetrics, ReputationScores,
//!   UserProfile, PublicationResult
//! - **Enum Tables**: TrustTier and UserClass with label and contract-code forms
//! - **Constants**: Score weights and classification thresholds

#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use error::{CoreError, Result};
pub use types::*;

// Re-export Alloy primitives for convenience
pub use alloy_primitives::Address;
