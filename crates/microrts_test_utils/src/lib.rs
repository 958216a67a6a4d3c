//! # microRTS Test Utilities
//!
//! Shared testing utilities for the simulation crates:
//! - Map fixtures and a snapshot builder
//! - Determinism test harness
//! - Scripted match driver
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod driver;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
