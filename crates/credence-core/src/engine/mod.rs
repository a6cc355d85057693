//! The table algebra and orchestration engine.
//!
//! This module provides:
//! - **errors**: Error type shared by every fallible operation
//! - **model**: Fixed-width model addressing and bit projections
//! - **parallel**: Range-partitioned execution of per-model kernels
//! - **config**: Per-distribution configuration
//! - **flock**: Dense joint tables with refine, marginalize and combine
//! - **dependency**: Transitive dependency discovery with cycle detection
//! - **cache**: Per-argument belief cache
//! - **distribution**: Ownership partition and query resolution

pub mod cache;
pub mod config;
pub mod dependency;
pub mod distribution;
pub mod errors;
pub mod flock;
pub mod model;
pub mod parallel;
