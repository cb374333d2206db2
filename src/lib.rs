//! fieldkit: field display and config override resolution for dashboard data
//!
//! This library provides:
//! - The display pipeline from `fieldkit-core` (units, decimals, mappings,
//!   thresholds, override resolution), re-exported at the crate root
//! - Settings and input document loading
//! - Text and JSON rendering of resolved frames

pub mod config;
pub mod report;

pub use config::{Document, Settings};
pub use fieldkit_core::*;
