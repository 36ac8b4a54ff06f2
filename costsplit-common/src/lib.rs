//! # Cost Split Common Library
//!
//! Shared code for the cost-coding tools including:
//! - Allocation data model and JSON loading
//! - Calendar date parsing for effective windows
//! - Overlap validation (sweep line over date boundaries)
//! - Merge and upsert planning for edited allocation sets
//! - Active allocation summaries
//! - Configuration loading

pub mod allocation;
pub mod config;
pub mod dates;
pub mod error;
pub mod merge;
pub mod summary;
pub mod validator;

pub use allocation::CostSplitAllocation;
pub use error::{DateField, Error, Result, ValidationError};
pub use validator::{validate, validate_with, ValidationPolicy};
