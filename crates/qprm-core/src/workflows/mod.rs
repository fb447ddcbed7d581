//! # Workflows Module
//!
//! High-level entry points that drive the readers, the store and the writer together.
//!
//! ## Architecture
//!
//! - **Parameter repository** ([`repository`]) - A store plus the state that outlives a single
//!   file (error policy, Amber masses); files are ingested one at a time and committed only
//!   when every record merged
//! - **Configuration** ([`config`]) - `ConversionConfig` and its builder
//! - **Conversion workflow** ([`convert`]) - Reads an ordered list of inputs into one
//!   repository and optionally writes the resulting Q parameter file

pub mod config;
pub mod convert;
pub mod repository;
