//! Readers and writers for force-field parameter files.
//!
//! Each input format is a unit struct implementing [`traits::ParameterFormat`]: it reads a
//! whole file into [`traits::ParsedParameters`] without touching any store. Records are merged
//! afterwards by the caller. [`writer::PrmWriter`] renders a store in the Q `.prm` layout.

pub mod amber;
pub mod error;
pub mod ffld;
pub mod native;
pub mod traits;
mod util;
pub mod writer;
pub mod xref;
