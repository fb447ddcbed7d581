//! # qprm Core Library
//!
//! A force-field parameter repository for molecular-mechanics simulations. It reads bonded and
//! non-bonded parameters from several on-disk formats, reduces every parameter to a canonical,
//! order-independent identity, merges records across files while detecting conflicting values,
//! and writes the accumulated set as a Q parameter (`.prm`) file.
//!
//! ## Architectural Philosophy
//!
//! The library follows a two-layer design:
//!
//! - **[`core`]: The Foundation.** Parameter records and their canonical identities
//!   (`params`), the merge-aware `ParameterStore` (`store`), and the format readers and the
//!   canonical writer (`io`). Everything in this layer is synchronous and free of global state;
//!   the error policy is passed in explicitly.
//!
//! - **[`workflows`]: The Public API.** `ParameterRepository` ties readers and the store
//!   together (one file at a time, all-or-nothing per file), and the `convert` workflow runs a
//!   complete multi-file conversion described by a `ConversionConfig`.

pub mod core;
pub mod workflows;
