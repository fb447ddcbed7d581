//! # Core Module
//!
//! Building blocks of the parameter repository.
//!
//! ## Architecture
//!
//! - **Force-field conventions** ([`forcefield`]) - Supported force-field flavours, their 1-4
//!   scaling constants and the element mass table
//! - **Error policy** ([`policy`]) - Strict vs. relaxed handling of conflicts and validation
//!   mismatches
//! - **Parameter records** ([`params`]) - Atom types, bonds, angles, torsions and impropers,
//!   each keyed by a canonical identity
//! - **Parameter store** ([`store`]) - Identity-keyed tables with merge and conflict resolution
//! - **File I/O** ([`io`]) - Readers for Q, Amber parm/frcmod and FFLD files and the Q writer
//!
//! ## Invariants
//!
//! - Two records describing the same physical parameter read forwards or backwards always share
//!   one identity.
//! - After any sequence of merges each identity maps to exactly one record per table.

pub mod forcefield;
pub mod io;
pub mod params;
pub mod policy;
pub mod store;
