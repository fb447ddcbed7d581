//! Parameter records and their canonical identities.
//!
//! Every parameter class has a record type ([`AtomTypeParam`], [`BondParam`], [`AngleParam`],
//! [`TorsionParam`], [`ImproperParam`]) implementing the shared [`Parameter`] capability, and
//! the [`ParamRecord`] enum carries any of them through readers and the store.
//!
//! Identities are computed by the pure functions in [`identity`] when a record is built; the
//! atom types kept inside a record are always stored in identity order.

pub mod atom;
pub mod bonded;
pub mod error;
pub mod identity;
pub mod improper;
pub mod record;
pub mod torsion;

pub use atom::{AtomTypeParam, LennardJones, MASS_PLACEHOLDER};
pub use bonded::{AngleParam, BondParam};
pub use error::ParamError;
pub use improper::ImproperParam;
pub use record::{ParamClass, ParamRecord, Parameter};
pub use torsion::{FourierTerm, TorsionParam};

pub(crate) fn format_comment(comment: Option<&str>) -> String {
    comment.map(|c| format!(" # {}", c)).unwrap_or_default()
}

pub(crate) fn normalize_comment(comment: impl Into<String>) -> Option<String> {
    let comment = comment.into();
    let normalized = comment.split_whitespace().collect::<Vec<_>>().join(" ");
    (!normalized.is_empty()).then_some(normalized)
}
