use thiserror::Error;

/// Errors raised while building a parameter record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("Duplicate parameter found: torsion '{identity}' already has multiplicity {multiplicity:.1}")]
    DuplicateMultiplicity { identity: String, multiplicity: f64 },

    #[error("Only multiplicity 2 is supported for impropers, got {multiplicity} ({identity})")]
    UnsupportedMultiplicity { identity: String, multiplicity: f64 },

    #[error("The center of an improper cannot be a wildcard (peripheral atoms: {peripherals})")]
    WildcardCenter { peripherals: String },

    #[error("Improper around '{center}' has three wildcard atom types")]
    AllWildcardPeripherals { center: String },
}
