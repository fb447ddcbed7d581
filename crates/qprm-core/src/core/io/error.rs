use crate::core::forcefield::ForceFieldType;
use crate::core::params::ParamError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed line {line} in section '{section}': {kind}")]
    Parse {
        line: usize,
        section: String,
        kind: ParseErrorKind,
    },
    #[error("Unknown section '{name}' on line {line}")]
    UnknownSection { line: usize, name: String },
    #[error("Invalid parameter on line {line} in section '{section}': {source}")]
    Param {
        line: usize,
        section: String,
        #[source]
        source: ParamError,
    },
    #[error("Missing cross-reference on line {line}: {detail}")]
    MissingCrossReference { line: usize, detail: String },
    #[error(
        "Atom element mismatch on line {line}, possible wrong order of atoms: '{structure}' (structure) '{ffld}' (ffld)"
    )]
    ElementMismatch {
        line: usize,
        structure: String,
        ffld: String,
    },
    #[error("Different masses for atom type '{atom_type}' on line {line}: {mass}, previously {previous}")]
    MassConflict {
        line: usize,
        atom_type: String,
        mass: f64,
        previous: f64,
    },
    #[error("{format} files cannot be read into a '{ff_type}' parameter set")]
    UnsupportedForceField {
        format: &'static str,
        ff_type: ForceFieldType,
    },
    #[error("{format} files need a structure reference to name their atom types")]
    MissingStructure { format: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Invalid float in {field} (value: '{value}')")]
    InvalidFloat { field: String, value: String },
    #[error("Expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },
    #[error("Expected a 'key value' pair, found {found} fields")]
    KeyValueExpected { found: usize },
    #[error("Line is not a comment and is not inside any section")]
    OutsideSection,
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
}
