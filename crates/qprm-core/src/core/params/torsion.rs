use super::error::ParamError;
use super::identity::{is_wildcard, tokens, torsion_id};
use super::record::Parameter;
use super::normalize_comment;

/// Two multiplicities closer than this are considered equal.
const MULTIPLICITY_TOLERANCE: f64 = 1e-7;

/// One component of a torsion's Fourier expansion,
/// `E = k/paths · (1 + cos(n·φ - φ0))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourierTerm {
    pub force_constant: f64,
    pub multiplicity: f64,
    /// φ0 in degrees.
    pub phase: f64,
    pub paths: f64,
}

impl FourierTerm {
    pub fn new(force_constant: f64, multiplicity: f64, phase: f64, paths: f64) -> Self {
        Self {
            force_constant,
            multiplicity,
            phase,
            paths,
        }
    }

    fn has_symmetric_phase(&self) -> bool {
        self.phase.abs() < MULTIPLICITY_TOLERANCE
            || (self.phase - 180.0).abs() < MULTIPLICITY_TOLERANCE
    }
}

/// A proper torsion: four atom types and a set of Fourier terms with pairwise distinct
/// multiplicities.
///
/// A torsion is generic when any of its atom types is the wildcard `?`.
#[derive(Debug, Clone, PartialEq)]
pub struct TorsionParam {
    identity: String,
    atom_types: [String; 4],
    terms: Vec<FourierTerm>,
    comment: Option<String>,
}

impl TorsionParam {
    pub fn new(atom_types: [&str; 4]) -> Self {
        let identity = torsion_id(atom_types);
        Self {
            atom_types: tokens(&identity),
            identity,
            terms: Vec::new(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(comment);
        self
    }

    pub fn atom_types(&self) -> &[String; 4] {
        &self.atom_types
    }

    pub fn is_generic(&self) -> bool {
        self.atom_types.iter().any(|t| is_wildcard(t))
    }

    /// Adds a Fourier term, keeping the terms sorted by multiplicity.
    ///
    /// When the phase is 0° or 180° the sign of the multiplicity carries no meaning and the
    /// absolute value is stored, so that sign noise in older parameter sets does not show up
    /// as a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::DuplicateMultiplicity`] if a term with the same absolute
    /// multiplicity is already present.
    pub fn add_term(&mut self, term: FourierTerm) -> Result<(), ParamError> {
        let magnitude = term.multiplicity.abs();
        if self
            .terms
            .iter()
            .any(|t| (t.multiplicity.abs() - magnitude).abs() < MULTIPLICITY_TOLERANCE)
        {
            return Err(ParamError::DuplicateMultiplicity {
                identity: self.identity.clone(),
                multiplicity: magnitude,
            });
        }

        let mut term = term;
        if term.has_symmetric_phase() {
            term.multiplicity = magnitude;
        }
        let position = self
            .terms
            .partition_point(|t| t.multiplicity <= term.multiplicity);
        self.terms.insert(position, term);
        Ok(())
    }

    /// Terms in ascending order of multiplicity.
    pub fn terms(&self) -> &[FourierTerm] {
        &self.terms
    }
}

impl Parameter for TorsionParam {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn value_repr(&self) -> String {
        let join = |values: Vec<String>, sep: &str| values.join(sep);
        let fcs = join(
            self.terms
                .iter()
                .map(|t| format!("{:.4}", t.force_constant))
                .collect(),
            ", ",
        );
        let mults = join(
            self.terms
                .iter()
                .map(|t| format!("{:.1}", t.multiplicity))
                .collect(),
            ",",
        );
        let phases = join(
            self.terms.iter().map(|t| format!("{:.1}", t.phase)).collect(),
            ",",
        );
        let paths = join(
            self.terms.iter().map(|t| format!("{:.1}", t.paths)).collect(),
            ",",
        );
        format!(
            "fcs=({}), multiplicities=({}), phi0=({}), npaths=({})",
            fcs, mults, phases, paths
        )
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
