use super::error::ParamError;
use super::identity::{WILDCARD, improper_id, is_wildcard, tokens};
use super::record::Parameter;
use super::normalize_comment;

/// The only improper multiplicity Q supports.
pub const IMPROPER_MULTIPLICITY: f64 = 2.0;
const MULTIPLICITY_TOLERANCE: f64 = 1e-5;

/// A periodic improper torsion around a center atom.
///
/// The atom types are stored in identity order, with the center in the second slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ImproperParam {
    identity: String,
    atom_types: [String; 4],
    pub force_constant: f64,
    /// φ0 in degrees.
    pub phi0: f64,
    pub multiplicity: f64,
    comment: Option<String>,
}

impl ImproperParam {
    /// Builds an improper around `center`.
    ///
    /// # Errors
    ///
    /// - [`ParamError::WildcardCenter`] if the center is the wildcard.
    /// - [`ParamError::AllWildcardPeripherals`] if no peripheral atom type is concrete.
    /// - [`ParamError::UnsupportedMultiplicity`] if `|multiplicity|` is not 2.
    pub fn new(
        center: &str,
        peripherals: [&str; 3],
        force_constant: f64,
        phi0: f64,
        multiplicity: f64,
    ) -> Result<Self, ParamError> {
        if is_wildcard(center) {
            return Err(ParamError::WildcardCenter {
                peripherals: peripherals.join(" "),
            });
        }
        if peripherals.iter().all(|t| is_wildcard(t)) {
            return Err(ParamError::AllWildcardPeripherals {
                center: center.to_string(),
            });
        }

        let identity = improper_id(center, peripherals);
        if (multiplicity.abs() - IMPROPER_MULTIPLICITY).abs() > MULTIPLICITY_TOLERANCE {
            return Err(ParamError::UnsupportedMultiplicity {
                identity,
                multiplicity,
            });
        }

        Ok(Self {
            atom_types: tokens(&identity),
            identity,
            force_constant,
            phi0,
            multiplicity,
            comment: None,
        })
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(comment);
        self
    }

    pub fn atom_types(&self) -> &[String; 4] {
        &self.atom_types
    }

    pub fn center(&self) -> &str {
        &self.atom_types[1]
    }

    pub fn is_generic(&self) -> bool {
        self.atom_types.iter().any(|t| t == WILDCARD)
    }
}

impl Parameter for ImproperParam {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn value_repr(&self) -> String {
        format!("fc={:.3}, phi0={:.3}", self.force_constant, self.phi0)
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
