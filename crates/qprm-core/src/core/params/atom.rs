use super::identity::atom_type_id;
use super::record::Parameter;
use super::normalize_comment;

/// Lennard-Jones parameters of a single atom type.
///
/// All values are "single-atom" parameters as Q expects them: `A_i = sqrt(A_ii)`,
/// `B_i = sqrt(B_ii)` and `Rmin_i = Rmin_ii / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LennardJones {
    /// Geometric combination rule, `A_i` in (kcal/mol·Å¹²)^½ and `B_i` in (kcal/mol·Å⁶)^½.
    Geometric { a: f64, b: f64 },
    /// Arithmetic combination rule, `Rmin_i` in Å and `epsilon_ii` in kcal/mol.
    Arithmetic { r_min: f64, epsilon: f64 },
}

impl LennardJones {
    /// Converts sigma/epsilon to the geometric representation:
    /// `A = sqrt(4·ε·σ¹²)`, `B = sqrt(4·ε·σ⁶)`.
    pub fn from_sigma_epsilon(sigma: f64, epsilon: f64) -> Self {
        LennardJones::Geometric {
            a: (4.0 * epsilon * sigma.powi(12)).sqrt(),
            b: (4.0 * epsilon * sigma.powi(6)).sqrt(),
        }
    }
}

/// Written in place of a mass that could not be determined.
pub const MASS_PLACEHOLDER: &str = "<FIX>";

#[derive(Debug, Clone, PartialEq)]
pub struct AtomTypeParam {
    identity: String,
    /// `None` when the mass is unknown and must be filled in by hand.
    pub mass: Option<f64>,
    pub lj: LennardJones,
    comment: Option<String>,
}

impl AtomTypeParam {
    pub fn new(name: &str, mass: f64, lj: LennardJones) -> Self {
        Self {
            identity: atom_type_id(name),
            mass: Some(mass),
            lj,
            comment: None,
        }
    }

    pub fn with_unknown_mass(name: &str, lj: LennardJones) -> Self {
        Self {
            identity: atom_type_id(name),
            mass: None,
            lj,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(comment);
        self
    }

    pub fn name(&self) -> &str {
        &self.identity
    }
}

impl Parameter for AtomTypeParam {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn value_repr(&self) -> String {
        let lj = match self.lj {
            LennardJones::Geometric { a, b } => format!("lj_A={:.3}, lj_B={:.3}", a, b),
            LennardJones::Arithmetic { r_min, epsilon } => {
                format!("lj_R={:.3}, lj_eps={:.3}", r_min, epsilon)
            }
        };
        match self.mass {
            Some(mass) => format!("{}, mass={:.3}", lj, mass),
            None => format!("{}, mass={}", lj, MASS_PLACEHOLDER),
        }
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
