use super::identity::{angle_id, bond_id, tokens};
use super::record::Parameter;
use super::normalize_comment;

/// Harmonic bond stretch. The force constant follows Q's convention `E = ½·k·(r - r0)²`.
#[derive(Debug, Clone, PartialEq)]
pub struct BondParam {
    identity: String,
    atom_types: [String; 2],
    pub force_constant: f64,
    pub r0: f64,
    comment: Option<String>,
}

impl BondParam {
    pub fn new(atom_types: [&str; 2], force_constant: f64, r0: f64) -> Self {
        let identity = bond_id(atom_types);
        Self {
            atom_types: tokens(&identity),
            identity,
            force_constant,
            r0,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(comment);
        self
    }

    /// Atom types in identity order.
    pub fn atom_types(&self) -> &[String; 2] {
        &self.atom_types
    }
}

impl Parameter for BondParam {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn value_repr(&self) -> String {
        format!("fc={:.3}, r0={:.3}", self.force_constant, self.r0)
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Harmonic angle bend, `E = ½·k·(θ - θ0)²` with θ0 in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleParam {
    identity: String,
    atom_types: [String; 3],
    pub force_constant: f64,
    pub theta0: f64,
    comment: Option<String>,
}

impl AngleParam {
    pub fn new(atom_types: [&str; 3], force_constant: f64, theta0: f64) -> Self {
        let identity = angle_id(atom_types);
        Self {
            atom_types: tokens(&identity),
            identity,
            force_constant,
            theta0,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = normalize_comment(comment);
        self
    }

    pub fn atom_types(&self) -> &[String; 3] {
        &self.atom_types
    }
}

impl Parameter for AngleParam {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn value_repr(&self) -> String {
        format!("fc={:.3}, th0={:.3}", self.force_constant, self.theta0)
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_stores_atom_types_in_identity_order() {
        let bond = BondParam::new(["HC", "CT"], 680.0, 1.09);
        assert_eq!(bond.identity(), "CT HC");
        assert_eq!(bond.atom_types(), &["CT".to_string(), "HC".to_string()]);
    }

    #[test]
    fn reversed_bonds_have_equal_identity_and_repr() {
        let a = BondParam::new(["CT", "HC"], 300.0, 1.09);
        let b = BondParam::new(["HC", "CT"], 300.0, 1.09);
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a.value_repr(), b.value_repr());
    }

    #[test]
    fn angle_stores_atom_types_in_identity_order() {
        let angle = AngleParam::new(["HC", "CT", "CA"], 100.0, 109.5);
        assert_eq!(angle.identity(), "CA CT HC");
        assert_eq!(angle.atom_types()[1], "CT");
        assert_eq!(angle.value_repr(), "fc=100.000, th0=109.500");
    }

    #[test]
    fn comment_is_excluded_from_value_repr() {
        let plain = AngleParam::new(["CA", "CT", "HC"], 100.0, 109.5);
        let commented = plain.clone().with_comment("from parm10");
        assert_eq!(plain.value_repr(), commented.value_repr());
        assert_eq!(commented.comment(), Some("from parm10"));
    }
}
