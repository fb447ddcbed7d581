use super::atom::AtomTypeParam;
use super::bonded::{AngleParam, BondParam};
use super::improper::ImproperParam;
use super::torsion::TorsionParam;
use std::fmt;

/// Capability shared by every parameter record.
pub trait Parameter {
    /// Canonical, order-independent key of the record.
    fn identity(&self) -> &str;

    /// Fixed-precision rendering of the record's values, without the comment.
    ///
    /// Two records with equal identity and equal `value_repr` are duplicates; different
    /// `value_repr`s at one identity are a conflict.
    fn value_repr(&self) -> String;

    /// Provenance comment, if any.
    fn comment(&self) -> Option<&str>;
}

/// The table a record belongs to inside a `ParameterStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamClass {
    AtomType,
    Bond,
    Angle,
    Torsion,
    GenericTorsion,
    Improper,
    GenericImproper,
}

impl ParamClass {
    pub const ALL: [ParamClass; 7] = [
        ParamClass::AtomType,
        ParamClass::Bond,
        ParamClass::Angle,
        ParamClass::Torsion,
        ParamClass::GenericTorsion,
        ParamClass::Improper,
        ParamClass::GenericImproper,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamClass::AtomType => "atom type",
            ParamClass::Bond => "bond",
            ParamClass::Angle => "angle",
            ParamClass::Torsion => "torsion",
            ParamClass::GenericTorsion => "generic torsion",
            ParamClass::Improper => "improper",
            ParamClass::GenericImproper => "generic improper",
        }
    }
}

impl fmt::Display for ParamClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parameter record of any class.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamRecord {
    AtomType(AtomTypeParam),
    Bond(BondParam),
    Angle(AngleParam),
    Torsion(TorsionParam),
    Improper(ImproperParam),
}

impl ParamRecord {
    /// The store table this record is merged into; wildcard torsions and impropers go to the
    /// generic tables.
    pub fn class(&self) -> ParamClass {
        match self {
            ParamRecord::AtomType(_) => ParamClass::AtomType,
            ParamRecord::Bond(_) => ParamClass::Bond,
            ParamRecord::Angle(_) => ParamClass::Angle,
            ParamRecord::Torsion(t) if t.is_generic() => ParamClass::GenericTorsion,
            ParamRecord::Torsion(_) => ParamClass::Torsion,
            ParamRecord::Improper(i) if i.is_generic() => ParamClass::GenericImproper,
            ParamRecord::Improper(_) => ParamClass::Improper,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ParamRecord::AtomType(_) => "AtomType",
            ParamRecord::Bond(_) => "Bond",
            ParamRecord::Angle(_) => "Angle",
            ParamRecord::Torsion(_) => "Torsion",
            ParamRecord::Improper(_) => "Improper",
        }
    }

    fn as_parameter(&self) -> &dyn Parameter {
        match self {
            ParamRecord::AtomType(p) => p,
            ParamRecord::Bond(p) => p,
            ParamRecord::Angle(p) => p,
            ParamRecord::Torsion(p) => p,
            ParamRecord::Improper(p) => p,
        }
    }
}

impl Parameter for ParamRecord {
    fn identity(&self) -> &str {
        self.as_parameter().identity()
    }

    fn value_repr(&self) -> String {
        self.as_parameter().value_repr()
    }

    fn comment(&self) -> Option<&str> {
        self.as_parameter().comment()
    }
}

impl fmt::Display for ParamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind(), self.identity(), self.value_repr())
    }
}

impl From<AtomTypeParam> for ParamRecord {
    fn from(p: AtomTypeParam) -> Self {
        ParamRecord::AtomType(p)
    }
}

impl From<BondParam> for ParamRecord {
    fn from(p: BondParam) -> Self {
        ParamRecord::Bond(p)
    }
}

impl From<AngleParam> for ParamRecord {
    fn from(p: AngleParam) -> Self {
        ParamRecord::Angle(p)
    }
}

impl From<TorsionParam> for ParamRecord {
    fn from(p: TorsionParam) -> Self {
        ParamRecord::Torsion(p)
    }
}

impl From<ImproperParam> for ParamRecord {
    fn from(p: ImproperParam) -> Self {
        ParamRecord::Improper(p)
    }
}
