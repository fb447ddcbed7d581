use phf::{Map, phf_map};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Element masses (g/mol) used when a format gives only an element, keyed by upper-case symbol.
static ELEMENT_MASSES: Map<&'static str, f64> = phf_map! {
    "H" => 1.0079,
    "C" => 12.011,
    "N" => 14.007,
    "O" => 15.999,
    "F" => 18.988,
    "P" => 30.974,
    "S" => 32.065,
    "CL" => 35.453,
    "BR" => 79.904,
    "I" => 126.90,
    "DU" => 0.0,
};

pub fn element_mass(element: &str) -> Option<f64> {
    ELEMENT_MASSES.get(element.to_ascii_uppercase().as_str()).copied()
}

/// The force-field flavour a parameter set follows.
///
/// The flavour decides how Lennard-Jones parameters are represented in the Q format
/// (geometric `A`/`B` for OPLS-AA, arithmetic `Rmin`/`epsilon` for Amber), which external
/// formats may be read into the set, and the 1-4 scaling factors written next to every atom type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceFieldType {
    Amber,
    #[serde(rename = "oplsaa")]
    OplsAa,
}

/// Scaling factors applied to 1-4 (third-neighbour) non-bonded interactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling14 {
    pub electrostatic: f64,
    pub vdw: f64,
}

impl ForceFieldType {
    pub const ALL: [ForceFieldType; 2] = [ForceFieldType::Amber, ForceFieldType::OplsAa];

    pub fn name(self) -> &'static str {
        match self {
            ForceFieldType::Amber => "amber",
            ForceFieldType::OplsAa => "oplsaa",
        }
    }

    pub fn scaling_14(self) -> Scaling14 {
        match self {
            ForceFieldType::Amber => Scaling14 {
                electrostatic: 0.8333,
                vdw: 0.5,
            },
            ForceFieldType::OplsAa => Scaling14 {
                electrostatic: 0.5,
                vdw: std::f64::consts::FRAC_1_SQRT_2,
            },
        }
    }
}

impl fmt::Display for ForceFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Force field type '{0}' not supported. Use amber, oplsaa")]
pub struct UnknownForceFieldError(pub String);

impl FromStr for ForceFieldType {
    type Err = UnknownForceFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ForceFieldType::ALL
            .into_iter()
            .find(|ff_type| ff_type.name() == name)
            .ok_or(UnknownForceFieldError(name))
    }
}
