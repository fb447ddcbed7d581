use super::error::ReadError;
use super::xref::StructureReference;
use crate::core::forcefield::ForceFieldType;
use crate::core::params::{
    AngleParam, AtomTypeParam, BondParam, ImproperParam, ParamRecord, TorsionParam,
};
use crate::core::policy::ErrorPolicy;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Atom-type masses (g/mol) collected from Amber files, in discovery order.
pub type MassTable = IndexMap<String, f64>;

/// Everything a reader may consult besides the file itself.
#[derive(Debug, Clone, Copy)]
pub struct ReadContext<'a> {
    pub ff_type: ForceFieldType,
    pub policy: ErrorPolicy,
    /// Masses known from previously read Amber files.
    pub masses: Option<&'a MassTable>,
    /// Atom list of the structure an FFLD file belongs to.
    pub structure: Option<&'a StructureReference>,
}

impl<'a> ReadContext<'a> {
    pub fn new(ff_type: ForceFieldType, policy: ErrorPolicy) -> Self {
        Self {
            ff_type,
            policy,
            masses: None,
            structure: None,
        }
    }

    pub fn with_masses(mut self, masses: &'a MassTable) -> Self {
        self.masses = Some(masses);
        self
    }

    pub fn with_structure(mut self, structure: &'a StructureReference) -> Self {
        self.structure = Some(structure);
        self
    }
}

/// The content of one file, grouped by class, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedParameters {
    pub options: Vec<(String, String)>,
    /// Masses declared by the file that were new or changed.
    pub masses: MassTable,
    pub atom_types: Vec<AtomTypeParam>,
    pub bonds: Vec<BondParam>,
    pub angles: Vec<AngleParam>,
    pub torsions: Vec<TorsionParam>,
    pub impropers: Vec<ImproperParam>,
}

impl ParsedParameters {
    /// Number of parameter records; options and masses are not counted.
    pub fn len(&self) -> usize {
        self.atom_types.len()
            + self.bonds.len()
            + self.angles.len()
            + self.torsions.len()
            + self.impropers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, class by class: atom types, bonds, angles, torsions, impropers.
    pub fn into_records(self) -> Vec<ParamRecord> {
        let mut records = Vec::with_capacity(self.len());
        records.extend(self.atom_types.into_iter().map(ParamRecord::from));
        records.extend(self.bonds.into_iter().map(ParamRecord::from));
        records.extend(self.angles.into_iter().map(ParamRecord::from));
        records.extend(self.torsions.into_iter().map(ParamRecord::from));
        records.extend(self.impropers.into_iter().map(ParamRecord::from));
        records
    }
}

/// A textual parameter format that can be read into [`ParsedParameters`].
///
/// Readers never mutate shared state: a read either returns the complete content of the file or
/// fails on the first structural error.
pub trait ParameterFormat {
    /// Human-readable format name used in errors and logs.
    const NAME: &'static str;

    /// Reads a whole parameter file from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error for unreadable input, malformed lines, invalid parameters, or problems
    /// the context's [`ErrorPolicy`] treats as fatal.
    fn read_from(
        reader: &mut impl BufRead,
        ctx: &ReadContext<'_>,
    ) -> Result<ParsedParameters, ReadError>;

    /// Reads a whole parameter file from a path.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        ctx: &ReadContext<'_>,
    ) -> Result<ParsedParameters, ReadError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, ctx)
    }
}
