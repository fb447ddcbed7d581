use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// One atom of the structure an FFLD file was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferenceAtom {
    #[serde(rename = "atom")]
    pub name: String,
    pub residue: String,
}

impl ReferenceAtom {
    pub fn new(residue: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            residue: residue.into(),
        }
    }

    /// Atom-type name built from this atom: `residue.atom` with the residue lower-cased.
    pub fn atom_type(&self) -> String {
        format!("{}.{}", self.residue.to_lowercase(), self.name)
    }
}

#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Structure reference '{path}' contains no atoms")]
    Empty { path: String },
}

/// Ordered atom list matched position by position against the atoms of an FFLD file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReference {
    atoms: Vec<ReferenceAtom>,
}

impl StructureReference {
    pub fn new(atoms: Vec<ReferenceAtom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[ReferenceAtom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Loads the atom list from a CSV file with a `residue,atom` header.
    pub fn load(path: &Path) -> Result<Self, ReferenceLoadError> {
        let display = path.to_string_lossy().to_string();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| ReferenceLoadError::Csv {
                path: display.clone(),
                source: e,
            })?;
        let reference = Self::collect(reader, &display)?;
        if reference.is_empty() {
            return Err(ReferenceLoadError::Empty { path: display });
        }
        Ok(reference)
    }

    /// Reads the CSV atom list from any reader; `origin` names it in errors.
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self, ReferenceLoadError> {
        Self::collect(
            csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader),
            origin,
        )
    }

    fn collect<R: Read>(
        mut reader: csv::Reader<R>,
        origin: &str,
    ) -> Result<Self, ReferenceLoadError> {
        let atoms = reader
            .deserialize::<ReferenceAtom>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ReferenceLoadError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
        Ok(Self { atoms })
    }
}
