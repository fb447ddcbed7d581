use super::config::ConfigError;
use crate::core::forcefield::ForceFieldType;
use crate::core::io::amber::{AmberFrcmodFile, AmberParmFile};
use crate::core::io::error::ReadError;
use crate::core::io::ffld::FfldFile;
use crate::core::io::native::NativeFile;
use crate::core::io::traits::{MassTable, ParameterFormat, ParsedParameters, ReadContext};
use crate::core::io::writer::{PrmWriter, Selection};
use crate::core::io::xref::{ReferenceLoadError, StructureReference};
use crate::core::params::ParamRecord;
use crate::core::policy::ErrorPolicy;
use crate::core::store::{MergeOutcome, ParameterStore, StoreError};
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: ReadError,
    },
    #[error("Failed to merge '{path}': {source}")]
    Merge {
        path: String,
        #[source]
        source: StoreError,
    },
    #[error("Failed to load structure reference: {0}")]
    Reference(#[from] ReferenceLoadError),
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// What ingesting one file did to the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub inserted: usize,
    pub duplicates: usize,
    /// Records replaced under the relaxed policy, as they were before the file was read.
    pub overwritten: Vec<ParamRecord>,
    /// Options replaced under the relaxed policy, with their previous values.
    pub options_overwritten: Vec<(String, String)>,
}

/// A parameter store together with the state that outlives a single file: the error policy
/// and the masses collected from Amber files.
///
/// Every `read_*` method is all-or-nothing: the file is merged into a working copy of the
/// store, and the repository only changes when the whole file merged.
#[derive(Debug, Clone)]
pub struct ParameterRepository {
    store: ParameterStore,
    policy: ErrorPolicy,
    amber_masses: MassTable,
}

impl ParameterRepository {
    pub fn new(ff_type: ForceFieldType) -> Self {
        Self {
            store: ParameterStore::new(ff_type),
            policy: ErrorPolicy::default(),
            amber_masses: MassTable::new(),
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn ff_type(&self) -> ForceFieldType {
        self.store.ff_type()
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn amber_masses(&self) -> &MassTable {
        &self.amber_masses
    }

    /// Sets an option unconditionally, returning the previous value.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.store.set_option(key, value)
    }

    pub fn read_prm<P: AsRef<Path>>(&mut self, path: P) -> Result<IngestReport, RepositoryError> {
        self.ingest::<NativeFile>(path.as_ref(), None)
    }

    pub fn read_amber_parm<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<IngestReport, RepositoryError> {
        self.ingest::<AmberParmFile>(path.as_ref(), None)
    }

    pub fn read_amber_frcmod<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<IngestReport, RepositoryError> {
        self.ingest::<AmberFrcmodFile>(path.as_ref(), None)
    }

    pub fn read_ffld<P: AsRef<Path>>(
        &mut self,
        path: P,
        structure: &StructureReference,
    ) -> Result<IngestReport, RepositoryError> {
        self.ingest::<FfldFile>(path.as_ref(), Some(structure))
    }

    pub fn to_prm_string(&self) -> String {
        PrmWriter::new(&self.store).render()
    }

    /// Renders only the selected records; classes left as `None` are written in full.
    pub fn to_prm_string_with(&self, selection: Selection<'_>) -> String {
        PrmWriter::new(&self.store).with_selection(selection).render()
    }

    pub fn write_prm<P: AsRef<Path>>(&self, path: P) -> Result<(), RepositoryError> {
        let path = path.as_ref();
        PrmWriter::new(&self.store)
            .write_to_path(path)
            .map_err(|source| RepositoryError::Write {
                path: path.display().to_string(),
                source,
            })?;
        info!("Wrote {} parameters to '{}'", self.store.len(), path.display());
        Ok(())
    }

    fn ingest<F: ParameterFormat>(
        &mut self,
        path: &Path,
        structure: Option<&StructureReference>,
    ) -> Result<IngestReport, RepositoryError> {
        let path_str = path.display().to_string();
        debug!("Reading {} file '{}'", F::NAME, path_str);

        let mut ctx = ReadContext::new(self.store.ff_type(), self.policy).with_masses(&self.amber_masses);
        if let Some(structure) = structure {
            ctx = ctx.with_structure(structure);
        }
        let parsed = F::read_from_path(path, &ctx).map_err(|source| RepositoryError::Read {
            path: path_str.clone(),
            source,
        })?;

        let report = self
            .commit(parsed)
            .map_err(|source| RepositoryError::Merge {
                path: path_str.clone(),
                source,
            })?;

        info!(
            "Ingested {} file '{}': {} new, {} duplicate, {} overwritten",
            F::NAME,
            path_str,
            report.inserted,
            report.duplicates,
            report.overwritten.len()
        );
        Ok(report)
    }

    fn commit(&mut self, mut parsed: ParsedParameters) -> Result<IngestReport, StoreError> {
        let options = std::mem::take(&mut parsed.options);
        let masses = std::mem::take(&mut parsed.masses);
        let mut working = self.store.clone();
        let mut report = IngestReport::default();

        for (key, value) in options {
            if let MergeOutcome::Overwritten(previous) =
                working.merge_option(&key, &value, self.policy)?
            {
                report.options_overwritten.push((key, previous));
            }
        }

        for record in parsed.into_records() {
            match working.merge(record, self.policy)? {
                MergeOutcome::Inserted => report.inserted += 1,
                MergeOutcome::Duplicate => report.duplicates += 1,
                MergeOutcome::Overwritten(previous) => report.overwritten.push(previous),
            }
        }

        self.store = working;
        self.amber_masses.extend(masses);
        Ok(report)
    }
}
