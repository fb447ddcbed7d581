use super::config::{ConfigError, ConversionConfig, InputFormat, InputSpec};
use super::repository::{IngestReport, ParameterRepository, RepositoryError};
use crate::core::io::xref::StructureReference;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub repository: ParameterRepository,
    /// One report per input, in input order.
    pub reports: Vec<IngestReport>,
}

impl ConversionOutcome {
    pub fn total_overwritten(&self) -> usize {
        self.reports.iter().map(|r| r.overwritten.len()).sum()
    }
}

/// Reads every input of `config` into one repository, applies the configured options and, when
/// an output path is set, writes the Q parameter file.
///
/// The first failing input aborts the run; inputs read before it are not written anywhere.
#[instrument(skip_all, name = "conversion_workflow")]
pub fn run(config: &ConversionConfig) -> Result<ConversionOutcome, RepositoryError> {
    info!(
        "Starting conversion of {} input(s) into a '{}' parameter set.",
        config.inputs.len(),
        config.ff_type
    );

    let mut repository = ParameterRepository::new(config.ff_type).with_policy(config.policy);
    let mut reports = Vec::with_capacity(config.inputs.len());
    for input in &config.inputs {
        reports.push(ingest(&mut repository, input)?);
    }

    for (key, value) in &config.options {
        if let Some(previous) = repository.set_option(key.as_str(), value.as_str()) {
            debug!("Option '{}' changed from '{}' to '{}'", key, previous, value);
        }
    }

    if let Some(output) = &config.output {
        repository.write_prm(output)?;
    }

    let outcome = ConversionOutcome {
        repository,
        reports,
    };
    info!(
        "Conversion complete: {} parameters, {} overwritten.",
        outcome.repository.store().len(),
        outcome.total_overwritten()
    );
    Ok(outcome)
}

#[instrument(skip(repository), fields(format = %input.format, path = %input.path.display()))]
fn ingest(
    repository: &mut ParameterRepository,
    input: &InputSpec,
) -> Result<IngestReport, RepositoryError> {
    match input.format {
        InputFormat::Prm => repository.read_prm(&input.path),
        InputFormat::AmberParm => repository.read_amber_parm(&input.path),
        InputFormat::AmberFrcmod => repository.read_amber_frcmod(&input.path),
        InputFormat::Ffld => {
            let structure_path =
                input
                    .structure
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingStructure {
                        path: input.path.clone(),
                    })?;
            let structure = StructureReference::load(structure_path)?;
            repository.read_ffld(&input.path, &structure)
        }
    }
}
