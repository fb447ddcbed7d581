use crate::cli::InputArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use qprm::core::forcefield::ForceFieldType;
use qprm::core::policy::ErrorPolicy;
use qprm::workflows::config::{ConversionConfig, ConversionConfigBuilder, InputFormat, InputSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialInput {
    format: InputFormat,
    path: PathBuf,
    structure: Option<PathBuf>,
}

impl PartialInput {
    fn into_input(self, base_dir: Option<&Path>) -> InputSpec {
        let input_file = InputSpec::new(self.format, resolve(base_dir, self.path));
        match self.structure {
            Some(structure) => input_file.with_structure(resolve(base_dir, structure)),
            None => input_file,
        }
    }
}

/// A TOML job file. Relative paths in it are taken relative to the file itself.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialConversionConfig {
    ff_type: Option<ForceFieldType>,
    relaxed: Option<bool>,
    output: Option<PathBuf>,
    #[serde(default, rename = "input")]
    inputs: Vec<PartialInput>,
    #[serde(default)]
    options: toml::Table,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl PartialConversionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading job file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Loads the job file named by `--config`, or starts from an empty one.
    pub fn load(args: &InputArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Combines the job file with command-line arguments; the command line wins. Inputs given
    /// on the command line replace the job file's inputs, options from `--set` are applied
    /// after the job file's options.
    pub fn merge_with_cli(
        self,
        args: &InputArgs,
        output: Option<&Path>,
    ) -> Result<ConversionConfig> {
        let base_dir = self.base_dir.as_deref();

        let ff_type = args.ff_type.or(self.ff_type).ok_or_else(|| {
            CliError::Config(
                "A force-field type is required either in the job file (`ff-type`) or via --ff-type."
                    .to_string(),
            )
        })?;
        let policy = ErrorPolicy::from_relaxed(args.relaxed || self.relaxed.unwrap_or(false));

        let inputs: Vec<InputSpec> = if args.inputs.is_empty() {
            self.inputs
                .into_iter()
                .map(|input| input.into_input(base_dir))
                .collect()
        } else {
            args.inputs
                .iter()
                .map(|input| {
                    parser::parse_input(input).map_err(|e| CliError::Argument(e.to_string()))
                })
                .collect::<Result<_>>()?
        };

        let mut builder = ConversionConfigBuilder::new()
            .ff_type(ff_type)
            .policy(policy)
            .inputs(inputs);

        for (key, value) in self.options {
            builder = builder.option(key, option_value(value));
        }
        for pair in &args.set_values {
            let (key, value) =
                parser::parse_key_value(pair).map_err(|e| CliError::Config(e.to_string()))?;
            builder = builder.option(key, value);
        }

        let output = output
            .map(Path::to_path_buf)
            .or_else(|| self.output.map(|p| resolve(base_dir, p)));
        if let Some(output) = output {
            builder = builder.output(output);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}

fn resolve(base_dir: Option<&Path>, path: PathBuf) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

fn option_value(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    }
}
