use crate::core::forcefield::ForceFieldType;
use crate::core::policy::ErrorPolicy;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("At least one input file is required")]
    NoInputs,
    #[error("FFLD input '{path}' needs a structure reference")]
    MissingStructure { path: PathBuf },
}

/// On-disk parameter formats the repository can ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    Prm,
    AmberParm,
    AmberFrcmod,
    Ffld,
}

impl InputFormat {
    pub fn name(self) -> &'static str {
        match self {
            InputFormat::Prm => "prm",
            InputFormat::AmberParm => "amber-parm",
            InputFormat::AmberFrcmod => "amber-frcmod",
            InputFormat::Ffld => "ffld",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Input format '{0}' not supported. Use prm, amber-parm, amber-frcmod, ffld")]
pub struct UnknownInputFormatError(pub String);

impl FromStr for InputFormat {
    type Err = UnknownInputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prm" => Ok(InputFormat::Prm),
            "amber-parm" | "parm" => Ok(InputFormat::AmberParm),
            "amber-frcmod" | "frcmod" => Ok(InputFormat::AmberFrcmod),
            "ffld" => Ok(InputFormat::Ffld),
            other => Err(UnknownInputFormatError(other.to_string())),
        }
    }
}

/// One file to ingest. FFLD inputs also name the CSV atom list of their structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub format: InputFormat,
    pub path: PathBuf,
    pub structure: Option<PathBuf>,
}

impl InputSpec {
    pub fn new(format: InputFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
            structure: None,
        }
    }

    pub fn with_structure(mut self, structure: impl Into<PathBuf>) -> Self {
        self.structure = Some(structure.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    pub ff_type: ForceFieldType,
    pub policy: ErrorPolicy,
    /// Ingested in order; later files win conflicts under the relaxed policy.
    pub inputs: Vec<InputSpec>,
    /// Set after every input is read, replacing options read from the files.
    pub options: Vec<(String, String)>,
    pub output: Option<PathBuf>,
}

#[derive(Default)]
pub struct ConversionConfigBuilder {
    ff_type: Option<ForceFieldType>,
    policy: ErrorPolicy,
    inputs: Vec<InputSpec>,
    options: Vec<(String, String)>,
    output: Option<PathBuf>,
}

impl ConversionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ff_type(mut self, ff_type: ForceFieldType) -> Self {
        self.ff_type = Some(ff_type);
        self
    }
    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }
    pub fn input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }
    pub fn inputs(mut self, inputs: impl IntoIterator<Item = InputSpec>) -> Self {
        self.inputs.extend(inputs);
        self
    }
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }
    pub fn output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }

    pub fn build(self) -> Result<ConversionConfig, ConfigError> {
        let ff_type = self.ff_type.ok_or(ConfigError::MissingParameter("ff_type"))?;
        if self.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        if let Some(input) = self
            .inputs
            .iter()
            .find(|i| i.format == InputFormat::Ffld && i.structure.is_none())
        {
            return Err(ConfigError::MissingStructure {
                path: input.path.clone(),
            });
        }

        Ok(ConversionConfig {
            ff_type,
            policy: self.policy,
            inputs: self.inputs,
            options: self.options,
            output: self.output,
        })
    }
}
