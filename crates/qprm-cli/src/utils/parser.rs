use qprm::workflows::config::{InputFormat, InputSpec};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid input '{0}'. Expected 'format:path' (e.g., 'amber-parm:parm10.dat').")]
    InvalidInputFormat(String),

    #[error("Unknown input format '{format}' in '{input}'. Expected prm, amber-parm, amber-frcmod or ffld.")]
    UnknownFormat { format: String, input: String },

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// Parses `format:path`, or `ffld:path@structure.csv` for FFLD files. Other formats keep any
/// `@` as part of the path.
pub fn parse_input(input: &str) -> Result<InputSpec, ParseError> {
    let (format, rest) = input
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidInputFormat(input.to_string()))?;
    let format: InputFormat = format.parse().map_err(|_| ParseError::UnknownFormat {
        format: format.to_string(),
        input: input.to_string(),
    })?;

    let (path, structure) = match (format, rest.rsplit_once('@')) {
        (InputFormat::Ffld, Some((path, structure))) => (path, Some(structure)),
        _ => (rest, None),
    };

    if path.trim().is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "path",
            input: input.to_string(),
        });
    }
    let input_file = InputSpec::new(format, path.trim());
    match structure.map(str::trim) {
        Some("") => Err(ParseError::EmptyComponent {
            component: "structure",
            input: input.to_string(),
        }),
        Some(structure) => Ok(input_file.with_structure(structure)),
        None => Ok(input_file),
    }
}

/// Parses `key=value`; the value may itself contain `=`.
pub fn parse_key_value(pair: &str) -> Result<(String, String), ParseError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidKeyValue(pair.to_string()))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: pair.to_string(),
        });
    }
    Ok((key.to_string(), value.to_string()))
}
