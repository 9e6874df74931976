//! CLI error types
//!
//! Library errors are mapped to diagnostics with a help line. Every failure
//! exits with status 1.

use chartify_convert::ConvertError;
use chartify_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Input manifests or values could not be loaded
    #[error("Input error: {message}")]
    #[diagnostic(code(chartify::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// An option value was rejected
    #[error("Invalid option: {message}")]
    #[diagnostic(code(chartify::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error while writing the chart
    #[error("IO error: {message}")]
    #[diagnostic(code(chartify::cli::io))]
    Io { message: String },

    /// Anything else raised during conversion
    #[error("Conversion failed: {message}")]
    #[diagnostic(code(chartify::cli::convert))]
    Conversion { message: String },
}

impl CliError {
    fn input(message: impl Into<String>, help: &str) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.to_string()),
        }
    }

    fn usage(message: impl Into<String>, help: &str) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.to_string()),
        }
    }
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        let message = err.to_string();
        match err {
            ConvertError::Core(core) => match core {
                CoreError::InputPathMissing { .. } => {
                    CliError::input(message, "Pass an existing manifest file or directory")
                }
                CoreError::NoYamlFilesFound { .. } => CliError::input(
                    message,
                    "Directories are scanned recursively for *.yaml and *.yml files",
                ),
                CoreError::YamlParse { .. } => {
                    CliError::input(message, "Fix the YAML syntax in the file above")
                }
                CoreError::NoValidManifests { .. } => CliError::input(
                    message,
                    "Every document at this path is empty; at least one manifest is required",
                ),
                CoreError::ValuesFile { .. } => CliError::input(
                    message,
                    "The values file must contain a single YAML mapping",
                ),
                CoreError::Io(_) => CliError::Io { message },
                CoreError::Serialize(_) => CliError::Conversion { message },
            },
            ConvertError::InvalidCondition { .. } => CliError::usage(
                message,
                "Use a dotted values path such as `enableFeature` or `global.features.enabled`",
            ),
            ConvertError::InvalidChartVersion { .. } => {
                CliError::usage(message, "Chart versions must be SemVer 2, e.g. 0.1.0")
            }
            ConvertError::Write { .. } => CliError::Io { message },
            ConvertError::Yaml(_) => CliError::Conversion { message },
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
