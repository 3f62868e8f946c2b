use config::error::ConfigurationError;
use scan::ScanError;
use source::SourceError;
use thiserror::Error;

/// Exit statuses, errno style.
pub mod exit_code {
    /// `ENOENT`: the trace could not be located.
    pub const SOURCE_NOT_FOUND: i32 = 2;

    /// `EIO`: reading the trace or writing the report failed.
    pub const IO: i32 = 5;

    /// `EINVAL`: configuration or log configuration is invalid.
    pub const INVALID_CONFIGURATION: i32 = 22;
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Unable to locate log file `{0}`, please check the name.")]
    SourceNotFound(String),

    #[error("Failed to read trace")]
    Source(#[source] SourceError),

    #[error("Internal IO error")]
    Io(#[from] std::io::Error),

    #[error("Failed to write report")]
    Scan(#[from] ScanError),

    #[error("Invalid configuration")]
    Configuration(#[from] ConfigurationError),
}

impl From<SourceError> for AnalyzerError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::NotFound(name) => AnalyzerError::SourceNotFound(name),
            e => AnalyzerError::Source(e),
        }
    }
}

impl AnalyzerError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalyzerError::SourceNotFound(_) => exit_code::SOURCE_NOT_FOUND,
            AnalyzerError::Configuration(_) => exit_code::INVALID_CONFIGURATION,
            AnalyzerError::Source(_) | AnalyzerError::Io(_) | AnalyzerError::Scan(_) => {
                exit_code::IO
            }
        }
    }
}
