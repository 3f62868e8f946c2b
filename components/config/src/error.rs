use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Trace source name must not be empty")]
    EmptySource,

    #[error("Configuration file `{0}` does not exist")]
    FileNotExists(String),

    #[error("An IO error raised")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
