use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unable to locate log file `{0}`")]
    NotFound(String),

    #[error("Internal IO error")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed")]
    Http(#[from] hyper::Error),

    #[error("Fetching `{url}` returned status {status}")]
    Status { url: String, status: u16 },
}
