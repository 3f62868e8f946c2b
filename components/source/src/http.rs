use hyper::{body::Bytes, Body, Client, Uri};
use hyper_tls::HttpsConnector;
use log::debug;

use crate::error::SourceError;

/// Parse `location` as an absolute `http` or `https` URL.
pub(crate) fn parse_url(location: &str) -> Option<Uri> {
    let uri = location.parse::<Uri>().ok()?;
    match uri.scheme_str() {
        Some("http") | Some("https") if uri.host().is_some() => Some(uri),
        _ => None,
    }
}

/// Download the whole trace on a throwaway current-thread runtime.
///
/// The analyzer is synchronous; this is the only place that blocks on network I/O.
pub(crate) fn fetch(uri: &Uri) -> Result<Bytes, SourceError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let client = Client::builder().build::<_, Body>(HttpsConnector::new());
        let response = client.get(uri.clone()).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: uri.to_string(),
                status: status.as_u16(),
            });
        }
        let body = hyper::body::to_bytes(response.into_body()).await?;
        debug!("Fetched {} bytes from {}", body.len(), uri);
        Ok(body)
    })
}
