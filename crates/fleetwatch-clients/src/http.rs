//! Shared HTTP helpers

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};

/// Build the HTTP client shared by all service clients.
///
/// `timeout` applies to every request and is the only bound on how long a
/// single remote call may take.
pub fn build_http_client(timeout: Duration) -> ClientResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Append path segments to `base`, percent-encoding each one.
pub(crate) fn segment_url(base: &str, segments: &[&str]) -> ClientResult<Url> {
    let mut url = Url::parse(base).map_err(|e| ClientError::Url(format!("{}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ClientError::Url(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Decode a successful response or turn a failed one into [`ClientError::Api`].
pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: Response,
    caller: &str,
) -> ClientResult<T> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(format!("{}: {}", caller, e)))
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            caller: caller.to_string(),
            status: status.as_u16(),
            message,
        })
    }
}
