use gloo::net::http::Request;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered {status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("could not read response: {0}")]
    Body(String),
}

/// Fetches an HTML fragment. Anything but a 200 is an error.
pub(crate) async fn fetch_fragment(url: &str) -> Result<String, FetchError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|err| FetchError::Transport(err.to_string()))?;
    if response.status() != 200 {
        return Err(FetchError::Status {
            status: response.status(),
            status_text: response.status_text(),
        });
    }
    response
        .text()
        .await
        .map_err(|err| FetchError::Body(err.to_string()))
}
