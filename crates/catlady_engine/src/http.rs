use futures_util::StreamExt;

use crate::{ApiSettings, FailureKind, ImageError};

/// Builds the HTTP client shared by token and feed requests.
pub fn build_client(settings: &ApiSettings) -> Result<reqwest::Client, ImageError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| ImageError::new(FailureKind::Transport, err.to_string()))
}

/// Reads a response body, refusing to buffer more than `max_bytes`.
/// Oversized bodies fail with `overflow_kind`.
pub(crate) async fn read_body(
    response: reqwest::Response,
    max_bytes: u64,
    overflow_kind: FailureKind,
) -> Result<Vec<u8>, ImageError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(ImageError::new(
                overflow_kind,
                format!("response too large (max {max_bytes}, actual {content_len})"),
            ));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(ImageError::new(
                overflow_kind,
                format!("response too large (max {max_bytes}, read {next_len})"),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ImageError {
    if err.is_timeout() {
        return ImageError::new(FailureKind::Timeout, err.to_string());
    }
    ImageError::new(FailureKind::Transport, err.to_string())
}
