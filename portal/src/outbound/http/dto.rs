//! Wire shapes read from backend error responses.

use serde::Deserialize;

/// Optional JSON error body: `{ "message": ... }` or `{ "error": ... }`.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBodyDto {
    /// First non-blank of `message` then `error`.
    pub(super) fn into_message(self) -> Option<String> {
        [self.message, self.error]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

/// Parse a failure body, tolerating empty and non-JSON payloads.
pub(super) fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(ErrorBodyDto::into_message)
}
