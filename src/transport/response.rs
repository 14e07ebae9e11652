use serde::Deserialize;

use crate::domain::SendResult;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
struct SendResultJson {
    #[serde(default)]
    result: bool,
    #[serde(default, rename = "statusCode")]
    status_code: i32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    info: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorJson {
    #[serde(default)]
    message: Option<String>,
}

/// Decode the `{result, statusCode, message, info}` envelope of an HTTP 200 response.
///
/// The envelope's own `statusCode` is not interpreted here.
pub fn decode_send_result(json: &str) -> Result<SendResult, DecodeError> {
    let parsed: SendResultJson = serde_json::from_str(json)?;
    Ok(SendResult {
        success: parsed.result,
        status_code: parsed.status_code,
        message: parsed.message.unwrap_or_default(),
        info: parsed.info,
    })
}

/// Best-effort `message` extraction from an error body; empty when undecodable.
pub fn decode_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorJson>(body)
        .ok()
        .and_then(|it| it.message)
        .unwrap_or_default()
}
