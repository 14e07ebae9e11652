/// Accepted send, decoded from the `{result, statusCode, message, info}` envelope.
///
/// `info` is passed through untouched; per-recipient outcomes are not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct SendResult {
    pub success: bool,
    pub status_code: i32,
    pub message: String,
    pub info: serde_json::Value,
}
