//! Transport layer: wire-format details (parameter building, signing, envelope decoding).

mod mail;
mod params;
mod response;
mod sign;
mod sms;

pub use mail::encode_mail_params;
pub use params::{FORM_CONTENT_TYPE, FieldValue, ParameterSet, RequestBody};
pub use response::{decode_error_message, decode_send_result};
pub use sign::sign;
#[cfg(test)]
pub use sign::signature;
pub use sms::encode_sms_params;

/// A message could not be turned into request parameters.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("failed to encode {field} as JSON: {source}")]
    Json {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read attachment {name:?}: {source}")]
    Attachment {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

fn to_json<T: serde::Serialize + ?Sized>(
    field: &'static str,
    value: &T,
) -> Result<String, EncodingError> {
    serde_json::to_string(value).map_err(|source| EncodingError::Json { field, source })
}
