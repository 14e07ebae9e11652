//! Client layer: orchestrates validation, parameter building, signing and dispatch.

mod context;
mod mail;
mod sms;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::domain::{ConfigError, SendResult, ValidationError};
use crate::transport::{
    EncodingError, FORM_CONTENT_TYPE, FieldValue, ParameterSet, RequestBody,
    decode_error_message, decode_send_result,
};

pub use context::{CallContext, CancelHandle, CancelReason};
pub use mail::{MailAuth, MailClient, MailClientBuilder};
pub use sms::{SmsAuth, SmsClient, SmsClientBuilder};

const HTTP_OK: u16 = 200;
const HTTP_NOT_FOUND: u16 = 404;
const API_OK: i32 = 200;
const METHOD: &str = "POST";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone)]
struct HttpRequest {
    url: String,
    body: RequestBody,
    timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let mut builder = match request.body {
                RequestBody::Form(encoded) => self
                    .client
                    .post(&request.url)
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(encoded),
                RequestBody::Multipart(params) => {
                    self.client.post(&request.url).multipart(multipart_form(params))
                }
            };
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = if status == HTTP_NOT_FOUND {
                String::new()
            } else {
                response.text().await?
            };
            Ok(HttpResponse { status, body })
        })
    }
}

fn multipart_form(params: ParameterSet) -> Form {
    params
        .into_entries()
        .into_iter()
        .fold(Form::new(), |form, (key, value)| match value {
            FieldValue::Text(text) => form.text(key, text),
            FieldValue::File { file_name, content } => {
                form.part(key, Part::bytes(content).file_name(file_name))
            }
        })
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`MailClient`] and [`SmsClient`].
///
/// Nothing is retried: transport failures may be transient, every other
/// variant is deterministic for the same input.
pub enum SendCloudError {
    /// Missing or empty credentials.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The message broke one of the API constraints; no request was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A sub-object could not be serialized or an attachment could not be read.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// HTTP client / network failure (DNS, TLS, connection reset, ...).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The call's deadline passed or its cancel signal fired while the request was in flight.
    #[error("{0}")]
    Cancelled(CancelReason),

    /// Non-200 HTTP status, or an HTTP 200 envelope whose `statusCode` is not 200.
    #[error("{method} {url}: {status} {message}")]
    Api {
        method: &'static str,
        url: String,
        status: u16,
        /// The envelope `statusCode`, when the error came from a decoded envelope.
        status_code: Option<i32>,
        message: String,
    },

    /// An HTTP 200 body that is not a result envelope.
    #[error("parse error: {0}")]
    Parse(#[source] BoxError),
}

#[derive(Debug, Clone, Default)]
/// HTTP settings shared by the client builders.
struct HttpSettings {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    client: Option<reqwest::Client>,
}

impl HttpSettings {
    fn build(self) -> Result<Dispatcher, SendCloudError> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                builder
                    .build()
                    .map_err(|err| SendCloudError::Transport(Box::new(err)))?
            }
        };
        Ok(Dispatcher::new(ReqwestTransport { client }))
    }
}

#[derive(Clone)]
struct Dispatcher {
    http: Arc<dyn HttpTransport>,
}

impl Dispatcher {
    fn new(transport: impl HttpTransport + 'static) -> Self {
        Self {
            http: Arc::new(transport),
        }
    }

    fn with_default_client() -> Self {
        Self::new(ReqwestTransport {
            client: reqwest::Client::new(),
        })
    }

    /// Issue one POST and classify the outcome.
    async fn send(
        &self,
        url: String,
        params: ParameterSet,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        let fields = params.len();
        let body = params.into_body();
        debug!(
            url = %url,
            multipart = body.is_multipart(),
            fields,
            "sending SendCloud request"
        );

        let request = HttpRequest {
            url: url.clone(),
            body,
            timeout: ctx.remaining(),
        };
        let outcome = tokio::select! {
            outcome = self.http.post(request) => outcome,
            reason = ctx.cancelled() => Err(Box::new(reason) as BoxError),
        };
        let response = outcome.map_err(|err| match ctx.resolved() {
            Some(reason) => SendCloudError::Cancelled(reason),
            None => SendCloudError::Transport(err),
        })?;

        debug!(url = %url, status = response.status, "received SendCloud response");
        interpret_response(url, response)
    }
}

fn interpret_response(url: String, response: HttpResponse) -> Result<SendResult, SendCloudError> {
    match response.status {
        HTTP_OK => {
            let result = decode_send_result(&response.body)
                .map_err(|err| SendCloudError::Parse(Box::new(err)))?;
            if result.status_code != API_OK {
                return Err(SendCloudError::Api {
                    method: METHOD,
                    url,
                    status: response.status,
                    status_code: Some(result.status_code),
                    message: result.message,
                });
            }
            debug!(status_code = result.status_code, "SendCloud accepted request");
            Ok(result)
        }
        HTTP_NOT_FOUND => Err(SendCloudError::Api {
            method: METHOD,
            url,
            status: response.status,
            status_code: None,
            message: "Not Found".to_owned(),
        }),
        status => Err(SendCloudError::Api {
            method: METHOD,
            url,
            status,
            status_code: None,
            message: decode_error_message(&response.body),
        }),
    }
}

/// Join a configured base URL and an endpoint path; an empty base falls back to `default`.
fn endpoint(base_url: &str, default: &str, path: &str) -> String {
    let base = base_url.trim();
    let base = if base.is_empty() { default } else { base };
    format!("{}{path}", base.trim_end_matches('/'))
}
