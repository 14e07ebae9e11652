//! Typed Rust client for the SendCloud email and SMS HTTP APIs.
//!
//! The crate is split into a domain layer of message types and validation
//! rules, a transport layer for wire-format details (form/multipart encoding,
//! request signing, envelope decoding), and a small client layer orchestrating
//! requests.
//!
//! ```rust,no_run
//! use sendcloud::{CallContext, CommonMail, MailAuth, MailBody, MailClient, MailReceiver, TextContent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sendcloud::SendCloudError> {
//!     let client = MailClient::new(MailAuth::new("api-user", "api-key")?);
//!     let mail = CommonMail {
//!         receiver: MailReceiver::to("a@example.com;b@example.com"),
//!         body: MailBody::new("noreply@example.com", "hello"),
//!         content: TextContent::html("<p>hi</p>"),
//!     };
//!     let result = client.send(mail, &CallContext::new()).await?;
//!     println!("{}", result.message);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    CallContext, CancelHandle, CancelReason, MailAuth, MailClient, MailClientBuilder,
    SendCloudError, SmsAuth, SmsClient, SmsClientBuilder,
};
pub use domain::{
    ApiKey, ApiUser, Attachment, CalendarMail, CodeSms, CommonMail, ConfigError, Filter,
    FilterSettings, MailBody, MailCalendar, MailMessage, MailReceiver, MsgType, SendResult,
    Settings, SmsKey, SmsMessage, SmsUser, TemplateContent, TemplateMail, TemplateSms,
    TextContent, TrackingFilter, UnsubscribeSettings, ValidationError, VoiceSms, Xsmtpapi,
};
pub use transport::EncodingError;
