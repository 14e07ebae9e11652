//! Domain layer: message types, credentials and validation rules (no I/O).

mod mail;
mod response;
mod sms;
mod validation;
mod value;

pub use mail::{
    Attachment, CalendarMail, CommonMail, Filter, FilterSettings, MAIL_MAX_ADDRESS_LISTS,
    MAIL_MAX_RECEIVERS, MailBody, MailCalendar, MailMessage, MailReceiver, Settings,
    TemplateContent, TemplateMail, TextContent, TrackingFilter, UnsubscribeSettings, Xsmtpapi,
};
pub use response::SendResult;
pub use sms::{
    CodeSms, SEND_REQUEST_ID_MAX_LEN, SMS_MAX_PHONES, SmsMessage, TemplateSms, VoiceSms,
    validate_phone_numbers,
};
pub use validation::{ConfigError, ValidationError};
pub use value::{ApiKey, ApiUser, MsgType, SmsKey, SmsUser};
