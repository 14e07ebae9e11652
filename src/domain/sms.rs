use std::collections::BTreeMap;

use crate::domain::validation::ValidationError;
use crate::domain::value::MsgType;

/// Maximum number of comma-separated phone numbers per request.
pub const SMS_MAX_PHONES: usize = 2000;
/// Maximum length of `sendRequestId`, in characters.
pub const SEND_REQUEST_ID_MAX_LEN: usize = 128;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Templated SMS (`send`).
pub struct TemplateSms {
    pub template_id: i32,
    pub label_id: i32,
    /// Raw `msgType`; see [`MsgType`] for accepted values.
    pub msg_type: i32,
    /// Comma-separated phone numbers.
    pub phone: String,
    /// Template variables, sent as a JSON object.
    pub vars: BTreeMap<String, String>,
    pub send_request_id: String,
    pub tag: BTreeMap<String, String>,
}

impl TemplateSms {
    pub fn new(template_id: i32, msg_type: MsgType, phone: impl Into<String>) -> Self {
        Self {
            template_id,
            msg_type: msg_type.code(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.template_id == 0 {
            return Err(ValidationError::MissingTemplateId);
        }
        validate_msg_type(self.msg_type)?;
        if self.phone.is_empty() {
            return Err(ValidationError::EmptyPhone);
        }
        validate_send_request_id(&self.send_request_id)?;
        validate_phone_numbers(&self.phone)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Voice verification code (`sendVoice`).
pub struct VoiceSms {
    pub phone: String,
    pub code: String,
    pub label_id: i32,
    pub send_request_id: String,
    pub tag: BTreeMap<String, String>,
}

impl VoiceSms {
    pub fn new(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.is_empty() {
            return Err(ValidationError::MissingCode);
        }
        if self.phone.is_empty() {
            return Err(ValidationError::EmptyPhone);
        }
        validate_send_request_id(&self.send_request_id)?;
        validate_phone_numbers(&self.phone)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Text verification code (`sendCode`).
pub struct CodeSms {
    pub msg_type: i32,
    pub phone: String,
    pub sign_id: i32,
    pub sign_name: String,
    pub code: String,
    pub label_id: i32,
    pub send_request_id: String,
    pub tag: BTreeMap<String, String>,
}

impl CodeSms {
    pub fn new(msg_type: MsgType, phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.code(),
            phone: phone.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_msg_type(self.msg_type)?;
        if self.phone.is_empty() {
            return Err(ValidationError::EmptyPhone);
        }
        if self.code.is_empty() {
            return Err(ValidationError::MissingCode);
        }
        validate_send_request_id(&self.send_request_id)?;
        validate_phone_numbers(&self.phone)
    }
}

fn validate_msg_type(msg_type: i32) -> Result<(), ValidationError> {
    match MsgType::from_code(msg_type) {
        Some(_) => Ok(()),
        None => Err(ValidationError::InvalidMsgType { value: msg_type }),
    }
}

fn validate_send_request_id(id: &str) -> Result<(), ValidationError> {
    let len = id.chars().count();
    if len > SEND_REQUEST_ID_MAX_LEN {
        return Err(ValidationError::RequestIdTooLong {
            max: SEND_REQUEST_ID_MAX_LEN,
            actual: len,
        });
    }
    Ok(())
}

/// Check a comma-separated phone list: at most [`SMS_MAX_PHONES`] entries, none blank.
pub fn validate_phone_numbers(phone: &str) -> Result<(), ValidationError> {
    let numbers = phone.split(',').collect::<Vec<_>>();
    if numbers.len() > SMS_MAX_PHONES {
        return Err(ValidationError::TooManyPhones {
            max: SMS_MAX_PHONES,
            actual: numbers.len(),
        });
    }
    if numbers.iter().any(|it| it.trim().is_empty()) {
        return Err(ValidationError::EmptyPhone);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Any message the SMS API can send.
pub enum SmsMessage {
    Template(TemplateSms),
    Voice(VoiceSms),
    Code(CodeSms),
}

impl SmsMessage {
    /// Endpoint path relative to the SMS API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Template(_) => "/send",
            Self::Voice(_) => "/sendVoice",
            Self::Code(_) => "/sendCode",
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Template(sms) => sms.validate(),
            Self::Voice(sms) => sms.validate(),
            Self::Code(sms) => sms.validate(),
        }
    }
}

impl From<TemplateSms> for SmsMessage {
    fn from(value: TemplateSms) -> Self {
        Self::Template(value)
    }
}

impl From<VoiceSms> for SmsMessage {
    fn from(value: VoiceSms) -> Self {
        Self::Voice(value)
    }
}

impl From<CodeSms> for SmsMessage {
    fn from(value: CodeSms) -> Self {
        Self::Code(value)
    }
}
