use std::fmt;

use crate::domain::validation::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SendCloud email API user (`apiUser`).
///
/// Invariant: non-empty after trimming.
pub struct ApiUser(String);

impl ApiUser {
    /// Form field name used by SendCloud (`apiUser`).
    pub const FIELD: &'static str = "apiUser";

    /// Create a validated [`ApiUser`].
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated user.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// SendCloud email API key (`apiKey`).
///
/// Invariant: must not be empty (whitespace is preserved). Redacted in `Debug` output.
pub struct ApiKey(String);

impl ApiKey {
    /// Form field name used by SendCloud (`apiKey`).
    pub const FIELD: &'static str = "apiKey";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ConfigError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the key as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(/* REDACTED */)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SendCloud SMS user (`smsUser`).
///
/// Invariant: non-empty after trimming.
pub struct SmsUser(String);

impl SmsUser {
    /// Form field name used by SendCloud (`smsUser`).
    pub const FIELD: &'static str = "smsUser";

    /// Create a validated [`SmsUser`].
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated user.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// SendCloud SMS key (`smsKey`), the shared secret used for request signatures.
///
/// Invariant: must not be empty. Never sent on the wire and redacted in `Debug` output.
pub struct SmsKey(String);

impl SmsKey {
    /// Parameter name the signer excludes (`smsKey`).
    pub const FIELD: &'static str = "smsKey";

    /// Create a validated [`SmsKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ConfigError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the secret as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SmsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SmsKey(/* REDACTED */)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Message types accepted by the SMS API (`msgType`).
///
/// Requests carry the raw integer so that unknown values can be rejected by validation.
pub enum MsgType {
    Sms,
    Mms,
    InternationalSms,
    Voice,
    QrCode,
    Yx,
}

impl MsgType {
    /// Convert a raw `msgType` integer into a known variant.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Sms,
            1 => Self::Mms,
            2 => Self::InternationalSms,
            3 => Self::Voice,
            4 => Self::QrCode,
            5 => Self::Yx,
            _ => return None,
        })
    }

    /// The integer sent on the wire.
    pub fn code(self) -> i32 {
        match self {
            Self::Sms => 0,
            Self::Mms => 1,
            Self::InternationalSms => 2,
            Self::Voice => 3,
            Self::QrCode => 4,
            Self::Yx => 5,
        }
    }
}

impl From<MsgType> for i32 {
    fn from(value: MsgType) -> Self {
        value.code()
    }
}
