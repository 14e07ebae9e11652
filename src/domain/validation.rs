use std::fmt;

/// A message rejected before any request is issued.
///
/// Validation is deterministic: the same input always fails with the same variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyRecipients,
    TooManyReceivers { max: usize, actual: usize },
    TooManyAddressLists { max: usize, actual: usize },
    BadPlaceholderFormat { key: String },
    SubstitutionLengthMismatch { key: String, expected: usize, actual: usize },
    InvalidTrackingFlag { filter: &'static str, value: String },
    MissingFrom,
    MissingSubject,
    MissingContent,
    MissingTemplate,
    MissingCalendarField { field: &'static str },
    InvalidTimeRange,
    EmptyPhone,
    TooManyPhones { max: usize, actual: usize },
    MissingTemplateId,
    InvalidMsgType { value: i32 },
    RequestIdTooLong { max: usize, actual: usize },
    MissingCode,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRecipients => f.write_str("to cannot be empty"),
            Self::TooManyReceivers { max, actual } => {
                write!(f, "too many receivers: {actual} (max {max})")
            }
            Self::TooManyAddressLists { max, actual } => {
                write!(f, "too many address lists: {actual} (max {max})")
            }
            Self::BadPlaceholderFormat { key } => {
                write!(f, "substitution key {key:?} must be in the format '%...%'")
            }
            Self::SubstitutionLengthMismatch {
                key,
                expected,
                actual,
            } => write!(
                f,
                "sub[{key}] has {actual} values but there are {expected} recipients"
            ),
            Self::InvalidTrackingFlag { filter, value } => {
                write!(f, "{filter} enable must be \"0\" or \"1\", got {value:?}")
            }
            Self::MissingFrom => f.write_str("from cannot be empty"),
            Self::MissingSubject => f.write_str("subject cannot be empty"),
            Self::MissingContent => f.write_str("html or plain cannot be empty"),
            Self::MissingTemplate => f.write_str("templateInvokeName cannot be empty"),
            Self::MissingCalendarField { field } => write!(f, "{field} cannot be empty"),
            Self::InvalidTimeRange => f.write_str("startTime cannot be after endTime"),
            Self::EmptyPhone => f.write_str("phone cannot be empty"),
            Self::TooManyPhones { max, actual } => {
                write!(f, "too many phone numbers: {actual} (max {max})")
            }
            Self::MissingTemplateId => f.write_str("templateId cannot be empty"),
            Self::InvalidMsgType { value } => write!(f, "msgType {value} is not supported"),
            Self::RequestIdTooLong { max, actual } => {
                write!(f, "sendRequestId is {actual} characters long (max {max})")
            }
            Self::MissingCode => f.write_str("code cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Client configuration rejected at construction or call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Empty { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ValidationError};

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::TooManyReceivers {
            max: 100,
            actual: 101,
        };
        assert_eq!(err.to_string(), "too many receivers: 101 (max 100)");

        let err = ValidationError::BadPlaceholderFormat {
            key: "name".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "substitution key \"name\" must be in the format '%...%'"
        );

        let err = ValidationError::SubstitutionLengthMismatch {
            key: "%name%".to_owned(),
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "sub[%name%] has 1 values but there are 2 recipients"
        );

        let err = ValidationError::InvalidTrackingFlag {
            filter: "open_tracking",
            value: "yes".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "open_tracking enable must be \"0\" or \"1\", got \"yes\""
        );

        let err = ValidationError::MissingCalendarField { field: "location" };
        assert_eq!(err.to_string(), "location cannot be empty");

        let err = ValidationError::InvalidMsgType { value: 99 };
        assert_eq!(err.to_string(), "msgType 99 is not supported");
    }

    #[test]
    fn config_error_names_the_field() {
        let err = ConfigError::Empty { field: "apiKey" };
        assert_eq!(err.to_string(), "apiKey cannot be empty");
    }
}
