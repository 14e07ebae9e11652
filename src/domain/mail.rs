use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::validation::ValidationError;

/// Maximum number of direct recipients across `to`, `cc` and `bcc`.
pub const MAIL_MAX_RECEIVERS: usize = 100;
/// Maximum number of address lists addressed in a single send.
pub const MAIL_MAX_ADDRESS_LISTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Who receives the mail.
///
/// Addresses are `;`-separated. With `use_address_list` set, `to` names
/// vendor-managed address lists instead of individual mailboxes.
pub struct MailReceiver {
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub use_address_list: bool,
}

impl MailReceiver {
    /// Receiver with only `to` set.
    pub fn to(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            ..Default::default()
        }
    }

    /// Receiver addressing one or more address lists (`;`-separated).
    pub fn address_lists(lists: impl Into<String>) -> Self {
        Self {
            to: lists.into(),
            use_address_list: true,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.to.is_empty() {
            return Err(ValidationError::EmptyRecipients);
        }

        if self.use_address_list {
            let lists = count_entries(&self.to);
            if lists > MAIL_MAX_ADDRESS_LISTS {
                return Err(ValidationError::TooManyAddressLists {
                    max: MAIL_MAX_ADDRESS_LISTS,
                    actual: lists,
                });
            }
        } else {
            let receivers =
                count_entries(&self.to) + count_entries(&self.cc) + count_entries(&self.bcc);
            if receivers > MAIL_MAX_RECEIVERS {
                return Err(ValidationError::TooManyReceivers {
                    max: MAIL_MAX_RECEIVERS,
                    actual: receivers,
                });
            }
        }
        Ok(())
    }
}

// Every `;` segment counts, so an empty field or a trailing `;` adds one.
fn count_entries(list: &str) -> usize {
    list.split(';').count()
}

/// A file attached to a mail.
///
/// The reader is borrowed for the duration of a single send and read to the
/// end exactly once while the request body is assembled. Closing the
/// underlying handle stays with the caller.
pub struct Attachment<'a> {
    name: String,
    reader: Box<dyn Read + Send + 'a>,
}

impl<'a> Attachment<'a> {
    pub fn new(name: impl Into<String>, reader: impl Read + Send + 'a) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// File name reported in the multipart part.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn reader(&mut self) -> &mut (dyn Read + Send + 'a) {
        &mut *self.reader
    }
}

impl fmt::Debug for Attachment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSettings {
    pub enable: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One tracking toggle; `enable` must be `"0"` or `"1"`.
pub struct TrackingFilter {
    pub settings: FilterSettings,
}

impl TrackingFilter {
    pub fn new(enable: bool) -> Self {
        let enable = if enable { "1" } else { "0" };
        Self {
            settings: FilterSettings {
                enable: enable.to_owned(),
            },
        }
    }

    fn validate(&self, filter: &'static str) -> Result<(), ValidationError> {
        match self.settings.enable.as_str() {
            "0" | "1" => Ok(()),
            other => Err(ValidationError::InvalidTrackingFlag {
                filter,
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Per-send tracking filters.
pub struct Filter {
    pub subscription_tracking: TrackingFilter,
    pub open_tracking: TrackingFilter,
    pub click_tracking: TrackingFilter,
}

impl Filter {
    pub fn new(subscription: bool, open: bool, click: bool) -> Self {
        Self {
            subscription_tracking: TrackingFilter::new(subscription),
            open_tracking: TrackingFilter::new(open),
            click_tracking: TrackingFilter::new(click),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.subscription_tracking
            .validate("subscription_tracking")?;
        self.open_tracking.validate("open_tracking")?;
        self.click_tracking.validate("click_tracking")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnsubscribeSettings {
    pub page_id: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub unsubscribe: UnsubscribeSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Substitution block (`xsmtpapi`): personalised sends to many recipients.
///
/// Every `sub` entry maps a `%placeholder%` to one value per recipient in `to`.
/// `pubsub` entries hold a single value shared by all recipients.
pub struct Xsmtpapi {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sub: BTreeMap<String, Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pubsub: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl Xsmtpapi {
    /// `true` when no field is set; an empty block is neither validated nor sent.
    pub fn is_empty(&self) -> bool {
        self.to.is_empty()
            && self.sub.is_empty()
            && self.pubsub.is_empty()
            && self.filters.is_none()
            && self.settings.is_none()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !self.to.is_empty() {
            if self.to.len() > MAIL_MAX_RECEIVERS {
                return Err(ValidationError::TooManyReceivers {
                    max: MAIL_MAX_RECEIVERS,
                    actual: self.to.len(),
                });
            }
            for (key, values) in &self.sub {
                check_placeholder(key)?;
                if values.len() != self.to.len() {
                    return Err(ValidationError::SubstitutionLengthMismatch {
                        key: key.clone(),
                        expected: self.to.len(),
                        actual: values.len(),
                    });
                }
            }
        }

        for key in self.pubsub.keys() {
            check_placeholder(key)?;
        }

        if let Some(filters) = &self.filters {
            filters.validate()?;
        }
        Ok(())
    }
}

fn check_placeholder(key: &str) -> Result<(), ValidationError> {
    if key.len() >= 2 && key.starts_with('%') && key.ends_with('%') {
        return Ok(());
    }
    Err(ValidationError::BadPlaceholderFormat {
        key: key.to_owned(),
    })
}

#[derive(Debug, Default)]
/// Envelope and delivery options shared by every mail kind.
pub struct MailBody<'a> {
    pub from: String,
    pub subject: String,
    pub content_summary: String,
    pub from_name: String,
    pub reply_to: String,
    pub label_name: String,
    pub headers: BTreeMap<String, String>,
    pub attachments: Vec<Attachment<'a>>,
    pub xsmtpapi: Xsmtpapi,
    pub send_request_id: String,
    pub resp_email_id: bool,
    pub use_notification: bool,
}

impl<'a> MailBody<'a> {
    pub fn new(from: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn add_attachment(&mut self, attachment: Attachment<'a>) {
        self.attachments.push(attachment);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.from.is_empty() {
            return Err(ValidationError::MissingFrom);
        }
        if self.subject.is_empty() {
            return Err(ValidationError::MissingSubject);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextContent {
    pub html: String,
    pub plain: String,
}

impl TextContent {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Default::default()
        }
    }

    pub fn plain(plain: impl Into<String>) -> Self {
        Self {
            plain: plain.into(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.html.is_empty() && self.plain.is_empty() {
            return Err(ValidationError::MissingContent);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContent {
    pub template_invoke_name: String,
}

impl TemplateContent {
    pub fn new(template_invoke_name: impl Into<String>) -> Self {
        Self {
            template_invoke_name: template_invoke_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Calendar invitation fields sent with `sendcalendar`.
///
/// Times are local wall-clock values, formatted as `YYYY-MM-DD HH:MM:SS`.
pub struct MailCalendar {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub title: String,
    pub organizer_name: String,
    pub organizer_email: String,
    pub location: String,
    pub description: String,
    pub participator_names: String,
    pub participator_emails: String,
    pub uid: String,
    pub is_cancel: bool,
    pub is_update: bool,
    /// Reminder lead time in minutes; `0` means no reminder.
    pub valarm_time: u32,
}

impl MailCalendar {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(start) = self.start_time else {
            return Err(ValidationError::MissingCalendarField { field: "startTime" });
        };
        let Some(end) = self.end_time else {
            return Err(ValidationError::MissingCalendarField { field: "endTime" });
        };
        if start > end {
            return Err(ValidationError::InvalidTimeRange);
        }

        let required = [
            ("title", &self.title),
            ("organizerName", &self.organizer_name),
            ("organizerEmail", &self.organizer_email),
            ("location", &self.location),
            ("participatorNames", &self.participator_names),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ValidationError::MissingCalendarField { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
/// Mail with inline html and/or plain-text content (`send`).
pub struct CommonMail<'a> {
    pub receiver: MailReceiver,
    pub body: MailBody<'a>,
    pub content: TextContent,
}

impl CommonMail<'_> {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_addressing(&self.receiver, &self.body)?;
        self.body.validate()?;
        self.content.validate()
    }
}

#[derive(Debug, Default)]
/// Mail rendered from a stored template (`sendtemplate`).
pub struct TemplateMail<'a> {
    pub receiver: MailReceiver,
    pub body: MailBody<'a>,
    pub content: TemplateContent,
}

impl TemplateMail<'_> {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_addressing(&self.receiver, &self.body)?;
        self.body.validate()?;
        if self.content.template_invoke_name.is_empty() {
            return Err(ValidationError::MissingTemplate);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
/// Mail carrying a calendar invitation (`sendcalendar`).
pub struct CalendarMail<'a> {
    pub receiver: MailReceiver,
    pub body: MailBody<'a>,
    pub content: TextContent,
    pub calendar: MailCalendar,
}

impl CalendarMail<'_> {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_addressing(&self.receiver, &self.body)?;
        self.body.validate()?;
        self.content.validate()?;
        self.calendar.validate()
    }
}

// Receiver checks also run in address-list mode even when the substitution
// block carries its own recipients; the substitution block is only checked
// outside address-list mode.
fn validate_addressing(receiver: &MailReceiver, body: &MailBody<'_>) -> Result<(), ValidationError> {
    let xsmtpapi = &body.xsmtpapi;
    if receiver.to.is_empty() && xsmtpapi.to.is_empty() {
        return Err(ValidationError::EmptyRecipients);
    }
    if xsmtpapi.to.is_empty() || receiver.use_address_list {
        receiver.validate()?;
    }
    if !receiver.use_address_list && !xsmtpapi.is_empty() {
        xsmtpapi.validate()?;
    }
    Ok(())
}

#[derive(Debug)]
/// Any email the mail API can send.
pub enum MailMessage<'a> {
    Common(CommonMail<'a>),
    Template(TemplateMail<'a>),
    Calendar(CalendarMail<'a>),
}

impl<'a> MailMessage<'a> {
    /// Endpoint path relative to the mail API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Common(_) => "/send",
            Self::Template(_) => "/sendtemplate",
            Self::Calendar(_) => "/sendcalendar",
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Common(mail) => mail.validate(),
            Self::Template(mail) => mail.validate(),
            Self::Calendar(mail) => mail.validate(),
        }
    }

    pub fn receiver(&self) -> &MailReceiver {
        match self {
            Self::Common(mail) => &mail.receiver,
            Self::Template(mail) => &mail.receiver,
            Self::Calendar(mail) => &mail.receiver,
        }
    }

    pub fn body(&self) -> &MailBody<'a> {
        match self {
            Self::Common(mail) => &mail.body,
            Self::Template(mail) => &mail.body,
            Self::Calendar(mail) => &mail.body,
        }
    }

    /// `true` when the mail must be sent as `multipart/form-data`.
    pub fn has_attachments(&self) -> bool {
        !self.body().attachments.is_empty()
    }
}

impl<'a> From<CommonMail<'a>> for MailMessage<'a> {
    fn from(value: CommonMail<'a>) -> Self {
        Self::Common(value)
    }
}

impl<'a> From<TemplateMail<'a>> for MailMessage<'a> {
    fn from(value: TemplateMail<'a>) -> Self {
        Self::Template(value)
    }
}

impl<'a> From<CalendarMail<'a>> for MailMessage<'a> {
    fn from(value: CalendarMail<'a>) -> Self {
        Self::Calendar(value)
    }
}
