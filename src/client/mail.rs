use std::time::Duration;

use tracing::debug;

use crate::client::{CallContext, Dispatcher, HttpSettings, SendCloudError, endpoint};
use crate::domain::{
    ApiKey, ApiUser, CalendarMail, CommonMail, ConfigError, MailMessage, SendResult,
    TemplateMail,
};
use crate::transport::encode_mail_params;

const DEFAULT_BASE_URL: &str = "https://api.sendcloud.net/apiv2/mail";

#[derive(Debug, Clone)]
/// Credentials for the mail API.
pub struct MailAuth {
    user: ApiUser,
    key: ApiKey,
}

impl MailAuth {
    /// Validate and pair the API user and key.
    pub fn new(user: impl Into<String>, key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            user: ApiUser::new(user)?,
            key: ApiKey::new(key)?,
        })
    }

    pub fn from_parts(user: ApiUser, key: ApiKey) -> Self {
        Self { user, key }
    }

    pub fn user(&self) -> &ApiUser {
        &self.user
    }
}

#[derive(Debug, Clone)]
/// Builder for [`MailClient`].
pub struct MailClientBuilder {
    auth: MailAuth,
    base_url: String,
    http: HttpSettings,
}

impl MailClientBuilder {
    pub fn new(auth: MailAuth) -> Self {
        Self {
            auth,
            base_url: DEFAULT_BASE_URL.to_owned(),
            http: HttpSettings::default(),
        }
    }

    /// Override the mail API base URL. An empty value means the default.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = Some(user_agent.into());
        self
    }

    /// Use a preconfigured `reqwest` client; `timeout` and `user_agent` are then ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http.client = Some(client);
        self
    }

    pub fn build(self) -> Result<MailClient, SendCloudError> {
        Ok(MailClient {
            auth: self.auth,
            base_url: self.base_url,
            dispatcher: self.http.build()?,
        })
    }
}

#[derive(Clone)]
/// High-level client for the SendCloud mail API.
///
/// Every send validates the message locally, then POSTs it to
/// `{base_url}/send`, `{base_url}/sendtemplate` or `{base_url}/sendcalendar`.
/// Mails with attachments go out as `multipart/form-data`, all others as a
/// URL-encoded form.
pub struct MailClient {
    auth: MailAuth,
    base_url: String,
    dispatcher: Dispatcher,
}

impl MailClient {
    /// Create a client for the default base URL.
    pub fn new(auth: MailAuth) -> Self {
        Self {
            auth,
            base_url: DEFAULT_BASE_URL.to_owned(),
            dispatcher: Dispatcher::with_default_client(),
        }
    }

    pub fn builder(auth: MailAuth) -> MailClientBuilder {
        MailClientBuilder::new(auth)
    }

    /// The effective base URL.
    pub fn base_url(&self) -> String {
        endpoint(&self.base_url, DEFAULT_BASE_URL, "")
    }

    /// Validate, encode and send any kind of mail.
    ///
    /// Errors:
    /// - [`SendCloudError::Validation`] before any network activity,
    /// - [`SendCloudError::Encoding`] when a sub-object or attachment cannot be encoded,
    /// - [`SendCloudError::Api`] for a non-200 HTTP status or a rejected envelope.
    pub async fn send<'a>(
        &self,
        message: impl Into<MailMessage<'a>>,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        let message = message.into();
        message.validate()?;

        let url = endpoint(&self.base_url, DEFAULT_BASE_URL, message.path());
        debug!(
            path = message.path(),
            attachments = message.body().attachments.len(),
            "encoding mail"
        );
        let params = encode_mail_params(&self.auth.user, &self.auth.key, message)?;
        self.dispatcher.send(url, params, ctx).await
    }

    pub async fn send_common_mail(
        &self,
        mail: CommonMail<'_>,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        self.send(mail, ctx).await
    }

    pub async fn send_template_mail(
        &self,
        mail: TemplateMail<'_>,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        self.send(mail, ctx).await
    }

    pub async fn send_calendar_mail(
        &self,
        mail: CalendarMail<'_>,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        self.send(mail, ctx).await
    }

    #[cfg(test)]
    fn with_dispatcher(auth: MailAuth, base_url: &str, dispatcher: Dispatcher) -> Self {
        Self {
            auth,
            base_url: base_url.to_owned(),
            dispatcher,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::client::CancelReason;
    use crate::client::tests::{FakeReply, FakeTransport};
    use crate::domain::{
        Attachment, MailBody, MailCalendar, MailReceiver, TemplateContent, TextContent,
        ValidationError,
    };
    use crate::transport::{FieldValue, RequestBody};

    const OK_BODY: &str = r#"{"result": true, "statusCode": 200, "message": "请求成功", "info": {"emailIdList": ["1@x.com"]}}"#;

    fn auth() -> MailAuth {
        MailAuth::new("user", "key").unwrap()
    }

    fn client(transport: &FakeTransport) -> MailClient {
        MailClient::with_dispatcher(auth(), "https://mail.example", transport.dispatcher())
    }

    fn common_mail() -> CommonMail<'static> {
        CommonMail {
            receiver: MailReceiver::to("a@x.com;b@x.com"),
            body: MailBody::new("sender@x.com", "hello"),
            content: TextContent::html("<p>hi</p>"),
        }
    }

    fn form_pairs(body: Option<RequestBody>) -> Vec<(String, String)> {
        match body {
            Some(RequestBody::Form(encoded)) => url::form_urlencoded::parse(encoded.as_bytes())
                .into_owned()
                .collect(),
            other => panic!("expected form body, got {other:?}"),
        }
    }

    #[test]
    fn auth_rejects_empty_credentials() {
        assert!(matches!(
            MailAuth::new(" ", "key"),
            Err(ConfigError::Empty { field: "apiUser" })
        ));
        assert!(matches!(
            MailAuth::new("user", ""),
            Err(ConfigError::Empty { field: "apiKey" })
        ));
    }

    #[test]
    fn auth_from_validated_parts() {
        let auth = MailAuth::from_parts(
            ApiUser::new(" user ").unwrap(),
            ApiKey::new("key").unwrap(),
        );
        assert_eq!(auth.user().as_str(), "user");
        assert_eq!(auth.user(), MailAuth::new("user", "key").unwrap().user());
    }

    #[test]
    fn auth_debug_redacts_key() {
        let debug = format!("{:?}", MailAuth::new("user", "super-secret").unwrap());
        assert!(debug.contains("user"));
        assert!(!debug.contains("super-secret"));
    }

    #[tokio::test]
    async fn common_mail_is_posted_as_form() {
        let transport = FakeTransport::new(200, OK_BODY);
        let result = client(&transport)
            .send_common_mail(common_mail(), &CallContext::new())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.info["emailIdList"][0], "1@x.com");
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://mail.example/send")
        );

        let pairs = form_pairs(transport.last_body());
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("apiUser"), Some("user"));
        assert_eq!(get("apiKey"), Some("key"));
        assert_eq!(get("to"), Some("a@x.com;b@x.com"));
        assert_eq!(get("from"), Some("sender@x.com"));
        assert_eq!(get("subject"), Some("hello"));
        assert_eq!(get("html"), Some("<p>hi</p>"));
        assert_eq!(get("plain"), None);
        assert_eq!(get("useAddressList"), None);
    }

    #[tokio::test]
    async fn template_and_calendar_mails_use_their_paths() {
        let transport = FakeTransport::new(200, OK_BODY);
        let client = client(&transport);

        let template = TemplateMail {
            receiver: MailReceiver::to("a@x.com"),
            body: MailBody::new("sender@x.com", "hello"),
            content: TemplateContent::new("welcome"),
        };
        client
            .send_template_mail(template, &CallContext::new())
            .await
            .unwrap();
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://mail.example/sendtemplate")
        );
        let pairs = form_pairs(transport.last_body());
        assert!(pairs.contains(&("templateInvokeName".to_owned(), "welcome".to_owned())));

        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let calendar = CalendarMail {
            receiver: MailReceiver::to("a@x.com"),
            body: MailBody::new("sender@x.com", "standup"),
            content: TextContent::plain("see you"),
            calendar: MailCalendar {
                start_time: day.and_hms_opt(9, 0, 0),
                end_time: day.and_hms_opt(9, 30, 0),
                title: "Standup".to_owned(),
                organizer_name: "Ops".to_owned(),
                organizer_email: "ops@x.com".to_owned(),
                location: "Room 1".to_owned(),
                participator_names: "A".to_owned(),
                participator_emails: "a@x.com".to_owned(),
                ..Default::default()
            },
        };
        client
            .send_calendar_mail(calendar, &CallContext::new())
            .await
            .unwrap();
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://mail.example/sendcalendar")
        );
        let pairs = form_pairs(transport.last_body());
        assert!(pairs.contains(&("startTime".to_owned(), "2024-05-01 09:00:00".to_owned())));
    }

    #[tokio::test]
    async fn attachments_switch_to_multipart() {
        let transport = FakeTransport::new(200, OK_BODY);
        let mut mail = common_mail();
        mail.body
            .add_attachment(Attachment::new("report.csv", io::Cursor::new(b"a,b\n1,2\n".to_vec())));

        client(&transport)
            .send(mail, &CallContext::new())
            .await
            .unwrap();

        let Some(RequestBody::Multipart(params)) = transport.last_body() else {
            panic!("expected multipart body");
        };
        assert_eq!(params.get("to"), Some("a@x.com;b@x.com"));
        let files = params
            .into_entries()
            .into_iter()
            .filter_map(|(key, value)| match value {
                FieldValue::File { file_name, content } => Some((key, file_name, content)),
                FieldValue::Text(_) => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            files,
            vec![(
                "attachments".to_owned(),
                "report.csv".to_owned(),
                b"a,b\n1,2\n".to_vec()
            )]
        );
    }

    #[tokio::test]
    async fn invalid_mail_never_reaches_the_network() {
        let transport = FakeTransport::new(200, OK_BODY);
        let mut mail = common_mail();
        mail.receiver = MailReceiver::default();

        let err = client(&transport)
            .send(mail, &CallContext::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SendCloudError::Validation(ValidationError::EmptyRecipients)
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn rejected_envelope_carries_status_code_and_message() {
        let transport = FakeTransport::new(
            200,
            r#"{"result": false, "statusCode": 40903, "message": "from格式错误", "info": {}}"#,
        );
        let err = client(&transport)
            .send(common_mail(), &CallContext::new())
            .await
            .unwrap_err();
        match err {
            SendCloudError::Api {
                url,
                status,
                status_code,
                message,
                ..
            } => {
                assert_eq!(url, "https://mail.example/send");
                assert_eq!(status, 200);
                assert_eq!(status_code, Some(40903));
                assert_eq!(message, "from格式错误");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_errors_are_api_errors() {
        let transport = FakeTransport::new(404, "");
        let err = client(&transport)
            .send(common_mail(), &CallContext::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "POST https://mail.example/send: 404 Not Found"
        );

        let transport = FakeTransport::new(500, r#"{"message": "internal"}"#);
        let err = client(&transport)
            .send(common_mail(), &CallContext::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "POST https://mail.example/send: 500 internal"
        );
    }

    #[tokio::test]
    async fn cancelled_call_reports_cancellation() {
        let transport = FakeTransport::with_reply(FakeReply::Hang);
        let client = client(&transport);
        let (ctx, handle) = CallContext::cancellable();

        let (result, ()) = tokio::join!(client.send(common_mail(), &ctx), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        });
        assert!(matches!(
            result,
            Err(SendCloudError::Cancelled(CancelReason::Cancelled))
        ));
    }

    #[tokio::test]
    async fn expired_deadline_reports_deadline_exceeded() {
        let transport = FakeTransport::with_reply(FakeReply::Fail("operation timed out".to_owned()));
        let ctx = CallContext::new().with_timeout(Duration::ZERO);
        let err = client(&transport)
            .send(common_mail(), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SendCloudError::Cancelled(CancelReason::DeadlineExceeded)
        ));
        assert_eq!(err.to_string(), "deadline exceeded");
    }

    #[test]
    fn empty_base_url_resolves_to_default() {
        let transport = FakeTransport::new(200, OK_BODY);
        let client = MailClient::with_dispatcher(auth(), "", transport.dispatcher());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let client = MailClient::with_dispatcher(auth(), "https://mail.example/", transport.dispatcher());
        assert_eq!(client.base_url(), "https://mail.example");
    }

    #[test]
    fn builder_keeps_custom_base_url() {
        let client = MailClient::builder(auth())
            .base_url("https://proxy.example/mail")
            .timeout(Duration::from_secs(5))
            .user_agent("sendcloud-tests")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://proxy.example/mail");
        assert_eq!(MailClient::new(auth()).base_url(), DEFAULT_BASE_URL);
    }
}
