use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::client::{CallContext, Dispatcher, HttpSettings, SendCloudError, endpoint};
use crate::domain::{
    CodeSms, ConfigError, SendResult, SmsKey, SmsMessage, SmsUser, TemplateSms, VoiceSms,
};
use crate::transport::{encode_sms_params, sign};

const DEFAULT_BASE_URL: &str = "https://api.sendcloud.net/smsapi";

#[derive(Debug, Clone)]
/// Credentials for the SMS API. The key only ever leaves the process as a signature.
pub struct SmsAuth {
    user: SmsUser,
    key: SmsKey,
}

impl SmsAuth {
    pub fn new(user: impl Into<String>, key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            user: SmsUser::new(user)?,
            key: SmsKey::new(key)?,
        })
    }

    pub fn from_parts(user: SmsUser, key: SmsKey) -> Self {
        Self { user, key }
    }

    pub fn user(&self) -> &SmsUser {
        &self.user
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SmsClient`].
pub struct SmsClientBuilder {
    auth: SmsAuth,
    base_url: String,
    http: HttpSettings,
}

impl SmsClientBuilder {
    pub fn new(auth: SmsAuth) -> Self {
        Self {
            auth,
            base_url: DEFAULT_BASE_URL.to_owned(),
            http: HttpSettings::default(),
        }
    }

    /// Override the SMS API base URL. An empty value means the default.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = Some(user_agent.into());
        self
    }

    /// Use a preconfigured `reqwest` client; `timeout` and `user_agent` are then ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http.client = Some(client);
        self
    }

    pub fn build(self) -> Result<SmsClient, SendCloudError> {
        Ok(SmsClient {
            auth: self.auth,
            base_url: self.base_url,
            dispatcher: self.http.build()?,
        })
    }
}

#[derive(Clone)]
/// High-level client for the SendCloud SMS API.
///
/// Requests are URL-encoded forms stamped with the current time in
/// milliseconds and signed with the SMS key (see [`SmsClient::send`]).
pub struct SmsClient {
    auth: SmsAuth,
    base_url: String,
    dispatcher: Dispatcher,
}

impl SmsClient {
    pub fn new(auth: SmsAuth) -> Self {
        Self {
            auth,
            base_url: DEFAULT_BASE_URL.to_owned(),
            dispatcher: Dispatcher::with_default_client(),
        }
    }

    pub fn builder(auth: SmsAuth) -> SmsClientBuilder {
        SmsClientBuilder::new(auth)
    }

    /// The effective base URL.
    pub fn base_url(&self) -> String {
        endpoint(&self.base_url, DEFAULT_BASE_URL, "")
    }

    /// Validate, sign and send any kind of SMS.
    ///
    /// The `signature` field is the lowercase hex SHA-256 of
    /// `key&k1=v1&k2=v2...&key` over every other parameter sorted by name; the
    /// key itself is never transmitted.
    pub async fn send(
        &self,
        message: impl Into<SmsMessage>,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        let message = message.into();
        message.validate()?;

        let url = endpoint(&self.base_url, DEFAULT_BASE_URL, message.path());
        let mut params = encode_sms_params(&self.auth.user, &message, now_millis())?;
        sign(&mut params, &self.auth.key);
        debug!(path = message.path(), "signed sms request");

        self.dispatcher.send(url, params, ctx).await
    }

    pub async fn send_template_sms(
        &self,
        sms: TemplateSms,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        self.send(sms, ctx).await
    }

    pub async fn send_voice_sms(
        &self,
        sms: VoiceSms,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        self.send(sms, ctx).await
    }

    pub async fn send_code_sms(
        &self,
        sms: CodeSms,
        ctx: &CallContext,
    ) -> Result<SendResult, SendCloudError> {
        self.send(sms, ctx).await
    }

    #[cfg(test)]
    fn with_dispatcher(auth: SmsAuth, base_url: &str, dispatcher: Dispatcher) -> Self {
        Self {
            auth,
            base_url: base_url.to_owned(),
            dispatcher,
        }
    }
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}
