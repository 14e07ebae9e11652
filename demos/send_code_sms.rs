use std::io;
use std::time::Duration;

use sendcloud::{CallContext, CodeSms, MsgType, SmsAuth, SmsClient};

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let sms_user = required_env("SENDCLOUD_SMS_USER")?;
    let sms_key = required_env("SENDCLOUD_SMS_KEY")?;
    let phone = required_env("SENDCLOUD_PHONE")?;
    let code = required_env("SENDCLOUD_CODE")?;

    let client = SmsClient::new(SmsAuth::new(sms_user, sms_key)?);
    let mut sms = CodeSms::new(MsgType::Sms, phone, code);
    sms.sign_name = std::env::var("SENDCLOUD_SIGN_NAME").unwrap_or_default();

    // Ctrl-C aborts the in-flight request.
    let (ctx, cancel) = CallContext::cancellable();
    let ctx = ctx.with_timeout(Duration::from_secs(15));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let result = client.send_code_sms(sms, &ctx).await?;
    println!("status_code: {}, message: {}", result.status_code, result.message);

    Ok(())
}
