use std::collections::BTreeMap;
use std::io;

use sendcloud::{CallContext, MsgType, SmsAuth, SmsClient, TemplateSms};

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
    let template_id: i32 = required_env("SENDCLOUD_TEMPLATE_ID")?.parse()?;
    let phones = required_env("SENDCLOUD_PHONE")?;

    let client = SmsClient::new(SmsAuth::new(sms_user, sms_key)?);

    let mut sms = TemplateSms::new(template_id, MsgType::Sms, phones);
    if let Ok(code) = std::env::var("SENDCLOUD_CODE") {
        sms.vars = BTreeMap::from([("code".to_owned(), code)]);
    }

    let result = client.send_template_sms(sms, &CallContext::new()).await?;
    println!(
        "status_code: {}, message: {}, info: {}",
        result.status_code, result.message, result.info
    );

    Ok(())
}
