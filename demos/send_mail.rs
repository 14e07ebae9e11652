use std::io;
use std::time::Duration;

use sendcloud::{CallContext, CommonMail, MailAuth, MailBody, MailClient, MailReceiver, TextContent};

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

    let api_user = required_env("SENDCLOUD_API_USER")?;
    let api_key = required_env("SENDCLOUD_API_KEY")?;
    let from = required_env("SENDCLOUD_FROM")?;
    let to = required_env("SENDCLOUD_TO")?;

    let client = MailClient::builder(MailAuth::new(api_user, api_key)?)
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut body = MailBody::new(from, "Hello from the sendcloud demo");
    body.from_name = "sendcloud demo".to_owned();
    let mail = CommonMail {
        receiver: MailReceiver::to(to),
        body,
        content: TextContent {
            html: "<p>Hello from the <b>sendcloud</b> demo.</p>".to_owned(),
            plain: "Hello from the sendcloud demo.".to_owned(),
        },
    };

    let ctx = CallContext::new().with_timeout(Duration::from_secs(10));
    let result = client.send(mail, &ctx).await?;
    println!(
        "status_code: {}, message: {}, info: {}",
        result.status_code, result.message, result.info
    );

    Ok(())
}
