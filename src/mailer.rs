// src/mailer.rs

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Async SMTP relay. Built from EMAIL_* env vars; when those are missing
/// the application runs with mail disabled.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_env() -> Option<Mailer> {
        let host = std::env::var("EMAIL_HOST").ok()?;
        let user = std::env::var("EMAIL_HOST_USER").ok()?;
        let password = std::env::var("EMAIL_HOST_PASSWORD").ok()?;
        let port = std::env::var("EMAIL_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(587);

        let from = std::env::var("EMAIL_FROM").unwrap_or_else(|_| user.clone());
        let from: Mailbox = match from.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                log::error!("invalid EMAIL_FROM address {from}: {e}");
                return None;
            }
        };

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host) {
            Ok(builder) => builder
                .port(port)
                .credentials(Credentials::new(user, password))
                .build(),
            Err(e) => {
                log::error!("smtp relay setup error: {e}");
                return None;
            }
        };

        Some(Mailer { transport, from })
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| format!("invalid recipient {to}: {e}"))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| e.to_string())?;

        self.transport
            .send(message)
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}
