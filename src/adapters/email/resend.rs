use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    app_error::{AppError, AppResult},
    infra::http_client,
    use_cases::verification::EmailSender,
};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Provider error bodies are echoed into logs; keep them short.
const MAX_ERROR_BODY: usize = 300;

/// Sends transactional mail through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendEmailSender {
    client: Client,
    api_key: SecretString,
    from: String,
}

impl ResendEmailSender {
    pub fn new(api_key: SecretString, from: String) -> Self {
        Self {
            client: http_client::build_client(),
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(self.api_key.expose_secret())
            .json(&OutgoingEmail {
                from: &self.from,
                to: [to],
                subject,
                html,
            })
            .send()
            .await
            .map_err(|e| AppError::EmailDelivery(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "Verification email accepted");
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        warn!(%status, body = %body, "Email API rejected message");
        Err(AppError::EmailDelivery(format!("email API returned {status}")))
    }
}
