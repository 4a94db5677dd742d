use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::{templates, templates::Rendered, Notifier};
use crate::config::MailConfig;
use crate::students::repo_types::OverallStatus;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    html_content: String,
    text_content: String,
}

/// Transactional mail over the Brevo SMTP HTTP API.
pub struct BrevoNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoNotifier {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("MAIL_API_KEY is required"))?;
        let sender_email = config
            .sender_email
            .clone()
            .ok_or_else(|| anyhow::anyhow!("MAIL_SENDER_EMAIL is required"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("placement/0.1")
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            sender_email,
            sender_name: config.sender_name.clone(),
        })
    }

    async fn deliver(&self, to: &str, name: &str, mail: Rendered) -> anyhow::Result<()> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.sender_email.clone(),
                name: Some(self.sender_name.clone()),
            },
            to: vec![EmailAddress {
                email: to.to_string(),
                name: Some(name.to_string()).filter(|n| !n.is_empty()),
            }],
            subject: mail.subject,
            html_content: mail.html,
            text_content: mail.text,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("mail send failed (status={status}): {body}")
    }

    /// Deliver and fold the outcome into a boolean, logging failures.
    async fn send(&self, kind: &'static str, to: &str, name: &str, mail: Rendered) -> bool {
        match self.deliver(to, name, mail).await {
            Ok(()) => {
                debug!(kind, to = %to, "mail sent");
                true
            }
            Err(e) => {
                error!(kind, to = %to, error = %e, "mail send failed");
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for BrevoNotifier {
    async fn send_login_credentials(
        &self,
        to: &str,
        name: &str,
        login_id: &str,
        password: &str,
        app_url: &str,
    ) -> bool {
        let mail = templates::login_credentials(name, login_id, password, app_url);
        self.send("login_credentials", to, name, mail).await
    }

    async fn send_existing_credentials_notice(
        &self,
        to: &str,
        name: &str,
        login_id: &str,
        app_url: &str,
    ) -> bool {
        let mail = templates::existing_credentials(name, login_id, app_url);
        self.send("existing_credentials", to, name, mail).await
    }

    async fn send_eligibility_status_update(
        &self,
        to: &str,
        name: &str,
        status: OverallStatus,
        reason_or_comments: Option<&str>,
    ) -> bool {
        let mail = templates::eligibility_status(name, status, reason_or_comments);
        self.send("eligibility_status", to, name, mail).await
    }
}
