mod brevo;
pub mod templates;

pub use brevo::BrevoNotifier;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::config::MailConfig;
use crate::students::repo_types::OverallStatus;

/// Outbound student email. Every method reports delivery as a boolean and
/// never fails the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_login_credentials(
        &self,
        to: &str,
        name: &str,
        login_id: &str,
        password: &str,
        app_url: &str,
    ) -> bool;

    async fn send_existing_credentials_notice(
        &self,
        to: &str,
        name: &str,
        login_id: &str,
        app_url: &str,
    ) -> bool;

    async fn send_eligibility_status_update(
        &self,
        to: &str,
        name: &str,
        status: OverallStatus,
        reason_or_comments: Option<&str>,
    ) -> bool;
}

/// Used when no mail transport is configured: logs and reports every send as failed.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send_login_credentials(&self, to: &str, _: &str, _: &str, _: &str, _: &str) -> bool {
        warn!(to = %to, "mail disabled; login credentials not sent");
        false
    }

    async fn send_existing_credentials_notice(&self, to: &str, _: &str, _: &str, _: &str) -> bool {
        warn!(to = %to, "mail disabled; existing credentials notice not sent");
        false
    }

    async fn send_eligibility_status_update(
        &self,
        to: &str,
        _: &str,
        status: OverallStatus,
        _: Option<&str>,
    ) -> bool {
        warn!(to = %to, %status, "mail disabled; eligibility update not sent");
        false
    }
}

pub fn notifier_from_config(config: &MailConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    if config.is_configured() {
        Ok(Arc::new(BrevoNotifier::new(config)?))
    } else {
        warn!("MAIL_API_KEY or MAIL_SENDER_EMAIL unset; outbound mail disabled");
        Ok(Arc::new(DisabledNotifier))
    }
}
