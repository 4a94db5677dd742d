use serde::{Deserialize, Serialize};

use crate::students::repo_types::OverallStatus;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SendOptions {
    #[serde(default)]
    pub skip_password_reset: bool,
}

pub const DEFAULT_BATCH_LIMIT: i64 = 100;
pub const MAX_BATCH_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BatchOptions {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_skip_existing")]
    pub skip_existing_users: bool,
}
fn default_limit() -> i64 {
    DEFAULT_BATCH_LIMIT
}
fn default_skip_existing() -> bool {
    true
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_BATCH_LIMIT,
            skip_existing_users: true,
        }
    }
}

/// What a credential operation did for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CredentialOutcome {
    /// Status email only; nothing persisted.
    NotEligible {
        student_id: i64,
        overall_status: OverallStatus,
        email: String,
        email_sent: bool,
    },
    /// Eligible, password reset skipped; told to use existing login.
    ExistingCredentials {
        student_id: i64,
        user_id: i64,
        login_id: String,
        email: String,
        email_sent: bool,
    },
    /// Password reset, account activated, placement initiated.
    CredentialsIssued {
        student_id: i64,
        user_id: i64,
        login_id: String,
        email: String,
        email_sent: bool,
    },
    StatusNotified {
        student_id: i64,
        overall_status: OverallStatus,
        email: String,
        email_sent: bool,
    },
}

impl CredentialOutcome {
    pub fn success(&self) -> bool {
        match self {
            CredentialOutcome::NotEligible { .. } => false,
            CredentialOutcome::ExistingCredentials { .. }
            | CredentialOutcome::CredentialsIssued { .. } => true,
            CredentialOutcome::StatusNotified { email_sent, .. } => *email_sent,
        }
    }

    pub fn email_sent(&self) -> bool {
        match self {
            CredentialOutcome::NotEligible { email_sent, .. }
            | CredentialOutcome::ExistingCredentials { email_sent, .. }
            | CredentialOutcome::CredentialsIssued { email_sent, .. }
            | CredentialOutcome::StatusNotified { email_sent, .. } => *email_sent,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CredentialOutcome::NotEligible { overall_status, .. } => format!(
                "Student is not eligible for credentials (status: {overall_status})"
            ),
            CredentialOutcome::ExistingCredentials { email_sent: true, .. } => {
                "Student is eligible; notified to use existing credentials".into()
            }
            CredentialOutcome::ExistingCredentials { email_sent: false, .. } => {
                "Student is eligible; existing credentials notice could not be emailed".into()
            }
            CredentialOutcome::CredentialsIssued { email_sent: true, .. } => {
                "Credentials generated and sent successfully".into()
            }
            CredentialOutcome::CredentialsIssued { email_sent: false, .. } => {
                "Credentials generated but the email could not be sent".into()
            }
            CredentialOutcome::StatusNotified { email_sent: true, overall_status, .. } => {
                format!("Eligibility status ({overall_status}) notification sent")
            }
            CredentialOutcome::StatusNotified { email_sent: false, .. } => {
                "Failed to send eligibility status notification".into()
            }
        }
    }
}

/// Response envelope for single-student operations.
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    pub success: bool,
    pub message: String,
    pub data: CredentialOutcome,
}

impl From<CredentialOutcome> for CredentialResponse {
    fn from(data: CredentialOutcome) -> Self {
        Self {
            success: data.success(),
            message: data.message(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    CredentialsSent,
    AlreadyHasAccount,
    NotEligible,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub student_id: i64,
    pub status: BatchItemStatus,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CredentialOutcome>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total_processed: usize,
    pub credentials_sent: usize,
    pub already_have_accounts: usize,
    pub not_eligible: usize,
    pub errors: usize,
    pub cancelled: bool,
    pub details: Vec<BatchItem>,
}

impl BatchSummary {
    /// Count one processed student and keep its detail row.
    pub fn record_outcome(&mut self, student_id: i64, outcome: CredentialOutcome) {
        let status = match outcome {
            CredentialOutcome::CredentialsIssued { .. } => {
                self.credentials_sent += 1;
                BatchItemStatus::CredentialsSent
            }
            CredentialOutcome::NotEligible { .. } => {
                self.not_eligible += 1;
                BatchItemStatus::NotEligible
            }
            // Batch sends always reset passwords and never notify only.
            CredentialOutcome::ExistingCredentials { .. }
            | CredentialOutcome::StatusNotified { .. } => {
                self.errors += 1;
                self.details.push(BatchItem {
                    student_id,
                    status: BatchItemStatus::Error,
                    success: false,
                    message: format!("Unexpected batch outcome: {}", outcome.message()),
                    data: Some(outcome),
                });
                return;
            }
        };
        self.details.push(BatchItem {
            student_id,
            status,
            success: outcome.success(),
            message: outcome.message(),
            data: Some(outcome),
        });
    }

    pub fn record_error(&mut self, student_id: i64, message: String) {
        self.errors += 1;
        self.details.push(BatchItem {
            student_id,
            status: BatchItemStatus::Error,
            success: false,
            message,
            data: None,
        });
    }
}
