use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::dto::{
    BatchItem, BatchItemStatus, BatchOptions, BatchSummary, CredentialOutcome, SendOptions,
    MAX_BATCH_LIMIT,
};
use super::eligibility::{evaluate, Eligibility};
use super::generator::generate_password;
use super::store::CredentialStore;
use crate::auth::password::hash_password;
use crate::auth::repo_types::UserStatus;
use crate::error::AppError;
use crate::mail::Notifier;
use crate::students::repo_types::{EligibilityStatus, StudentWithRelations};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Student {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::NotFound(_) => AppError::NotFound(e.to_string()),
            CredentialError::Validation(msg) => AppError::Validation(msg),
            CredentialError::Unexpected(e) => AppError::Internal(e),
        }
    }
}

/// Student, email and eligibility record every credential path starts from.
struct Loaded {
    student: StudentWithRelations,
    email: String,
    eligibility: EligibilityStatus,
}

impl Loaded {
    fn name(&self) -> String {
        self.student.student.full_name()
    }

    fn student_id(&self) -> i64 {
        self.student.student.id
    }

    fn note(&self) -> Option<&str> {
        self.eligibility
            .reason
            .as_deref()
            .or(self.eligibility.comments.as_deref())
    }
}

/// Eligibility-driven credential distribution.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    app_url: String,
}

impl CredentialService {
    pub fn new(store: Arc<dyn CredentialStore>, notifier: Arc<dyn Notifier>, app_url: String) -> Self {
        Self {
            store,
            notifier,
            app_url,
        }
    }

    async fn load(&self, student_id: i64) -> Result<Loaded, CredentialError> {
        let student = self
            .store
            .find_student_with_relations(student_id)
            .await?
            .ok_or(CredentialError::NotFound(student_id))?;

        let email = student
            .primary_email()
            .map(str::to_string)
            .ok_or_else(|| CredentialError::Validation("Student email not found".into()))?;

        let eligibility = student.eligibility.clone().ok_or_else(|| {
            CredentialError::Validation("Eligibility status not found for student".into())
        })?;

        Ok(Loaded {
            student,
            email,
            eligibility,
        })
    }

    /// Issue (or confirm) login credentials for one student.
    #[instrument(skip(self), fields(skip_password_reset = options.skip_password_reset))]
    pub async fn send_credentials(
        &self,
        student_id: i64,
        options: SendOptions,
    ) -> Result<CredentialOutcome, CredentialError> {
        let loaded = self.load(student_id).await?;
        let name = loaded.name();

        if evaluate(Some(&loaded.eligibility)) == Eligibility::NotEligible {
            let overall_status = loaded.eligibility.overall_status;
            let email_sent = self
                .notifier
                .send_eligibility_status_update(&loaded.email, &name, overall_status, loaded.note())
                .await;
            info!(student_id, %overall_status, email_sent, "student not eligible; no credentials issued");
            return Ok(CredentialOutcome::NotEligible {
                student_id,
                overall_status,
                email: loaded.email,
                email_sent,
            });
        }

        let user = self
            .store
            .find_user_by_student_id(student_id)
            .await?
            .ok_or_else(|| {
                CredentialError::Validation(
                    "User account not found for student; create one first".into(),
                )
            })?;

        if options.skip_password_reset {
            let email_sent = self
                .notifier
                .send_existing_credentials_notice(&loaded.email, &name, &user.login_id, &self.app_url)
                .await;
            if !email_sent {
                warn!(student_id, user_id = user.id, "existing credentials notice not delivered");
            }
            return Ok(CredentialOutcome::ExistingCredentials {
                student_id,
                user_id: user.id,
                login_id: user.login_id,
                email: loaded.email,
                email_sent,
            });
        }

        let password = generate_password();
        let password_hash = hash_password(&password)?;
        self.store
            .issue_credentials(user.id, student_id, &password_hash)
            .await?;
        info!(student_id, user_id = user.id, "credentials issued; user active, placement initiated");

        let email_sent = self
            .notifier
            .send_login_credentials(&loaded.email, &name, &user.login_id, &password, &self.app_url)
            .await;
        if !email_sent {
            warn!(student_id, user_id = user.id, "credentials changed but email not delivered");
        }

        Ok(CredentialOutcome::CredentialsIssued {
            student_id,
            user_id: user.id,
            login_id: user.login_id,
            email: loaded.email,
            email_sent,
        })
    }

    /// Email the student their current eligibility status. Never writes.
    #[instrument(skip(self))]
    pub async fn notify_eligibility_status(
        &self,
        student_id: i64,
    ) -> Result<CredentialOutcome, CredentialError> {
        let loaded = self.load(student_id).await?;
        let overall_status = loaded.eligibility.overall_status;
        let email_sent = self
            .notifier
            .send_eligibility_status_update(&loaded.email, &loaded.name(), overall_status, loaded.note())
            .await;
        info!(student_id = loaded.student_id(), %overall_status, email_sent, "eligibility status notified");
        Ok(CredentialOutcome::StatusNotified {
            student_id,
            overall_status,
            email: loaded.email,
            email_sent,
        })
    }

    pub async fn batch_process(&self, options: BatchOptions) -> Result<BatchSummary, CredentialError> {
        self.batch_process_until(options, &AtomicBool::new(false)).await
    }

    /// Run the batch sequentially, checking `cancel` between students.
    #[instrument(skip(self, cancel))]
    pub async fn batch_process_until(
        &self,
        options: BatchOptions,
        cancel: &AtomicBool,
    ) -> Result<BatchSummary, CredentialError> {
        let limit = options.limit.clamp(1, MAX_BATCH_LIMIT);
        let students = self.store.find_eligible_students(limit).await?;
        let mut summary = BatchSummary::default();

        let active_accounts: HashSet<i64> = if options.skip_existing_users {
            let ids: Vec<i64> = students.iter().map(|s| s.id).collect();
            self.store
                .find_users_by_student_ids(&ids)
                .await?
                .into_iter()
                .filter(|u| u.status == UserStatus::Active)
                .filter_map(|u| u.student_id)
                .collect()
        } else {
            HashSet::new()
        };

        for student in students {
            if active_accounts.contains(&student.id) {
                summary.already_have_accounts += 1;
                summary.details.push(BatchItem {
                    student_id: student.id,
                    status: BatchItemStatus::AlreadyHasAccount,
                    success: true,
                    message: "Student already has an active account".into(),
                    data: None,
                });
                continue;
            }

            if cancel.load(Ordering::Relaxed) {
                warn!(processed = summary.total_processed, "batch cancelled");
                summary.cancelled = true;
                break;
            }

            summary.total_processed += 1;
            match self.send_credentials(student.id, SendOptions::default()).await {
                Ok(outcome) => summary.record_outcome(student.id, outcome),
                Err(e) => {
                    warn!(student_id = student.id, error = %e, "batch item failed");
                    summary.record_error(student.id, e.to_string());
                }
            }
        }

        info!(
            total_processed = summary.total_processed,
            credentials_sent = summary.credentials_sent,
            already_have_accounts = summary.already_have_accounts,
            not_eligible = summary.not_eligible,
            errors = summary.errors,
            "credential batch finished"
        );
        Ok(summary)
    }
}
