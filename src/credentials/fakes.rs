//! In-memory collaborators for exercising the credential workflow.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::store::CredentialStore;
use crate::auth::repo_types::{Role, User, UserStatus};
use crate::mail::Notifier;
use crate::students::repo_types::{
    ContactDetails, EligibilityStatus, OverallStatus, Student, StudentStatus, StudentWithRelations,
};

#[derive(Default)]
struct MemoryState {
    students: BTreeMap<i64, StudentWithRelations>,
    users: BTreeMap<i64, User>,
    writes: usize,
    failing_students: HashSet<i64>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub(crate) fn add_student(&self, id: i64, email: Option<&str>, overall: Option<OverallStatus>) {
        let contact_details = email
            .map(|e| {
                vec![ContactDetails {
                    id: id * 10,
                    student_id: id,
                    email: Some(e.to_string()),
                    phone: None,
                    is_primary: true,
                }]
            })
            .unwrap_or_default();
        let eligibility = overall.map(|overall_status| EligibilityStatus {
            id: id * 10,
            student_id: id,
            classes_completed: true,
            fees_paid: true,
            assignments_submitted: true,
            documents_submitted: true,
            trainer_consent: true,
            override_requested: false,
            override_applied: false,
            overall_status,
            reason: None,
            comments: Some("reviewed by staff".into()),
            updated_at: OffsetDateTime::UNIX_EPOCH,
        });
        let student = Student {
            id,
            first_name: "Student".into(),
            last_name: id.to_string(),
            status: StudentStatus::Active,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        self.state.lock().unwrap().students.insert(
            id,
            StudentWithRelations {
                student,
                contact_details,
                eligibility,
            },
        );
    }

    pub(crate) fn add_user(&self, id: i64, student_id: i64, login_id: &str, status: UserStatus) {
        let user = User {
            id,
            login_id: login_id.to_string(),
            password_hash: format!("initial-hash-{id}"),
            status,
            role: Role::Student,
            student_id: Some(student_id),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        self.state.lock().unwrap().users.insert(id, user);
    }

    /// Make `issue_credentials` fail for this student, as a dropped connection would.
    pub(crate) fn fail_writes_for(&self, student_id: i64) {
        self.state.lock().unwrap().failing_students.insert(student_id);
    }

    pub(crate) fn user(&self, id: i64) -> User {
        self.state.lock().unwrap().users[&id].clone()
    }

    pub(crate) fn student_status(&self, id: i64) -> StudentStatus {
        self.state.lock().unwrap().students[&id].student.status
    }

    pub(crate) fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_student_with_relations(
        &self,
        student_id: i64,
    ) -> anyhow::Result<Option<StudentWithRelations>> {
        Ok(self.state.lock().unwrap().students.get(&student_id).cloned())
    }

    async fn find_user_by_student_id(&self, student_id: i64) -> anyhow::Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.student_id == Some(student_id))
            .cloned())
    }

    async fn issue_credentials(
        &self,
        user_id: i64,
        student_id: i64,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        anyhow::ensure!(
            !state.failing_students.contains(&student_id),
            "connection reset while updating student {student_id}"
        );
        anyhow::ensure!(state.users.contains_key(&user_id), "user {user_id} missing");
        anyhow::ensure!(state.students.contains_key(&student_id), "student {student_id} missing");

        if let Some(user) = state.users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
            user.status = UserStatus::Active;
        }
        if let Some(s) = state.students.get_mut(&student_id) {
            s.student.status = StudentStatus::PlacementInitiated;
        }
        state.writes += 1;
        Ok(())
    }

    async fn find_eligible_students(&self, limit: i64) -> anyhow::Result<Vec<Student>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .students
            .values()
            .filter(|s| s.student.status == StudentStatus::Active)
            .filter(|s| {
                matches!(
                    s.eligibility.as_ref().map(|e| e.overall_status),
                    Some(OverallStatus::Eligible | OverallStatus::Override)
                )
            })
            .take(limit.max(0) as usize)
            .map(|s| s.student.clone())
            .collect())
    }

    async fn find_users_by_student_ids(&self, student_ids: &[i64]) -> anyhow::Result<Vec<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| u.student_id.is_some_and(|id| student_ids.contains(&id)))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SentMail {
    Credentials { to: String, login_id: String, password: String },
    ExistingCredentials { to: String, login_id: String },
    StatusUpdate { to: String, status: OverallStatus, note: Option<String> },
}

/// Records every send; `failing()` makes all sends report failure.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub(crate) fn failing() -> Self {
        let n = Self::default();
        n.fail.store(true, Ordering::Relaxed);
        n
    }

    pub(crate) fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, mail: SentMail) -> bool {
        self.sent.lock().unwrap().push(mail);
        !self.fail.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_login_credentials(
        &self,
        to: &str,
        _name: &str,
        login_id: &str,
        password: &str,
        _app_url: &str,
    ) -> bool {
        self.record(SentMail::Credentials {
            to: to.into(),
            login_id: login_id.into(),
            password: password.into(),
        })
    }

    async fn send_existing_credentials_notice(
        &self,
        to: &str,
        _name: &str,
        login_id: &str,
        _app_url: &str,
    ) -> bool {
        self.record(SentMail::ExistingCredentials {
            to: to.into(),
            login_id: login_id.into(),
        })
    }

    async fn send_eligibility_status_update(
        &self,
        to: &str,
        _name: &str,
        status: OverallStatus,
        reason_or_comments: Option<&str>,
    ) -> bool {
        self.record(SentMail::StatusUpdate {
            to: to.into(),
            status,
            note: reason_or_comments.map(Into::into),
        })
    }
}
