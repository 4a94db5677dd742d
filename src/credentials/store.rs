use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{User, UserStatus};
use crate::students::{
    repo,
    repo_types::{Student, StudentStatus, StudentWithRelations},
};

/// Persistence seen by the credential workflow.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_student_with_relations(
        &self,
        student_id: i64,
    ) -> anyhow::Result<Option<StudentWithRelations>>;

    async fn find_user_by_student_id(&self, student_id: i64) -> anyhow::Result<Option<User>>;

    /// Store a new password hash, activate the user and move the student to
    /// `placement_initiated`, all or nothing.
    async fn issue_credentials(
        &self,
        user_id: i64,
        student_id: i64,
        password_hash: &str,
    ) -> anyhow::Result<()>;

    async fn find_eligible_students(&self, limit: i64) -> anyhow::Result<Vec<Student>>;

    async fn find_users_by_student_ids(&self, student_ids: &[i64]) -> anyhow::Result<Vec<User>>;
}

#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_student_with_relations(
        &self,
        student_id: i64,
    ) -> anyhow::Result<Option<StudentWithRelations>> {
        repo::find_with_relations(&self.db, student_id).await
    }

    async fn find_user_by_student_id(&self, student_id: i64) -> anyhow::Result<Option<User>> {
        User::find_by_student_id(&self.db, student_id).await
    }

    async fn issue_credentials(
        &self,
        user_id: i64,
        student_id: i64,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        repo::advisory_lock_tx(&mut tx, student_id).await?;
        let user = User::lock_tx(&mut tx, user_id)
            .await?
            .with_context(|| format!("user {user_id} vanished before credential update"))?;
        anyhow::ensure!(
            user.student_id == Some(student_id),
            "user {user_id} is no longer linked to student {student_id}"
        );

        User::set_credentials_tx(&mut tx, user_id, password_hash, UserStatus::Active).await?;
        repo::set_status_tx(&mut tx, student_id, StudentStatus::PlacementInitiated).await?;

        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn find_eligible_students(&self, limit: i64) -> anyhow::Result<Vec<Student>> {
        repo::find_eligible(&self.db, limit).await
    }

    async fn find_users_by_student_ids(&self, student_ids: &[i64]) -> anyhow::Result<Vec<User>> {
        User::find_by_student_ids(&self.db, student_ids).await
    }
}
