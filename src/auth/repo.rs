use crate::auth::repo_types::{Role, User, UserStatus};
use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};

const USER_COLUMNS: &str =
    "id, login_id, password_hash, status, role, student_id, created_at, updated_at";

impl User {
    /// Find a user by login id (an email address).
    pub async fn find_by_login_id(db: &PgPool, login_id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login_id = $1"
        ))
        .bind(login_id)
        .fetch_optional(db)
        .await
        .context("find user by login id")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    pub async fn find_by_student_id(db: &PgPool, student_id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE student_id = $1"
        ))
        .bind(student_id)
        .fetch_optional(db)
        .await
        .context("find user by student id")?;
        Ok(user)
    }

    /// Bulk lookup used by the batch workflow; one query for all ids.
    pub async fn find_by_student_ids(db: &PgPool, student_ids: &[i64]) -> anyhow::Result<Vec<User>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE student_id = ANY($1)"
        ))
        .bind(student_ids)
        .fetch_all(db)
        .await
        .context("find users by student ids")?;
        Ok(users)
    }

    /// Create an account inside the caller's transaction.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        login_id: &str,
        password_hash: &str,
        role: Role,
        status: UserStatus,
        student_id: Option<i64>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (login_id, password_hash, role, status, student_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(login_id)
        .bind(password_hash)
        .bind(role)
        .bind(status)
        .bind(student_id)
        .fetch_one(&mut **tx)
        .await
        .context("insert user")?;
        Ok(user)
    }

    /// Lock the user row for the rest of the transaction.
    pub async fn lock_tx(tx: &mut Transaction<'_, Postgres>, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .context("lock user")?;
        Ok(user)
    }

    pub async fn set_credentials_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        password_hash: &str,
        status: UserStatus,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $2, status = $3, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(status)
        .execute(&mut **tx)
        .await
        .context("update user credentials")?;
        Ok(())
    }

    /// Insert or refresh a staff-side admin. Never takes over a student's login.
    pub async fn upsert_admin(
        db: &PgPool,
        login_id: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (login_id, password_hash, role, status, student_id)
            VALUES ($1, $2, $3, $4, NULL)
            ON CONFLICT (login_id) DO UPDATE
               SET password_hash = EXCLUDED.password_hash,
                   role = EXCLUDED.role,
                   status = EXCLUDED.status,
                   updated_at = now()
             WHERE users.student_id IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(login_id)
        .bind(password_hash)
        .bind(Role::Admin)
        .bind(UserStatus::Active)
        .fetch_optional(db)
        .await
        .context("upsert admin user")?;
        Ok(user)
    }
}
