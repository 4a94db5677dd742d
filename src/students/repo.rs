use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};

use crate::students::repo_types::{
    ContactDetails, EligibilityStatus, OverallStatus, Student, StudentStatus, StudentWithRelations,
};

const STUDENT_COLUMNS: &str = "id, first_name, last_name, status, created_at, updated_at";
const ELIGIBILITY_COLUMNS: &str = "id, student_id, classes_completed, fees_paid, \
    assignments_submitted, documents_submitted, trainer_consent, override_requested, \
    override_applied, overall_status, reason, comments, updated_at";

/// Checklist fields written by staff.
#[derive(Debug, Clone)]
pub struct EligibilityChanges {
    pub classes_completed: bool,
    pub fees_paid: bool,
    pub assignments_submitted: bool,
    pub documents_submitted: bool,
    pub trainer_consent: bool,
    pub override_requested: bool,
    pub override_applied: bool,
    pub overall_status: OverallStatus,
    pub reason: Option<String>,
    pub comments: Option<String>,
}

pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find student")?;
    Ok(student)
}

/// Load a student with contact details (stored order) and eligibility.
pub async fn find_with_relations(
    db: &PgPool,
    id: i64,
) -> anyhow::Result<Option<StudentWithRelations>> {
    let Some(student) = find_by_id(db, id).await? else {
        return Ok(None);
    };

    let contact_details = sqlx::query_as::<_, ContactDetails>(
        r#"
        SELECT id, student_id, email, phone, is_primary
          FROM contact_details
         WHERE student_id = $1
         ORDER BY id ASC
        "#,
    )
    .bind(id)
    .fetch_all(db)
    .await
    .context("list contact details")?;

    let eligibility = sqlx::query_as::<_, EligibilityStatus>(&format!(
        "SELECT {ELIGIBILITY_COLUMNS} FROM eligibility_statuses WHERE student_id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find eligibility status")?;

    Ok(Some(StudentWithRelations {
        student,
        contact_details,
        eligibility,
    }))
}

/// Active students whose eligibility is `eligible` or `override`, oldest first.
pub async fn find_eligible(db: &PgPool, limit: i64) -> anyhow::Result<Vec<Student>> {
    let rows = sqlx::query_as::<_, Student>(
        r#"
        SELECT s.id, s.first_name, s.last_name, s.status, s.created_at, s.updated_at
          FROM students s
          JOIN eligibility_statuses e ON e.student_id = s.id
         WHERE s.status = $1
           AND e.overall_status IN ($2, $3)
         ORDER BY s.id ASC
         LIMIT $4
        "#,
    )
    .bind(StudentStatus::Active)
    .bind(OverallStatus::Eligible)
    .bind(OverallStatus::Override)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("find eligible students")?;
    Ok(rows)
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<Student> {
    let student = sqlx::query_as::<_, Student>(&format!(
        r#"
        INSERT INTO students (first_name, last_name, status)
        VALUES ($1, $2, $3)
        RETURNING {STUDENT_COLUMNS}
        "#
    ))
    .bind(first_name)
    .bind(last_name)
    .bind(StudentStatus::Active)
    .fetch_one(&mut **tx)
    .await
    .context("insert student")?;
    Ok(student)
}

pub async fn insert_contact_tx(
    tx: &mut Transaction<'_, Postgres>,
    student_id: i64,
    email: &str,
    phone: Option<&str>,
) -> anyhow::Result<ContactDetails> {
    let contact = sqlx::query_as::<_, ContactDetails>(
        r#"
        INSERT INTO contact_details (student_id, email, phone, is_primary)
        VALUES ($1, $2, $3, TRUE)
        RETURNING id, student_id, email, phone, is_primary
        "#,
    )
    .bind(student_id)
    .bind(email)
    .bind(phone)
    .fetch_one(&mut **tx)
    .await
    .context("insert contact details")?;
    Ok(contact)
}

/// New students start with a `pending` checklist.
pub async fn insert_pending_eligibility_tx(
    tx: &mut Transaction<'_, Postgres>,
    student_id: i64,
) -> anyhow::Result<EligibilityStatus> {
    let row = sqlx::query_as::<_, EligibilityStatus>(&format!(
        r#"
        INSERT INTO eligibility_statuses (student_id, overall_status)
        VALUES ($1, $2)
        RETURNING {ELIGIBILITY_COLUMNS}
        "#
    ))
    .bind(student_id)
    .bind(OverallStatus::Pending)
    .fetch_one(&mut **tx)
    .await
    .context("insert eligibility status")?;
    Ok(row)
}

pub async fn upsert_eligibility(
    db: &PgPool,
    student_id: i64,
    changes: &EligibilityChanges,
) -> anyhow::Result<EligibilityStatus> {
    let row = sqlx::query_as::<_, EligibilityStatus>(&format!(
        r#"
        INSERT INTO eligibility_statuses (
            student_id, classes_completed, fees_paid, assignments_submitted,
            documents_submitted, trainer_consent, override_requested, override_applied,
            overall_status, reason, comments
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (student_id) DO UPDATE SET
            classes_completed     = EXCLUDED.classes_completed,
            fees_paid             = EXCLUDED.fees_paid,
            assignments_submitted = EXCLUDED.assignments_submitted,
            documents_submitted   = EXCLUDED.documents_submitted,
            trainer_consent       = EXCLUDED.trainer_consent,
            override_requested    = EXCLUDED.override_requested,
            override_applied      = EXCLUDED.override_applied,
            overall_status        = EXCLUDED.overall_status,
            reason                = EXCLUDED.reason,
            comments              = EXCLUDED.comments,
            updated_at            = now()
        RETURNING {ELIGIBILITY_COLUMNS}
        "#
    ))
    .bind(student_id)
    .bind(changes.classes_completed)
    .bind(changes.fees_paid)
    .bind(changes.assignments_submitted)
    .bind(changes.documents_submitted)
    .bind(changes.trainer_consent)
    .bind(changes.override_requested)
    .bind(changes.override_applied)
    .bind(changes.overall_status)
    .bind(changes.reason.as_deref())
    .bind(changes.comments.as_deref())
    .fetch_one(db)
    .await
    .context("upsert eligibility status")?;
    Ok(row)
}

/// Serialize credential changes per student for the rest of the transaction.
pub async fn advisory_lock_tx(
    tx: &mut Transaction<'_, Postgres>,
    student_id: i64,
) -> anyhow::Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(student_id)
        .execute(&mut **tx)
        .await
        .context("acquire student advisory lock")?;
    Ok(())
}

pub async fn set_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    status: StudentStatus,
) -> anyhow::Result<()> {
    let res = sqlx::query("UPDATE students SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await
        .context("update student status")?;
    anyhow::ensure!(res.rows_affected() == 1, "student {id} vanished during update");
    Ok(())
}
