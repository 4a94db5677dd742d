use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use super::dto::CreateStudentRequest;
use super::repo;
use super::repo_types::StudentWithRelations;
use crate::auth::password::hash_password;
use crate::auth::repo_types::{Role, User, UserStatus};
use crate::credentials::generator::generate_password;
use crate::error::{is_unique_violation, AppError};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Validated and normalized student creation input.
#[derive(Debug)]
pub(crate) struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

pub(crate) fn validate(req: CreateStudentRequest) -> Result<NewStudent, AppError> {
    let first_name = req.first_name.trim().to_string();
    let last_name = req.last_name.trim().to_string();
    let email = req.email.trim().to_lowercase();
    if first_name.is_empty() {
        return Err(AppError::Validation("first_name is required".into()));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(NewStudent {
        first_name,
        last_name,
        email,
        phone: req.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
    })
}

/// Create the student, its primary contact, a pending eligibility record and an
/// inactive login account in one transaction. The account's password is random
/// and never sent; credential distribution replaces it.
pub(crate) async fn create_student(
    st: &AppState,
    new: NewStudent,
) -> Result<(StudentWithRelations, User), AppError> {
    if User::find_by_login_id(&st.db, &new.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }
    let placeholder_hash = hash_password(&generate_password())?;

    let (created, user) = insert_student(st, &new, &placeholder_hash)
        .await
        .map_err(conflict_or_internal)?;

    info!(student_id = created.student.id, user_id = user.id, "student created");
    Ok((created, user))
}

/// A concurrent create can pass the lookup above and lose on the unique index.
fn conflict_or_internal(e: anyhow::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict("Email already registered".into())
    } else {
        AppError::Internal(e)
    }
}

async fn insert_student(
    st: &AppState,
    new: &NewStudent,
    password_hash: &str,
) -> anyhow::Result<(StudentWithRelations, User)> {
    let mut tx = st.db.begin().await.context("begin tx")?;
    let student = repo::insert_tx(&mut tx, &new.first_name, &new.last_name).await?;
    let contact = repo::insert_contact_tx(&mut tx, student.id, &new.email, new.phone.as_deref()).await?;
    let eligibility = repo::insert_pending_eligibility_tx(&mut tx, student.id).await?;
    let user = User::create_tx(
        &mut tx,
        &new.email,
        password_hash,
        Role::Student,
        UserStatus::Inactive,
        Some(student.id),
    )
    .await?;
    tx.commit().await.context("commit tx")?;

    Ok((
        StudentWithRelations {
            student,
            contact_details: vec![contact],
            eligibility: Some(eligibility),
        },
        user,
    ))
}
