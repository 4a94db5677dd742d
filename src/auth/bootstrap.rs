use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use super::password::hash_password;
use super::repo_types::User;
use crate::config::AdminBootstrap;

/// Hashed admin row ready to upsert.
#[derive(Debug)]
pub struct AdminSeed {
    pub login_id: String,
    pub password_hash: String,
}

pub fn admin_seed(admin: &AdminBootstrap) -> anyhow::Result<AdminSeed> {
    Ok(AdminSeed {
        login_id: admin.login_id.clone(),
        password_hash: hash_password(&admin.password)?,
    })
}

/// Create or refresh the configured admin so staff can log in on a fresh database.
pub async fn ensure_admin(db: &PgPool, admin: &AdminBootstrap) -> anyhow::Result<User> {
    let seed = admin_seed(admin)?;
    let user = User::upsert_admin(db, &seed.login_id, &seed.password_hash)
        .await?
        .with_context(|| format!("{} already belongs to a student account", seed.login_id))?;
    info!(user_id = user.id, login_id = %user.login_id, "admin account ready");
    Ok(user)
}
