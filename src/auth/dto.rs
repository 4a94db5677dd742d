use serde::{Deserialize, Serialize};

use super::repo_types::{Role, User, UserStatus};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub login_id: String,
    pub role: Role,
    pub status: UserStatus,
    pub student_id: Option<i64>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            login_id: u.login_id,
            role: u.role,
            status: u.status,
            student_id: u.student_id,
        }
    }
}
