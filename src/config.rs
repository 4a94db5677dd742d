use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Transactional mail settings. `api_key`/`sender_email` unset means mail is disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub sender_email: Option<String>,
    pub sender_name: String,
    pub timeout_secs: u64,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|v| !v.trim().is_empty())
            && self
                .sender_email
                .as_deref()
                .is_some_and(|v| !v.trim().is_empty())
    }
}

/// Admin account provisioned at startup so staff routes are reachable on a fresh database.
#[derive(Clone, Deserialize)]
pub struct AdminBootstrap {
    pub login_id: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub const MIN_ADMIN_PASSWORD_LEN: usize = 12;

impl AdminBootstrap {
    /// Both values or neither; the login id is normalized like student logins.
    pub fn from_values(
        login_id: Option<String>,
        password: Option<String>,
    ) -> anyhow::Result<Option<Self>> {
        match (login_id, password) {
            (None, None) => Ok(None),
            (Some(login_id), Some(password)) => {
                let login_id = login_id.trim().to_lowercase();
                anyhow::ensure!(
                    login_id.contains('@'),
                    "ADMIN_LOGIN_ID must be an email address"
                );
                anyhow::ensure!(
                    password.chars().count() >= MIN_ADMIN_PASSWORD_LEN,
                    "ADMIN_PASSWORD must be at least {MIN_ADMIN_PASSWORD_LEN} characters"
                );
                Ok(Some(Self { login_id, password }))
            }
            _ => anyhow::bail!("ADMIN_LOGIN_ID and ADMIN_PASSWORD must be set together"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    /// Login page linked from credential emails.
    pub app_url: String,
    pub admin: Option<AdminBootstrap>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "placement"),
            audience: env_or("JWT_AUDIENCE", "placement-users"),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let mail = MailConfig {
            api_url: env_or("MAIL_API_URL", "https://api.brevo.com/v3/smtp/email"),
            api_key: env_opt("MAIL_API_KEY"),
            sender_email: env_opt("MAIL_SENDER_EMAIL"),
            sender_name: env_or("MAIL_SENDER_NAME", "Placement Office"),
            timeout_secs: std::env::var("MAIL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let app_url = env_or("APP_URL", "http://localhost:3000");
        let admin = AdminBootstrap::from_values(env_opt("ADMIN_LOGIN_ID"), env_opt("ADMIN_PASSWORD"))?;
        Ok(Self {
            database_url,
            jwt,
            mail,
            app_url,
            admin,
        })
    }
}
