use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub invites: InviteSettings,
    pub rate_limit: RateLimitSettings,
    pub admin: AdminSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Key rate limits on the first `x-forwarded-for` hop instead of the
    /// socket peer. Enable only behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

/// Verification parameters for tokens minted by the identity provider.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InviteSettings {
    /// Used when a create request does not name an expiry.
    pub default_expiry_days: i64,
    /// Attempts at drawing a code that does not collide with an existing invite.
    pub max_generation_attempts: u32,
    /// Optimistic commit retries when concurrent redemptions race on one code.
    pub max_commit_attempts: u32,
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitSettings {
    pub max_failed_attempts: u32,
    pub lockout_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    /// Emails allowed to bootstrap themselves as the first admins.
    pub initial_admins: Vec<String>,
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            default_expiry_days: 7,
            max_generation_attempts: 5,
            max_commit_attempts: 8,
            public_base_url: "http://localhost:5173/".to_string(),
        }
    }
}

/// Longest lockout `rate_limit.lockout_secs` may configure.
pub const MAX_LOCKOUT_SECS: i64 = 30 * 24 * 3600;

impl RateLimitSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LOCKOUT_SECS).contains(&self.lockout_secs) {
            return Err(ConfigError::Message(format!(
                "rate_limit.lockout_secs must be between 1 and {}, got {}",
                MAX_LOCKOUT_SECS, self.lockout_secs
            )));
        }
        if self.max_failed_attempts == 0 {
            return Err(ConfigError::Message(
                "rate_limit.max_failed_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_secs: 3600,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("INVITEGATE")
                    .list_separator(",")
                    .with_list_parse_key("admin.initial_admins")
                    .with_list_parse_key("app.cors_origins")
                    .try_parsing(true),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.trust_forwarded_for", false)?
            .set_default("database.url", "mongodb://localhost:27019")?
            .set_default("database.name", "invitegate")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.issuer", "invitegate")?
            .set_default("invites.default_expiry_days", 7)?
            .set_default("invites.max_generation_attempts", 5)?
            .set_default("invites.max_commit_attempts", 8)?
            .set_default("invites.public_base_url", "http://localhost:5173/")?
            .set_default("rate_limit.max_failed_attempts", 5)?
            .set_default("rate_limit.lockout_secs", 3600)?
            .set_default("admin.initial_admins", Vec::<String>::new())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.rate_limit.validate()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
