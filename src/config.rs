use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::auth::{AuthConfig, normalize_email};
use crate::db::DatabaseConfig;
use crate::validation::{MIN_PASSWORD_LEN, is_valid_email};

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Everything needed to start the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    /// Admin account to create or promote at startup
    pub bootstrap_admin: Option<AdminSeed>,
}

#[derive(Clone, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("name", &self.name)
            .finish()
    }
}

impl ServerConfig {
    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("JWT secret must not be empty");
        }
        if self.auth.token_ttl_seconds == 0 {
            bail!("token lifetime must be greater than zero");
        }
        if let Some(seed) = &self.bootstrap_admin {
            seed.validate()?;
        }
        Ok(())
    }
}

impl AdminSeed {
    /// Apply the registration rules to the seeded account.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_email(&normalize_email(&self.email)) {
            bail!("admin email '{}' is not a valid address", self.email);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            bail!(
                "admin password must be at least {} characters",
                MIN_PASSWORD_LEN
            );
        }
        Ok(())
    }
}

/// Parse a token lifetime: plain seconds (`3600`) or a number with an
/// `s`, `m`, `h` or `d` suffix (`15m`, `7d`).
pub fn parse_duration_secs(value: &str) -> Result<u64> {
    let value = value.trim();
    let (digits, unit) = match value.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&value[..i], c.to_ascii_lowercase()),
        _ => (value, 's'),
    };

    let amount: u64 = digits
        .trim()
        .parse()
        .with_context(|| format!("invalid duration '{}'", value))?;

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        other => bail!("unknown duration unit '{}' in '{}'", other, value),
    };

    amount
        .checked_mul(multiplier)
        .with_context(|| format!("duration '{}' is too large", value))
}
