use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

const PLACEHOLDER_SECRET: &str = "change-me-in-production";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS, e.g. the SPA dev server.
    pub frontend_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub dir: String,
    pub max_file_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "./uploads".to_string(),
            max_file_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Settings {
    /// Loads and validates settings for the API server.
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Self::load()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings without checking the signing secret. Tools that never
    /// issue tokens, like the seeder, use this directly.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.frontend_origin", "http://localhost:3000")?
            .set_default("database.url", "sqlite://alumni.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.token_duration_hours", 24 * 7)?
            .set_default("uploads.dir", "./uploads")?
            .set_default("uploads.max_file_bytes", 5 * 1024 * 1024)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with ALUMNI__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("ALUMNI").separator("__"))

            .build()?;

        config.try_deserialize()
    }

    /// Rejects settings that would let anyone mint bearer tokens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.auth.jwt_secret.trim();
        if secret.is_empty() || secret == PLACEHOLDER_SECRET {
            return Err(ConfigError::Message(
                "auth.jwt_secret must be set (ALUMNI__AUTH__JWT_SECRET)".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                frontend_origin: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://alumni.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                token_duration_hours: 24 * 7,
            },
            uploads: UploadConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_no_signing_secret() {
        let settings = Settings::default();
        assert!(settings.auth.jwt_secret.is_empty());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn placeholder_and_blank_secrets_are_rejected() {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = PLACEHOLDER_SECRET.to_string();
        assert!(settings.validate().is_err());
        settings.auth.jwt_secret = "   ".to_string();
        assert!(settings.validate().is_err());
        settings.auth.jwt_secret = "a-real-deployment-secret".to_string();
        assert!(settings.validate().is_ok());
    }
}
