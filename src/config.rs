use std::net::{IpAddr, SocketAddr};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_access_expiration_secs: u64,
    pub jwt_refresh_expiration_secs: u64,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_redirect_uri: String,
    /// Base URL of the web client; used for CORS and for links inside emails.
    pub frontend_url: String,
    /// Outbound mail settings. `None` means mail is only logged.
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings for outbound mail.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, `JWT_SECRET`
    /// Optional with defaults: `SERVER_HOST`, `SERVER_PORT`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `JWT_ACCESS_EXPIRATION_SECS`, `JWT_REFRESH_EXPIRATION_SECS`, `FRONTEND_URL`,
    /// the `GOOGLE_*` / `GITHUB_*` OAuth settings and the `SMTP_*` mail settings.
    ///
    /// `PORT` overrides `SERVER_PORT` and the host defaults to `0.0.0.0` in production.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric / address
    /// variable cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let environment = match std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let jwt_access_expiration_secs = std::env::var("JWT_ACCESS_EXPIRATION_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("JWT_ACCESS_EXPIRATION_SECS must be a valid u64"))?;

        let jwt_refresh_expiration_secs = std::env::var("JWT_REFRESH_EXPIRATION_SECS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("JWT_REFRESH_EXPIRATION_SECS must be a valid u64"))?;

        let env_or_empty = |key: &str| std::env::var(key).unwrap_or_default();

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3001".to_string());

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level,
            jwt_secret,
            jwt_access_expiration_secs,
            jwt_refresh_expiration_secs,
            google_client_id: env_or_empty("GOOGLE_CLIENT_ID"),
            google_client_secret: env_or_empty("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: env_or_empty("GOOGLE_REDIRECT_URI"),
            github_client_id: env_or_empty("GITHUB_CLIENT_ID"),
            github_client_secret: env_or_empty("GITHUB_CLIENT_SECRET"),
            github_redirect_uri: env_or_empty("GITHUB_REDIRECT_URI"),
            frontend_url,
            smtp: SmtpConfig::from_env()?,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

impl SmtpConfig {
    /// Read `SMTP_*` variables. Returns `Ok(None)` when `SMTP_HOST` is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `SMTP_HOST` is set but credentials or the sender are missing,
    /// or if `SMTP_PORT` is not a valid u16.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        let Ok(host) = std::env::var("SMTP_HOST") else {
            return Ok(None);
        };

        let port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a valid u16"))?;
        let username = std::env::var("SMTP_USERNAME")
            .map_err(|_| anyhow::anyhow!("SMTP_USERNAME must be set when SMTP_HOST is set"))?;
        let password = std::env::var("SMTP_PASSWORD")
            .map_err(|_| anyhow::anyhow!("SMTP_PASSWORD must be set when SMTP_HOST is set"))?;
        let from_email = std::env::var("SMTP_FROM_EMAIL")
            .map_err(|_| anyhow::anyhow!("SMTP_FROM_EMAIL must be set when SMTP_HOST is set"))?;

        Ok(Some(Self {
            host,
            port,
            username,
            password,
            from_email,
        }))
    }
}
