/// Configuration management for the API server
///
/// Configuration comes from environment variables; a `.env` file is loaded
/// first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `JWT_SECRET`: shared HS256 secret of the identity provider (required, >= 32 chars)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: `*`)
/// - `DEFAULT_PAGE_SIZE`: page size when a list request has no `limit` (default: 6)
/// - `RUST_LOG`: log filter (default: `recipebook_api=debug,tower_http=debug`)
///
/// # Example
///
/// ```no_run
/// use recipebook_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Page size used when a list request has no `limit`
    pub default_page_size: i64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 secret shared with the identity provider
    pub secret: String,
}

fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - a numeric variable does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let default_page_size: i64 = var_or("DEFAULT_PAGE_SIZE", 6)?;
        if default_page_size < 1 {
            anyhow::bail!("DEFAULT_PAGE_SIZE must be at least 1");
        }

        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: var_or("API_PORT", 8080)?,
                cors_origins,
                default_page_size,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig { secret: jwt_secret },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.is_empty() || self.api.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                default_page_size: 6,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("https://a.example, ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_allows_any_origin() {
        let mut config = config();
        assert!(config.allows_any_origin());

        config.api.cors_origins = vec!["https://recipes.example".to_string()];
        assert!(!config.allows_any_origin());
    }
}
