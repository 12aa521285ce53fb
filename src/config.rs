use anyhow::{Context, Result};

const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/auth/callback";
const DEFAULT_BUCKET: &str = "blog-posts";

/// OAuth2 provider configuration (client credentials, redirect, scopes).
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
    /// Endpoint overrides, used by tests. `None` means the provider defaults.
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub userinfo_url: Option<String>,
}

impl OAuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: require_env("GOOGLE_CLIENT_ID")?,
            client_secret: require_env("GOOGLE_CLIENT_SECRET")?,
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/userinfo.profile".to_string(),
                "https://www.googleapis.com/auth/userinfo.email".to_string(),
            ],
            auth_url: None,
            token_url: None,
            userinfo_url: None,
        })
    }
}

/// S3-compatible object store configuration.
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    /// Endpoint as `host` or `host:port`, without scheme.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Use TLS when talking to the endpoint.
    pub secure: bool,
}

impl ObjectStoreConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: require_env("MINIO_ENDPOINT")?,
            access_key: require_env("MINIO_ACCESS_KEY")?,
            secret_key: require_env("MINIO_SECRET_KEY")?,
            bucket: DEFAULT_BUCKET.to_string(),
            region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            secure: true,
        })
    }
}

/// Top-level server configuration, built once at startup and passed by
/// reference into the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Key material for the private session cookie. Must be at least 64
    /// bytes when set; a per-process random key is generated otherwise.
    pub cookie_secret: Option<String>,
    pub oauth: OAuthConfig,
    pub object_store: ObjectStoreConfig,
}

impl Config {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("BLOG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("BLOG_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: std::env::var("BLOG_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string()),
            cookie_secret: std::env::var("BLOG_COOKIE_SECRET").ok(),
            oauth: OAuthConfig::from_env()?,
            object_store: ObjectStoreConfig::from_env()?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("missing required environment variable {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_oauth() -> OAuthConfig {
        OAuthConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            scopes: vec![],
            auth_url: None,
            token_url: None,
            userinfo_url: None,
        }
    }

    #[test]
    fn test_server_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9090,
            database_url: "sqlite::memory:".to_string(),
            cookie_secret: None,
            oauth: test_oauth(),
            object_store: ObjectStoreConfig {
                endpoint: "localhost:9000".to_string(),
                access_key: "ak".to_string(),
                secret_key: "sk".to_string(),
                bucket: DEFAULT_BUCKET.to_string(),
                region: "us-east-1".to_string(),
                secure: false,
            },
        };
        assert_eq!(config.server_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn test_require_env_missing() {
        let err = require_env("MINBLOG_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("MINBLOG_TEST_UNSET_VARIABLE"));
    }
}
