//! Storefront server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded once at startup and injected everywhere.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub http_port: u16,
    /// Path for the embedded database files
    pub database_path: String,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for customer authentication
    pub jwt_secret: String,
    /// Lemon Squeezy API key (bearer token for checkout creation)
    pub lemonsqueezy_api_key: String,
    /// Lemon Squeezy store id
    pub lemonsqueezy_store_id: String,
    /// Lemon Squeezy variant id used for custom-priced checkouts
    pub lemonsqueezy_variant_id: String,
    /// Lemon Squeezy webhook signing secret
    pub lemonsqueezy_webhook_secret: String,
    /// Storefront base URL, used for the post-checkout redirect
    pub frontend_url: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development
    /// environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/store.db".into()),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            lemonsqueezy_api_key: Self::require_secret("LEMONSQUEEZY_API_KEY", &environment)?,
            lemonsqueezy_store_id: std::env::var("LEMONSQUEEZY_STORE_ID").unwrap_or_default(),
            lemonsqueezy_variant_id: std::env::var("LEMONSQUEEZY_VARIANT_ID").unwrap_or_default(),
            lemonsqueezy_webhook_secret: Self::require_secret(
                "LEMONSQUEEZY_WEBHOOK_SECRET",
                &environment,
            )?,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        })
    }
}
