/// API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HMAC secret used to verify bearer tokens issued by the auth service.
    pub jwt_secret: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Optional frontend origin for CORS. When unset, any origin is allowed.
    pub client_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            jwt_secret: required_var("JWT_SECRET"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            client_url: std::env::var("CLIENT_URL").ok().filter(|s| !s.is_empty()),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}
