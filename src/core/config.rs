//! Client configuration.
//!
//! On the server load it with `Config::from_env()` after calling `dotenvy::dotenv()`.
//! The WASM bundle has no process environment, so it uses `Config::compiled()`,
//! which reads `API_BASE_URL` when the bundle is built.

/// Base URL used when `API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Configuration shared by every component that talks to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend origin, e.g. `https://api.example.com`
    pub api_base_url: String,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("API_BASE_URL").ok())
    }

    /// Configuration baked in at build time.
    pub fn compiled() -> Self {
        Self::from_value(option_env!("API_BASE_URL").map(str::to_string))
    }

    fn from_value(value: Option<String>) -> Self {
        let api_base_url = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self { api_base_url }
    }

    /// Join `path` onto the base URL with exactly one `/` between them
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
