/// Environment variable holding the remote API base address.
pub const API_BASE_ENV: &str = "API_GATEWAY_URL";

/// Runtime configuration read from the environment (and `.env`, when present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the remote API. Left optional here; a missing value is
    /// reported as a validation error when a submission is attempted.
    pub api_base: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Config {
            api_base: optional_env(API_BASE_ENV),
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        }
    }

    /// Command-line override wins over the environment.
    pub fn resolve_api_base(&self, cli_override: Option<&str>) -> Option<String> {
        cli_override
            .map(str::to_string)
            .or_else(|| self.api_base.clone())
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
