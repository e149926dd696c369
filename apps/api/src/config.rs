use anyhow::{Context, Result};

const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_JOB_SITE_HOSTS: &str =
    "www.ycombinator.com,ycombinator.com,www.workatastartup.com,workatastartup.com";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub admin_password: String,
    pub fetch_timeout_secs: u64,
    /// Hosts job pages may be fetched from. Empty allows any host.
    pub job_site_hosts: Vec<String>,
    pub max_job_page_bytes: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_api_url: env_or("LLM_API_URL", DEFAULT_LLM_API_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            admin_password: env_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
            fetch_timeout_secs: parse_env("FETCH_TIMEOUT_SECS", 10)?,
            job_site_hosts: host_list(&env_or("JOB_SITE_HOSTS", DEFAULT_JOB_SITE_HOSTS)),
            max_job_page_bytes: parse_env("MAX_JOB_PAGE_BYTES", 5 * 1024 * 1024)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            port: parse_env("PORT", 3001)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// True when `ADMIN_PASSWORD` was not provided and the built-in default is in effect.
    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

fn host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|host| host.trim().to_ascii_lowercase())
        .filter(|host| !host.is_empty())
        .collect()
}

#[cfg(test)]
impl Config {
    /// Local-only settings for handler and client tests.
    pub fn for_tests() -> Self {
        Config {
            llm_api_key: "test-key".to_string(),
            llm_api_url: "http://127.0.0.1:9/unused".to_string(),
            llm_model: "test-model".to_string(),
            admin_password: "s3cret".to_string(),
            fetch_timeout_secs: 1,
            job_site_hosts: host_list(DEFAULT_JOB_SITE_HOSTS),
            max_job_page_bytes: 64 * 1024,
            max_upload_bytes: 64 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
