//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

use codechat_core::provider::{AnthropicConfig, AnthropicProvider};

/// Runtime configuration for codechat-server.
///
/// Every field except the provider credential has a default, so a bare
/// `ANTHROPIC_API_KEY=… codechat-server` serves the current directory.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Directory that file reads and chat file context are confined to.
    pub project_root: PathBuf,

    /// Model provider credential. Empty when unset; startup then fails.
    pub api_key: String,

    /// Provider base URL (default: the public Anthropic API).
    pub provider_base_url: String,

    /// Model identifier sent with each completion.
    pub model: String,

    /// Upper bound on generated tokens per completion.
    pub max_tokens: u32,

    /// Extra `ext=label` pairs merged into the extension table.
    pub extra_extensions: String,

    /// Install the logging completion hook.
    pub log_completions: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS allow-list; wildcard when `None`.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("project_root", &self.project_root)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("provider_base_url", &self.provider_base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("extra_extensions", &self.extra_extensions)
            .field("log_completions", &self.log_completions)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_docs", &self.enable_docs)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("CODECHAT_BIND", "0.0.0.0:3000"),
            project_root: PathBuf::from(env_or("CODECHAT_PROJECT_ROOT", ".")),
            api_key: env_or(AnthropicProvider::API_KEY_ENV, ""),
            provider_base_url: env_or("ANTHROPIC_BASE_URL", AnthropicConfig::DEFAULT_BASE_URL),
            model: env_or("CODECHAT_MODEL", AnthropicConfig::DEFAULT_MODEL),
            max_tokens: parse_env("CODECHAT_MAX_TOKENS", AnthropicConfig::DEFAULT_MAX_TOKENS),
            extra_extensions: env_or("CODECHAT_EXTRA_EXTENSIONS", ""),
            log_completions: flag_env("CODECHAT_LOG_COMPLETIONS", false),
            log_level: env_or("CODECHAT_LOG", "info"),
            log_json: flag_env("CODECHAT_LOG_JSON", false),
            cors_allowed_origins: std::env::var("CODECHAT_CORS_ORIGINS").ok(),
            enable_docs: flag_env("CODECHAT_ENABLE_DOCS", true),
        }
    }

    /// Provider settings derived from this configuration.
    pub fn anthropic(&self) -> AnthropicConfig {
        AnthropicConfig::new(self.api_key.clone())
            .with_base_url(self.provider_base_url.clone())
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn flag_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with a fake key, rooted at `project_root`.
    pub fn for_tests(project_root: impl Into<PathBuf>) -> Self {
        Self {
            bind_address: "127.0.0.1:0".into(),
            project_root: project_root.into(),
            api_key: "sk-test".into(),
            provider_base_url: AnthropicConfig::DEFAULT_BASE_URL.into(),
            model: AnthropicConfig::DEFAULT_MODEL.into(),
            max_tokens: AnthropicConfig::DEFAULT_MAX_TOKENS,
            extra_extensions: String::new(),
            log_completions: false,
            log_level: "info".into(),
            log_json: false,
            cors_allowed_origins: None,
            enable_docs: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        for v in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_flag(v), Some(true), "{v}");
        }
        for v in ["0", "false", "No", "off"] {
            assert_eq!(parse_flag(v), Some(false), "{v}");
        }
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn anthropic_config_follows_server_config() {
        let mut cfg = Config::for_tests(".");
        cfg.model = "claude-test".into();
        cfg.max_tokens = 128;
        let a = cfg.anthropic();
        assert_eq!(a.model, "claude-test");
        assert_eq!(a.max_tokens, 128);
        assert_eq!(a.api_key, "sk-test");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", Config::for_tests("."));
        assert!(!rendered.contains("sk-test"));
    }
}
