use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub parser: ParserConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_env("ALPS")
    }

    /// Load configuration from environment with custom prefix
    pub fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(Config::builder())?.add_source(
            Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from file with environment overrides
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("ALPS")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("llm.provider", "anthropic")?
            .set_default("llm.model", default_model())?
            .set_default("llm.api_key", "")?
            .set_default("llm.base_url", default_base_url())?
            .set_default("llm.max_tokens", i64::from(default_max_tokens()))?
            .set_default("llm.temperature", f64::from(default_temperature()))?
            .set_default("llm.connect_timeout_secs", default_connect_timeout_secs() as i64)?
            .set_default("llm.read_timeout_secs", default_read_timeout_secs() as i64)?
            .set_default("parser.target_section", default_target_section() as i64)?
            .set_default("parser.section_title", default_section_title())?
            .set_default("parser.max_concurrency", default_max_concurrency() as i64)?
            .set_default("parser.verify_title", false)
    }
}

/// Structured-extraction backend configuration
#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(provider: String, model: String, api_key: String) -> Self {
        Self {
            provider,
            model,
            api_key,
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeouts(mut self, connect_secs: u64, read_secs: u64) -> Self {
        self.connect_timeout_secs = connect_secs;
        self.read_timeout_secs = read_secs;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

fn default_model() -> String {
    "claude-3-7-sonnet-20250219".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_max_tokens() -> u32 {
    16 * 1024
}

fn default_temperature() -> f32 {
    0.0
}

fn default_connect_timeout_secs() -> u64 {
    60 // 1 minute for connection
}

fn default_read_timeout_secs() -> u64 {
    300 // 5 minutes
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// 1-indexed ordinal of the section to extract
    #[serde(default = "default_target_section")]
    pub target_section: usize,
    /// Title given to the extracted section
    #[serde(default = "default_section_title")]
    pub section_title: String,
    /// Maximum in-flight extraction calls
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Check the section heading against `section_title` during validation
    #[serde(default)]
    pub verify_title: bool,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self {
            target_section: default_target_section(),
            section_title: default_section_title(),
            max_concurrency: default_max_concurrency(),
            verify_title: false,
        }
    }

    pub fn with_target_section(mut self, target: usize) -> Self {
        self.target_section = target;
        self
    }

    pub fn with_section_title(mut self, title: String) -> Self {
        self.section_title = title;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_title_verification(mut self, verify: bool) -> Self {
        self.verify_title = verify;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_target_section() -> usize {
    6
}

fn default_section_title() -> String {
    "Feature-Level Specification".to_string()
}

fn default_max_concurrency() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_llm_config_creation() {
        let config = LlmConfig::new(
            "anthropic".to_string(),
            "claude-3-7-sonnet".to_string(),
            "sk-test".to_string(),
        )
        .with_max_tokens(2048)
        .with_temperature(0.5)
        .with_timeouts(5, 30);

        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
        assert!(config.has_api_key());
    }

    #[test]
    fn test_llm_config_debug_redacts_key() {
        let config = LlmConfig::new(
            "anthropic".to_string(),
            "model".to_string(),
            "sk-very-secret".to_string(),
        );

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_llm_config_timeout_defaults() {
        let config = LlmConfig::new("anthropic".to_string(), "m".to_string(), String::new());

        assert_eq!(config.connect_timeout(), Duration::from_secs(60));
        assert_eq!(config.read_timeout(), Duration::from_secs(300));
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_parser_config_defaults() {
        let config = ParserConfig::default();

        assert_eq!(config.target_section, 6);
        assert_eq!(config.section_title, "Feature-Level Specification");
        assert_eq!(config.max_concurrency, 4);
        assert!(!config.verify_title);
    }

    #[test]
    fn test_parser_config_builder() {
        let config = ParserConfig::new()
            .with_target_section(3)
            .with_max_concurrency(8)
            .with_title_verification(true);

        assert_eq!(config.target_section, 3);
        assert_eq!(config.max_concurrency, 8);
        assert!(config.verify_title);
    }

    #[test]
    fn test_app_config_defaults_from_env() {
        let config = AppConfig::load_from_env("ALPS_CONFIG_TEST_UNSET_PREFIX").unwrap();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.base_url, "https://api.anthropic.com");
        assert_eq!(config.llm.read_timeout_secs, 300);
        assert_eq!(config.parser.target_section, 6);
        assert!(!config.parser.verify_title);
    }
}
