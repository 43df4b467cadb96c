use brock_context::Profile;
use brock_types::{ChatConfig, LLMConfig, ProactiveConfig};
use chrono::FixedOffset;
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatSection,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub checkin: CheckinConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a request, streaming included
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database: "brock".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub title_model: String,
    pub summary_model: String,
    pub proactive_model: String,
    /// Overrides the OpenAI endpoint, for proxies and local gateways
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            title_model: "gpt-4o".to_string(),
            summary_model: "gpt-4o-mini".to_string(),
            proactive_model: "gpt-4o".to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    pub history_limit: usize,
    pub event_buffer: usize,
}

impl Default for ChatSection {
    fn default() -> Self {
        let defaults = ChatConfig::default();
        Self {
            history_limit: defaults.history_limit,
            event_buffer: defaults.event_buffer,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    /// Offset of the user's local time from UTC
    pub utc_offset_minutes: i32,
    /// IANA name reported by `get_current_time`
    pub timezone: String,
    /// Run the scheduler in-process at this interval; disabled when absent
    pub tick_interval_secs: Option<u64>,
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: -240,
            timezone: "America/New_York".to_string(),
            tick_interval_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushConfig {
    /// Gateway receiving one POST per device; notifications are only logged
    /// when unset
    #[serde(default)]
    pub gateway_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables `BROCK_<SECTION>__<KEY>`, e.g. `BROCK_SERVER__PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("BROCK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets come from the environment only
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok();
        if cfg.storage.backend == StorageBackend::Mongodb && cfg.mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn chat_config(&self) -> ChatConfig {
        let defaults = ChatConfig::default();
        ChatConfig {
            llm: LLMConfig::new(&self.llm.model)
                .with_temperature(self.llm.temperature)
                .with_max_tokens(self.llm.max_tokens),
            title_llm: LLMConfig {
                model: self.llm.title_model.clone(),
                ..defaults.title_llm
            },
            history_limit: self.chat.history_limit,
            event_buffer: self.chat.event_buffer,
        }
    }

    pub fn summary_llm(&self) -> LLMConfig {
        LLMConfig {
            model: self.llm.summary_model.clone(),
            ..LLMConfig::summary()
        }
    }

    pub fn proactive_config(&self) -> ProactiveConfig {
        let defaults = ProactiveConfig::default();
        ProactiveConfig {
            llm: LLMConfig {
                model: self.llm.proactive_model.clone(),
                ..defaults.llm
            },
            ..defaults
        }
    }

    /// Local offset for check-in scheduling and the time tool
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.checkin.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Message(format!(
                "checkin.utc_offset_minutes out of range: {}",
                self.checkin.utc_offset_minutes
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [storage]
            backend = "mongodb"
            database = "brock_test"

            [llm]
            model = "gpt-4o-mini"
            temperature = 0.5

            [chat]
            history_limit = 6

            [profile]
            name = "Sam"

            [checkin]
            utc_offset_minutes = 60

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.timeout_secs, 300);
        assert_eq!(config.storage.backend, StorageBackend::Mongodb);
        assert!(config.push.gateway_url.is_none());

        let chat = config.chat_config();
        assert_eq!(chat.llm.model, "gpt-4o-mini");
        assert_eq!(chat.llm.temperature, Some(0.5));
        assert_eq!(chat.llm.max_tokens, Some(1000));
        assert_eq!(chat.title_llm.max_tokens, Some(15));
        assert_eq!(chat.history_limit, 6);
        assert_eq!(chat.event_buffer, 100);

        assert_eq!(config.profile.name, "Sam");
        assert_eq!(config.profile.dietary_preferences.protein_target, Some(165));
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 3600);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.summary_llm().model, "gpt-4o-mini");
        assert_eq!(config.proactive_config().llm.temperature, Some(0.8));
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), -4 * 3600);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_offset_out_of_range() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [checkin]
            utc_offset_minutes = 100000
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.utc_offset().is_err());
    }
}
