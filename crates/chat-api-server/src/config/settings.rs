use anyhow::{bail, Result};
use chat_cache::CacheOptions;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub cache: CacheOptions,
    pub chat: ChatConfig,
    pub llm: LlmConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn default_locale() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    /// Upper bound on messages kept per conversation
    pub max_saved_messages: usize,
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: usize,
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    pub chat_system_prompt: String,
    /// `{{LOCALE}}` is replaced with the conversation locale
    pub greeting_prompt: String,
    pub suggestions_system_prompt: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(true))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.chat.max_saved_messages == 0 {
            bail!("chat.max_saved_messages must be greater than 0");
        }
        if self.chat.default_locale.trim().is_empty() {
            bail!("chat.default_locale cannot be empty");
        }
        if self.llm.timeout_seconds == 0 {
            bail!("llm.timeout_seconds must be greater than 0");
        }
        if self.llm.base_url.trim().is_empty() {
            bail!("llm.base_url cannot be empty");
        }
        if !self.prompts.greeting_prompt.contains("{{LOCALE}}") {
            bail!("prompts.greeting_prompt must contain the {{{{LOCALE}}}} placeholder");
        }
        self.cache.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_cache::CacheType;
    use config::FileFormat;

    const BASE: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[chat]
max_saved_messages = 20

[llm]
base_url = "http://localhost:8081"
model = "gpt-4o-mini"
timeout_seconds = 30
max_tokens = 400
temperature = 0.7

[prompts]
chat_system_prompt = "You are a helpful tourist guide."
greeting_prompt = "Introduce yourself. Reply in the language of the following locale: {{LOCALE}}."
suggestions_system_prompt = "Suggest follow-up actions."
"#;

    fn parse(extra: &str) -> Result<Settings> {
        let toml = format!("{}\n{}", BASE, extra);
        let settings: Settings = Config::builder()
            .add_source(File::from_str(&toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn test_local_cache_settings() {
        let settings = parse("[cache]\ntype = \"local\"\nexpiration_seconds = 3600").unwrap();

        assert_eq!(settings.cache.cache_type, CacheType::Local);
        assert_eq!(settings.cache.expiration_seconds, Some(3600));
        assert_eq!(settings.chat.max_saved_messages, 20);
        assert_eq!(settings.chat.default_locale, "en");
        assert!(settings.llm.api_key.is_none());
    }

    #[test]
    fn test_shared_cache_requires_connection_string() {
        let err = parse("[cache]\ntype = \"shared\"").unwrap_err();
        assert!(err.to_string().contains("connection_string"));

        let settings = parse(
            "[cache]\ntype = \"shared\"\nconnection_string = \"redis://cache:6379\"",
        )
        .unwrap();
        assert_eq!(settings.cache.cache_type, CacheType::Shared);
    }

    #[test]
    fn test_missing_cache_section_is_fatal() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_zero_history_rejected() {
        let toml = BASE.replace("max_saved_messages = 20", "max_saved_messages = 0");
        let settings: Settings = Config::builder()
            .add_source(File::from_str(&toml, FileFormat::Toml))
            .add_source(File::from_str("[cache]\ntype = \"local\"", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("max_saved_messages"));
    }
}
