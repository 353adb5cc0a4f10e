use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the catalog-intelligence service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

/// Catalog store (hosted Postgres exposed over a PostgREST-style API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    /// Upper bound on catalog rows embedded into a prompt
    pub catalog_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub groq_api_key: String,
    pub xai_api_key: String,
    pub openai_api_key: String,
    pub groq_model: String,
    pub xai_model: String,
    pub openai_model: String,
    pub max_tokens: i32,
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        // Load environment variables from .env files. The service may be started
        // from the repo root or from a deploy directory.
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!(
                "No .env file found in any expected location - continuing with env vars only"
            );
        }

        let config_path =
            env::var("CATALOG_AI_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail. A missing provider
        // key only becomes fatal when an action actually needs a provider.
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = env::var("CATALOG_AI_SERVER_NAME") {
            self.server.name = name;
        }

        // Store overrides
        if let Ok(url) = env::var("CATALOG_STORE_URL") {
            self.store.base_url = url;
        }
        if let Ok(key) = env::var("CATALOG_STORE_API_KEY") {
            self.store.api_key = key;
        }
        if let Ok(limit) = env::var("CATALOG_AI_CATALOG_LIMIT") {
            if let Ok(n) = limit.parse() {
                self.store.catalog_limit = n;
            }
        }

        // Provider key overrides
        if let Ok(key) = env::var("GROQ_API_KEY") {
            self.llm.groq_api_key = key;
        }
        if let Ok(key) = env::var("XAI_API_KEY") {
            self.llm.xai_api_key = key;
        }
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            self.llm.openai_api_key = key;
        }

        // Model overrides
        if let Ok(model) = env::var("CATALOG_AI_GROQ_MODEL") {
            self.llm.groq_model = model;
        }
        if let Ok(model) = env::var("CATALOG_AI_XAI_MODEL") {
            self.llm.xai_model = model;
        }
        if let Ok(model) = env::var("CATALOG_AI_OPENAI_MODEL") {
            self.llm.openai_model = model;
        }
        if let Ok(timeout) = env::var("CATALOG_AI_LLM_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.llm.timeout_seconds = secs;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.store.base_url.is_empty() {
            return Err("CATALOG_STORE_URL must be set".into());
        }
        if self.store.catalog_limit == 0 {
            return Err("catalog_limit cannot be 0".into());
        }
        if self.llm.max_tokens <= 0 {
            return Err("llm.max_tokens must be positive".into());
        }
        if self.llm.timeout_seconds == 0 {
            return Err("llm.timeout_seconds cannot be 0".into());
        }
        if self.llm.groq_api_key.is_empty()
            && self.llm.xai_api_key.is_empty()
            && self.llm.openai_api_key.is_empty()
        {
            return Err(
                "no LLM provider key set (GROQ_API_KEY / XAI_API_KEY / OPENAI_API_KEY)".into(),
            );
        }
        Ok(())
    }

    /// Get LLM call timeout as Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "catalog-intelligence".to_string(),
                version: "1.0.0".to_string(),
            },
            store: StoreConfig {
                base_url: String::new(),
                api_key: String::new(),
                catalog_limit: 50,
            },
            llm: LlmConfig {
                groq_api_key: String::new(),
                xai_api_key: String::new(),
                openai_api_key: String::new(),
                groq_model: "llama-3.3-70b-versatile".to_string(),
                xai_model: "grok-2-latest".to_string(),
                openai_model: "gpt-4o-mini".to_string(),
                max_tokens: 1500,
                timeout_seconds: 15,
            },
        }
    }
}
