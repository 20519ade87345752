use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_GENERATE_ENDPOINT, DEFAULT_MAX_TOKENS_PER_TURN, DEFAULT_MAX_TURNS,
    DEFAULT_PRIMARY_MODEL, DEFAULT_SECONDARY_MODEL, DEFAULT_SUMMARY_MAX_TOKENS,
};
use crate::session::SessionConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The two hemispheres
    #[serde(default)]
    pub models: ModelsConfig,

    /// Turn and token limits
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Generate endpoint configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Which model plays which hemisphere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Replies to the opening and writes the summary (`--llm1`)
    pub primary: String,
    /// Opens every conversation (`--llm2`)
    pub secondary: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_MODEL.to_string(),
            secondary: DEFAULT_SECONDARY_MODEL.to_string(),
        }
    }
}

/// Conversation limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub max_turns: usize,
    pub max_tokens_per_turn: u32,
    pub summary_max_tokens: u32,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            max_tokens_per_turn: DEFAULT_MAX_TOKENS_PER_TURN,
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
        }
    }
}

/// Ollama configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Full URL of the streaming generate endpoint
    pub endpoint: String,
    /// Per-request timeout; unset means wait as long as the model takes
    pub request_timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GENERATE_ENDPOINT.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Build the per-conversation settings from this configuration
    pub fn session_config(&self) -> Result<SessionConfig> {
        let config = SessionConfig::new(
            self.models.primary.clone(),
            self.models.secondary.clone(),
            self.conversation.max_turns,
            self.conversation.max_tokens_per_turn,
        )?
        .with_summary_tokens(self.conversation.summary_max_tokens)?;
        Ok(config)
    }
}

fn base_figment(global_config: Option<&Path>, local_config: &Path) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(global_config) = global_config {
        if global_config.exists() {
            figment = figment.merge(Toml::file(global_config));
        }
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(local_config));
    }

    // HEMISPHAIR_CONVERSATION__MAX_TURNS=3 and friends
    figment.merge(Env::prefixed("HEMISPHAIR_").split("__"))
}

/// Load configuration from multiple sources
///
/// Defaults, then the global config, the project-local `.hemisphair/config.toml`,
/// `HEMISPHAIR_` environment variables and finally `extra` (e.g. `--config FILE`).
pub fn load_config(extra: Option<&Path>) -> Result<Config> {
    let global_config = get_config_dir().ok().map(|dir| dir.join("config.toml"));
    let local_config = PathBuf::from(".hemisphair/config.toml");

    let mut figment = base_figment(global_config.as_deref(), &local_config);

    if let Some(path) = extra {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }

    figment.extract().context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "hemisphair") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("hemisphair"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<()> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    } else {
        println!("Configuration already exists at: {}", config_file.display());
    }

    // Create example local config
    let local_example = PathBuf::from(".hemisphair/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# Hemisphair Project Configuration
# Rename to config.toml to override global settings for this directory

[models]
primary = "llama3"
secondary = "mistral"

[conversation]
max_turns = 4
max_tokens_per_turn = 300
summary_max_tokens = 600

[ollama]
endpoint = "http://localhost:11434/api/generate"
# request_timeout_secs = 300
"#;
        std::fs::write(&local_example, example_config)?;
        println!("Created example configuration at: {}", local_example.display());
    }

    Ok(())
}
