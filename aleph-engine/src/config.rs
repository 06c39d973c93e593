use crate::adapter::Limits;
use crate::retry::RetryPolicy;
use aleph_types::TranslationGenre;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_PATH_ENV: &str = "ALEPHBOT_CONFIG";
pub const API_KEY_ENV: &str = "ALEPHBOT_NAKDAN_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub nakdan: NakdanConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NakdanConfig {
    #[serde(default = "default_vowelize_url")]
    pub vowelize_url: String,
    #[serde(default = "default_analyze_url")]
    pub analyze_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default)]
    pub default_genre: TranslationGenre,
    #[serde(default)]
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_vowelize_url() -> String { "https://nakdan-2-0.loadbalancer.dicta.org.il/api".to_string() }
fn default_analyze_url() -> String { "https://nakdan-for-morph-analysis.loadbalancer.dicta.org.il/addnikud".to_string() }
fn default_ws_url() -> String { "wss://translate.loadbalancer.dicta.org.il/api/ws".to_string() }

fn default_max_text_length() -> usize { aleph_types::DEFAULT_MAX_TEXT_LENGTH }
fn default_timeout_secs() -> f64 { 10.0 }
fn default_cooldown_secs() -> u64 { 30 }

fn default_max_attempts() -> u32 { 3 }
fn default_base_delay_ms() -> u64 { 2000 }
fn default_max_delay_ms() -> u64 { 10_000 }

impl Default for NakdanConfig {
    fn default() -> Self {
        Self {
            vowelize_url: default_vowelize_url(),
            analyze_url: default_analyze_url(),
            api_key: None,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            default_genre: TranslationGenre::default(),
            temperature: 0.0,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            timeout_secs: default_timeout_secs(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nakdan: NakdanConfig::default(),
            translation: TranslationConfig::default(),
            limits: LimitsConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay secrets from the environment. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.nakdan.api_key = Some(key);
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
        )
    }

    pub fn limits(&self) -> Limits {
        let timeout = if self.limits.timeout_secs.is_finite() && self.limits.timeout_secs > 0.0 {
            Duration::from_secs_f64(self.limits.timeout_secs)
        } else {
            warn!(
                "Invalid timeout_secs {}, using {:?}",
                self.limits.timeout_secs,
                aleph_types::DEFAULT_TIMEOUT
            );
            aleph_types::DEFAULT_TIMEOUT
        };

        Limits {
            max_text_length: self.limits.max_text_length,
            timeout,
            cooldown: Duration::from_secs(self.limits.cooldown_secs),
        }
    }
}

/// `$ALEPHBOT_CONFIG`, else `<config dir>/alephbot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("alephbot").join("config.toml"))
}

pub fn load_config() -> Config {
    let mut config = read_config_file();
    config.apply_env(|name| std::env::var(name).ok());
    config
}

fn read_config_file() -> Config {
    let Some(config_path) = config_path() else {
        warn!("No config directory available, using default config");
        return Config::default();
    };

    let config_str = match fs::read_to_string(&config_path) {
        Ok(s) => s,
        Err(_) => {
            warn!(
                "Could not read config file at {}, using defaults",
                config_path.display()
            );
            return Config::default();
        }
    };

    match Config::from_toml_str(&config_str) {
        Ok(config) => {
            info!("Loaded config from {}", config_path.display());
            config
        }
        Err(e) => {
            warn!("Failed to parse config: {}, using defaults", e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.limits.max_text_length, 500);
        assert_eq!(config.limits.cooldown_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.translation.default_genre, TranslationGenre::ModernFancy);
        assert!(config.nakdan.api_key.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [limits]
            timeout_secs = 2.5

            [translation]
            default_genre = "biblical"
            "#,
        )
        .unwrap();

        assert_eq!(config.limits.max_text_length, 500);
        assert_eq!(config.limits().timeout, Duration::from_millis(2500));
        assert_eq!(config.translation.default_genre, TranslationGenre::Biblical);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml_str("[limits\nmax_text_length = ").is_err());
        assert!(Config::from_toml_str("[limits]\nmax_text_length = \"many\"").is_err());
    }

    #[test]
    fn test_env_api_key_override() {
        let mut config = Config::default();
        config.apply_env(|name| (name == API_KEY_ENV).then(|| "from-env".to_string()));
        assert_eq!(config.nakdan.api_key.as_deref(), Some("from-env"));

        let mut config = Config::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert!(config.nakdan.api_key.is_none());
    }

    #[test]
    fn test_nonpositive_timeout_falls_back() {
        let mut config = Config::default();
        config.limits.timeout_secs = 0.0;
        assert_eq!(config.limits().timeout, aleph_types::DEFAULT_TIMEOUT);
    }
}
