use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::domain::{AssetManifest, DomainError, GenerationId, ProxySettings};
use crate::infrastructure::cache::CacheConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub proxy: ProxyConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Interceptor identity and upstream origin
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Current cache generation identifier
    pub generation: String,
    /// Base URL manifest entries are resolved against
    pub scope: String,
    /// Origin every intercepted request is forwarded to
    pub upstream: String,
    /// Core assets cached on install
    pub manifest: Vec<String>,
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            generation: "gousto-v2".to_string(),
            scope: "http://localhost:8081/".to_string(),
            upstream: "http://localhost:8081".to_string(),
            manifest: AssetManifest::default().entries().to_vec(),
            fetch_timeout_secs: None,
        }
    }
}

impl ProxyConfig {
    pub fn generation_id(&self) -> Result<GenerationId, DomainError> {
        GenerationId::new(self.generation.clone())
            .map_err(|e| DomainError::configuration(format!("proxy.generation: {}", e)))
    }

    pub fn upstream_url(&self) -> Result<Url, DomainError> {
        parse_absolute("proxy.upstream", &self.upstream)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    /// Validated interceptor identity
    pub fn to_settings(&self) -> Result<ProxySettings, DomainError> {
        let scope = parse_absolute("proxy.scope", &self.scope)?;
        let manifest = AssetManifest::new(self.manifest.iter().cloned());

        // Surface unresolvable entries at start-up rather than at install
        manifest.requests(&scope)?;

        Ok(ProxySettings {
            generation: self.generation_id()?,
            manifest,
            scope,
        })
    }
}

fn parse_absolute(field: &str, value: &str) -> Result<Url, DomainError> {
    let url = Url::parse(value).map_err(|e| {
        DomainError::configuration(format!("{} must be an absolute URL, got '{}': {}", field, value, e))
    })?;

    if url.cannot_be_a_base() {
        return Err(DomainError::configuration(format!(
            "{} cannot be used as a base URL: '{}'",
            field, value
        )));
    }

    Ok(url)
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("proxy.manifest")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
