use crate::api::http_client::HttpClientConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5920/api";

pub const ENV_URL: &str = "HOSTCTL_URL";
pub const ENV_TOKEN: &str = "HOSTCTL_TOKEN";
pub const ENV_LOCALE: &str = "HOSTCTL_LOCALE";
pub const ENV_REGISTER_TOKEN: &str = "HOSTCTL_REGISTER_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where the scheduler's web API lives and how to address it
    #[serde(default)]
    pub server: ServerConfig,

    /// HTTP client tuning
    #[serde(default)]
    pub http: HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API root, including the `/api` prefix
    pub base_url: String,
    /// Session token forwarded as `Auth-Token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Agent registration secret forwarded as `X-Register-Token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_token: Option<String>,
    /// Sent as `Accept-Language`; the server answers in zh-CN or en-US
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            register_token: None,
            locale: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub pool_idle_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        let defaults = HttpClientConfig::default();
        Self {
            timeout_secs: defaults.timeout.as_secs(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            pool_idle_timeout_secs: defaults.pool_idle_timeout.as_secs(),
            pool_max_idle_per_host: defaults.pool_max_idle_per_host,
        }
    }
}

impl HttpSettings {
    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_idle_timeout: Duration::from_secs(self.pool_idle_timeout_secs),
            pool_max_idle_per_host: self.pool_max_idle_per_host,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".hostctl").join("config.yaml")
    }

    /// Load the config file at `path` (or the default location), falling back
    /// to defaults when it does not exist, then apply environment overrides.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::get_config_path);

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables win over the file
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = env_value(ENV_URL) {
            self.server.base_url = url;
        }
        if let Some(token) = env_value(ENV_TOKEN) {
            self.server.auth_token = Some(token);
        }
        if let Some(token) = env_value(ENV_REGISTER_TOKEN) {
            self.server.register_token = Some(token);
        }
        if let Some(locale) = env_value(ENV_LOCALE) {
            self.server.locale = Some(locale);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("server.base_url is empty".to_string()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    // Helper methods for testing
    pub fn new_for_test(base_url: &str, auth_token: Option<&str>) -> Self {
        Self {
            server: ServerConfig {
                base_url: base_url.to_string(),
                auth_token: auth_token.map(str::to_string),
                register_token: None,
                locale: None,
            },
            http: HttpSettings::default(),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
