use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".contrib-tracker.toml";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid bind address: {0}")]
    InvalidBind(String),
}

/// Top-level configuration loaded from .contrib-tracker.toml.
///
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Upstream GitHub settings used by the gateway
    #[serde(default)]
    pub github: GitHubConfig,

    /// Gateway listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Settings for the `lookup` client
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// Base URL of the REST API (e.g., https://api.github.com)
    pub api_url: Option<String>,
}

impl GitHubConfig {
    /// Token to send as a bearer credential. Empty values count as absent.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind.as_deref().unwrap_or(DEFAULT_BIND);
        raw.parse()
            .map_err(|_| ConfigError::InvalidBind(raw.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    pub gateway_url: Option<String>,
}

impl ClientConfig {
    pub fn gateway_url(&self) -> &str {
        self.gateway_url
            .as_deref()
            .unwrap_or(DEFAULT_GATEWAY_URL)
            .trim_end_matches('/')
    }
}

impl Config {
    /// Load configuration from .contrib-tracker.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        Ok(config.with_env_token())
    }

    /// Load from a specific path without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill in the GitHub token from GITHUB_TOKEN unless the config file set one.
    pub fn with_env_token(mut self) -> Config {
        if self.github.token().is_none() {
            self.github.token = std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use temp_env::with_vars;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token().is_none());
        assert_eq!(config.github.api_url(), "https://api.github.com");
        assert_eq!(config.client.gateway_url(), "http://127.0.0.1:3000");
        assert_eq!(
            config.server.bind_addr().unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
token = "ghp_abc"
api_url = "http://localhost:9999/"

[server]
bind = "0.0.0.0:8080"

[client]
gateway_url = "http://tracker.internal/"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.token(), Some("ghp_abc"));
        assert_eq!(config.github.api_url(), "http://localhost:9999");
        assert_eq!(config.server.bind_addr().unwrap().port(), 8080);
        assert_eq!(config.client.gateway_url(), "http://tracker.internal");
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = ServerConfig {
            bind: Some("not-an-address".to_string()),
        };
        let err = config.bind_addr().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBind(ref raw) if raw == "not-an-address"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"from-file\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.github.token(), Some("from-file"));
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[github\ntoken = ").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let github = GitHubConfig {
            token: Some("  ".to_string()),
            api_url: None,
        };
        assert!(github.token().is_none());
    }

    #[test]
    fn env_token_used_when_file_has_none() {
        with_vars([("GITHUB_TOKEN", Some("env-token"))], || {
            let config = Config::default().with_env_token();
            assert_eq!(config.github.token(), Some("env-token"));
        });
    }

    #[test]
    fn file_token_takes_precedence_over_env() {
        with_vars([("GITHUB_TOKEN", Some("env-token"))], || {
            let mut config = Config::default();
            config.github.token = Some("file-token".to_string());
            let config = config.with_env_token();
            assert_eq!(config.github.token(), Some("file-token"));
        });
    }

    #[test]
    fn empty_env_token_is_ignored() {
        with_vars([("GITHUB_TOKEN", Some(""))], || {
            let config = Config::default().with_env_token();
            assert!(config.github.token().is_none());
        });
    }
}
