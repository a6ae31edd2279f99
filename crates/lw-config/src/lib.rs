//! Configuration management for lw.
//!
//! Parses `lw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - every entry of `reload.command`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override development server host.
    pub host: Option<String>,
    /// Override development server port.
    pub port: Option<u16>,
    /// Full development server URL, replacing host and port.
    pub url: Option<String>,
    /// Override reload command.
    pub command: Option<Vec<String>>,
    /// Override serialized polling flag.
    pub serialize_polls: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "lw.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Development server to watch.
    pub server: ServerConfig,
    /// Reload behavior.
    pub reload: ReloadConfig,

    /// Full server URL given on the command line (set after loading).
    #[serde(skip)]
    pub url: Option<String>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Development server address.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8080,
        }
    }
}

/// Reload configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Program and arguments run when the server restarts.
    pub command: Option<Vec<String>>,
    /// Skip a poll while the previous one is still outstanding.
    pub serialize_polls: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`LW_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a URL to be a bare origin (`scheme://host[:port]`, optional `/`).
fn require_origin(url: &str, field: &str) -> Result<(), ConfigError> {
    let authority = url.split_once("://").map_or(url, |(_, rest)| rest);
    let rest = authority
        .find(['/', '?', '#'])
        .map_or("", |idx| &authority[idx..]);
    if !rest.is_empty() && rest != "/" {
        return Err(ConfigError::Validation(format!(
            "{field} must be an origin without path, query or fragment (got {url})"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `lw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The merged result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;

        Ok(config)
    }

    /// Origin of the development server (`http://host:port`, or the URL
    /// given on the command line).
    #[must_use]
    pub fn origin(&self) -> String {
        match &self.url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!("http://{}:{}", self.server.host, self.server.port),
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(url) = &settings.url {
            self.url = Some(url.clone());
        }
        if let Some(command) = &settings.command {
            self.reload.command = Some(command.clone());
        }
        if let Some(serialize_polls) = settings.serialize_polls {
            self.reload.serialize_polls = serialize_polls;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_reload()?;
        Ok(())
    }

    /// Validate server address.
    fn validate_server(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            require_non_empty(url, "url")?;
            require_http_url(url, "url")?;
            require_origin(url, "url")?;
            return Ok(());
        }

        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate reload command.
    fn validate_reload(&self) -> Result<(), ConfigError> {
        if let Some(command) = &self.reload.command {
            let program = command.first().ok_or_else(|| {
                ConfigError::Validation("reload.command cannot be empty".to_owned())
            })?;
            require_non_empty(program, "reload.command[0]")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(command) = &mut self.reload.command {
            for arg in command.iter_mut() {
                *arg = expand::expand_env(arg, "reload.command")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.reload.command, None);
        assert!(!config.reload.serialize_polls);
        assert_eq!(config.origin(), "http://localhost:8080");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 8081
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.origin(), "http://0.0.0.0:8081");
    }

    #[test]
    fn test_parse_reload_config() {
        let toml = r#"
[reload]
command = ["xdotool", "search", "--name", "Firefox", "key", "F5"]
serialize_polls = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.reload.command,
            Some(vec![
                "xdotool".to_owned(),
                "search".to_owned(),
                "--name".to_owned(),
                "Firefox".to_owned(),
                "key".to_owned(),
                "F5".to_owned(),
            ])
        );
        assert!(config.reload.serialize_polls);
    }

    #[test]
    fn test_origin_prefers_url() {
        let config = Config {
            url: Some("https://dev.example.com/".to_owned()),
            ..Default::default()
        };
        assert_eq!(config.origin(), "https://dev.example.com");
    }

    #[test]
    fn test_load_explicit_path() {
        let (_dir, path) = write_config(
            r#"
[server]
port = 9000
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let (_dir, path) = write_config("[server\nport = ");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let (_dir, path) = write_config(
            r#"
[server]
host = "example.test"
port = 9000

[reload]
command = ["true"]
"#,
        );
        let settings = CliSettings {
            port: Some(9100),
            command: Some(vec!["notify-send".to_owned(), "reload".to_owned()]),
            serialize_polls: Some(true),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.host, "example.test");
        assert_eq!(config.server.port, 9100);
        assert_eq!(
            config.reload.command,
            Some(vec!["notify-send".to_owned(), "reload".to_owned()])
        );
        assert!(config.reload.serialize_polls);
    }

    #[test]
    fn test_load_validates_cli_url() {
        let (_dir, path) = write_config("");
        let settings = CliSettings {
            url: Some("localhost:8080".to_owned()),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_load_cli_port_fixes_invalid_file_port() {
        let (_dir, path) = write_config("[server]\nport = 0\n");
        let settings = CliSettings {
            port: Some(9000),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.origin(), "http://localhost:9000");
    }

    #[test]
    fn test_load_cli_url_replaces_invalid_file_server() {
        let (_dir, path) = write_config("[server]\nhost = \"\"\nport = 0\n");
        let settings = CliSettings {
            url: Some("http://127.0.0.1:7000".to_owned()),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.origin(), "http://127.0.0.1:7000");
    }

    #[test]
    fn test_load_invalid_file_without_overrides_fails() {
        let (_dir, path) = write_config("[server]\nport = 0\n");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_apply_cli_settings_host() {
        let mut config = Config::default();
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_url() {
        let mut config = Config::default();
        let overrides = CliSettings {
            url: Some("http://127.0.0.1:7000".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.origin(), "http://127.0.0.1:7000");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.url, None);
        assert_eq!(config.reload.command, None);
    }

    #[test]
    fn test_expand_env_vars_server_host() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("LW_TEST_HOST", "devbox.local");
        }

        let toml = r#"
[server]
host = "${LW_TEST_HOST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.server.host, "devbox.local");

        unsafe {
            std::env::remove_var("LW_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_command() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("LW_TEST_BROWSER", "firefox");
        }

        let toml = r#"
[reload]
command = ["${LW_TEST_BROWSER}", "--new-tab", "${LW_TEST_PAGE:-http://localhost:8080/}"]
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(
            config.reload.command,
            Some(vec![
                "firefox".to_owned(),
                "--new-tab".to_owned(),
                "http://localhost:8080/".to_owned(),
            ])
        );

        unsafe {
            std::env::remove_var("LW_TEST_BROWSER");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_LW_CONFIG_TEST");
        }

        let toml = r#"
[server]
host = "${MISSING_VAR_LW_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let result = config.expand_env_vars();

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_LW_CONFIG_TEST"));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default();
        config.server.host = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_url_skips_host_and_port() {
        let mut config = Config::default();
        config.server.port = 0;
        config.url = Some("https://dev.example.com".to_owned());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_url_with_path_rejected() {
        let mut config = Config::default();
        config.url = Some("http://localhost:8080/docs".to_owned());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_validate_url_with_query_rejected() {
        let mut config = Config::default();
        config.url = Some("http://localhost:8080?x=1".to_owned());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_url_trailing_slash_passes() {
        let mut config = Config::default();
        config.url = Some("http://localhost:8080/".to_owned());

        assert!(config.validate().is_ok());
        assert_eq!(config.origin(), "http://localhost:8080");
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = Config::default();
        config.reload.command = Some(Vec::new());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reload.command"));
    }

    #[test]
    fn test_validate_empty_program() {
        let mut config = Config::default();
        config.reload.command = Some(vec![String::new(), "arg".to_owned()]);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reload.command[0]"));
    }
}
