//! Runtime settings and persisted merge configurations.
//!
//! Settings come from environment variables, falling back to defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `MAILMERGE_HOST` | `127.0.0.1` |
//! | `MAILMERGE_PORT` | `8080` |
//! | `MAILMERGE_UPLOAD_DIR` | `./uploads` |
//! | `MAILMERGE_DRAFTS_DIR` | `./drafts` |
//! | `MAILMERGE_SENDER` | `mailmerge@localhost` |
//! | `MAILMERGE_CONFIG` | unset |
//! | `SMTP_HOST` | unset (live sending disabled) |
//! | `SMTP_PORT` | `587` |
//! | `SMTP_USERNAME`, `SMTP_PASSWORD` | unset |
//! | `SMTP_USE_TLS` | `true` |

mod merge_file;

pub use merge_file::{load_merge_config, save_merge_config};

use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub drafts_dir: PathBuf,
    /// From address of every generated message.
    pub sender: String,
    pub smtp: Option<SmtpSettings>,
    /// Merge configuration loaded at startup and written by "save config".
    pub merge_config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host,
                port: parse_or(&lookup, "SMTP_PORT", 587)?,
                username: var("SMTP_USERNAME"),
                password: var("SMTP_PASSWORD"),
                use_tls: parse_or(&lookup, "SMTP_USE_TLS", true)?,
            }),
            None => None,
        };

        Ok(Self {
            host: var("MAILMERGE_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "MAILMERGE_PORT", 8080)?,
            upload_dir: var("MAILMERGE_UPLOAD_DIR")
                .map_or_else(|| PathBuf::from("./uploads"), PathBuf::from),
            drafts_dir: var("MAILMERGE_DRAFTS_DIR")
                .map_or_else(|| PathBuf::from("./drafts"), PathBuf::from),
            sender: var("MAILMERGE_SENDER").unwrap_or_else(|| "mailmerge@localhost".to_string()),
            smtp,
            merge_config_path: var("MAILMERGE_CONFIG").map(PathBuf::from),
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.url(), "http://127.0.0.1:8080");
        assert_eq!(config.drafts_dir, PathBuf::from("./drafts"));
        assert_eq!(config.sender, "mailmerge@localhost");
        assert!(config.smtp.is_none());
        assert!(config.merge_config_path.is_none());
    }

    #[test]
    fn smtp_settings_follow_host() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USE_TLS", "false"),
            ("SMTP_USERNAME", "bot"),
        ]))
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "mail.example.com");
        assert_eq!(smtp.port, 2525);
        assert!(!smtp.use_tls);
        assert_eq!(smtp.username.as_deref(), Some("bot"));
        assert_eq!(smtp.password, None);
    }

    #[test]
    fn bad_port_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("MAILMERGE_PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { name: "MAILMERGE_PORT", .. }
        ));
    }
}
