//! Process configuration read from the environment (and `.env`).

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use feed_core::FilterRule;
use feed_logging::{LogDestination, LogSettings};
use log::LevelFilter;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REFRESH_SECS: u64 = 6 * 3600;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ARTIFACT_PATH: &str = "./data/calendar.ics";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot read blocklist file {path:?}: {source}")]
    BlocklistFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream_url: String,
    pub bind_addr: SocketAddr,
    pub artifact_path: PathBuf,
    pub blocklist: Vec<String>,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub cors_enabled: bool,
    /// Base URL advertised on the subscribe page, without trailing slash.
    pub public_url: Option<String>,
    pub log: LogSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let upstream_url = get("FEED_URL").ok_or(ConfigError::Missing("FEED_URL"))?;
        validate_upstream(&upstream_url)?;

        let ip: IpAddr = parse_or("BIND_ADDR", get("BIND_ADDR"), IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        let mut blocklist: Vec<String> = get("FEED_BLOCKLIST")
            .map(|raw| split_phrases(&raw, ';'))
            .unwrap_or_default();
        if let Some(file) = get("FEED_BLOCKLIST_FILE") {
            let path = PathBuf::from(file);
            let text = fs::read_to_string(&path)
                .map_err(|source| ConfigError::BlocklistFile { path, source })?;
            blocklist.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string),
            );
        }

        let refresh_secs = positive_secs(
            "FEED_REFRESH_SECS",
            get("FEED_REFRESH_SECS"),
            DEFAULT_REFRESH_SECS,
        )?;
        let fetch_secs = positive_secs(
            "FEED_FETCH_TIMEOUT_SECS",
            get("FEED_FETCH_TIMEOUT_SECS"),
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;

        let cors_enabled = match get("CORS_ENABLED") {
            Some(raw) => parse_bool("CORS_ENABLED", &raw)?,
            None => true,
        };

        let public_url = get("PUBLIC_URL").map(|url| url.trim_end_matches('/').to_string());

        let log = LogSettings {
            level: parse_or("LOG_LEVEL", get("LOG_LEVEL"), LevelFilter::Info)?,
            destination: parse_or(
                "LOG_DESTINATION",
                get("LOG_DESTINATION"),
                LogDestination::Terminal,
            )?,
            file_path: get("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| LogSettings::default().file_path),
        };

        Ok(Self {
            upstream_url,
            bind_addr: SocketAddr::new(ip, port),
            artifact_path: get("FEED_ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_PATH)),
            blocklist,
            refresh_interval: Duration::from_secs(refresh_secs),
            fetch_timeout: Duration::from_secs(fetch_secs),
            cors_enabled,
            public_url,
            log,
        })
    }

    pub fn filter_rule(&self) -> FilterRule {
        FilterRule::new(&self.blocklist)
    }
}

fn validate_upstream(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "FEED_URL",
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" | "webcal" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

fn split_phrases(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            reason: err.to_string(),
            value,
        }),
    }
}

fn positive_secs(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let secs: u64 = parse_or(var, raw, default)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(secs)
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
