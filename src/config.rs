// src/config.rs

pub mod token;

use self::token::load_or_create_external_config;
use crate::{cli::Cli, constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    /// 只作用于读请求 (GET)，写操作从不自动重试
    pub max_read_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accesstoken: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub network: NetworkConfig,
}

fn default_api_base_url() -> String {
    constants::DEFAULT_API_BASE_URL.to_string()
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            accesstoken: None,
            api_base_url: default_api_base_url(),
            network: NetworkConfig {
                connect_timeout_secs: Some(10),
                timeout_secs: Some(30),
                max_read_retries: Some(2),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_read_retries: u32,
}

/// `Url::join` 会丢弃没有结尾斜杠的最后一段路径，这里统一补上
pub fn normalize_base_url(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Ok(Url::parse(&with_slash)?)
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;

        let base_url = args
            .api_url
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                std::env::var(constants::ENV_API_URL)
                    .ok()
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or(external_config.api_base_url);

        Ok(Self {
            api_base_url: normalize_base_url(&base_url)?,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config.network.connect_timeout_secs.unwrap_or(10),
            ),
            timeout: Duration::from_secs(external_config.network.timeout_secs.unwrap_or(30)),
            max_read_retries: external_config.network.max_read_retries.unwrap_or(2),
        })
    }

    /// 以给定的基础地址构建配置，其余取默认值
    pub fn with_base_url(base_url: &str) -> AppResult<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(base_url)?,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            max_read_retries: 2,
        })
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse("http://127.0.0.1:1/api/").expect("static url"),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_read_retries: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_appends_slash() {
        let url = normalize_base_url("http://example.com/api/v1").unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/v1/");
        assert_eq!(
            url.join("student/courses").unwrap().as_str(),
            "http://example.com/api/v1/student/courses"
        );
    }

    #[test]
    fn test_external_config_fills_missing_fields() {
        let config: ExternalConfig = serde_json::from_str(r#"{"accesstoken":"abc"}"#).unwrap();
        assert_eq!(config.accesstoken.as_deref(), Some("abc"));
        assert_eq!(config.api_base_url, constants::DEFAULT_API_BASE_URL);
        assert!(config.network.timeout_secs.is_none());
    }
}
