use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::envelope::EnvelopeFormat;
use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1/admin";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub envelope_format: EnvelopeFormat,
    /// 本地凭据文件路径，未配置 Redis 时使用
    pub credentials_path: PathBuf,
    /// 配置后凭据保存在 Redis 中
    pub redis_url: Option<String>,
    pub redis_namespace: String,
    /// 未声明过期窗口的读取使用的默认值
    pub default_stale_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            envelope_format: EnvelopeFormat::Standard,
            credentials_path: PathBuf::from(".blog-admin/credentials.json"),
            redis_url: None,
            redis_namespace: "default".to_string(),
            default_stale_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let envelope_format = match env::var("ENVELOPE_FORMAT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "ENVELOPE_FORMAT",
                value,
            })?,
            Err(_) => defaults.envelope_format,
        };

        Ok(Config {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout_secs: match env::var("REQUEST_TIMEOUT_SECS") {
                Ok(value) => parse_secs("REQUEST_TIMEOUT_SECS", value, false)?,
                Err(_) => defaults.request_timeout_secs,
            },
            envelope_format,
            credentials_path: env::var("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            redis_namespace: env::var("REDIS_NAMESPACE").unwrap_or(defaults.redis_namespace),
            default_stale_secs: match env::var("DEFAULT_STALE_SECS") {
                Ok(value) => parse_secs("DEFAULT_STALE_SECS", value, true)?,
                Err(_) => defaults.default_stale_secs,
            },
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn default_stale(&self) -> Duration {
        Duration::from_secs(self.default_stale_secs)
    }
}

/// 解析秒数，允许带 `s` 后缀
fn parse_secs(key: &'static str, value: String, allow_zero: bool) -> Result<u64, ConfigError> {
    let parsed = value.trim().trim_end_matches('s').parse::<u64>();
    match parsed {
        Ok(0) if !allow_zero => Err(ConfigError::Invalid { key, value }),
        Ok(secs) => Ok(secs),
        Err(_) => Err(ConfigError::Invalid { key, value }),
    }
}
