use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// 错误分类，由 HTTP 客户端统一判定，下游只透传
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 422/400，字段级校验失败，或本地参数校验失败
    Validation,
    /// 401，会话终止
    Auth,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 5xx，可手动重试
    Server,
    /// 无响应或超时，可重试
    Network,
    /// 其他状态码、无法解析的响应体
    Unexpected,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Auth,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unexpected,
        }
    }

    /// 后端未给出消息时的兜底提示
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "参数校验失败",
            ErrorKind::Auth => "登录已过期，请重新登录",
            ErrorKind::Forbidden => "访问被拒绝",
            ErrorKind::NotFound => "资源不存在",
            ErrorKind::Server => "服务器错误，请稍后重试",
            ErrorKind::Network => "网络错误，请检查网络连接",
            ErrorKind::Unexpected => "请求失败",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
    /// 字段名 -> 错误信息，用于表单内联展示
    pub field_errors: BTreeMap<String, String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_field_errors(mut self, field_errors: BTreeMap<String, String>) -> Self {
        self.field_errors = field_errors;
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn decode(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Unexpected, format!("响应解析失败: {}", err))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Server | ErrorKind::Network)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("环境变量 {key} 的值无效: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("创建 HTTP 客户端失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("读写凭据文件失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("凭据序列化失败: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Redis 操作失败: {0}")]
    Redis(#[from] redis::RedisError),
}
