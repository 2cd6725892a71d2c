use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ErrorKind};

/// 后端成功响应的信封格式，启动时按配置选定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeFormat {
    /// `{ code, message, data, timestamp }`
    #[default]
    Standard,
    /// `{ success, data, message, code }`
    Flagged,
}

impl FromStr for EnvelopeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(EnvelopeFormat::Standard),
            "flagged" => Ok(EnvelopeFormat::Flagged),
            other => Err(format!("unknown envelope format: {}", other)),
        }
    }
}

impl EnvelopeFormat {
    /// 解包 2xx 响应体；没有 `data` 字段时原样返回
    pub fn unwrap_success(&self, body: Value) -> Result<Value, ApiError> {
        if *self == EnvelopeFormat::Flagged
            && body.get("success").and_then(Value::as_bool) == Some(false)
        {
            let message = error_message(&body)
                .unwrap_or_else(|| ErrorKind::Unexpected.default_message().to_string());
            return Err(ApiError::new(ErrorKind::Unexpected, message)
                .with_field_errors(field_errors(&body)));
        }

        Ok(take_data(body))
    }
}

fn take_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// 提取可读错误信息，依次尝试 `msg` 与 `message`
pub fn error_message(body: &Value) -> Option<String> {
    ["msg", "message"].iter().find_map(|field| {
        body.get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// 提取字段级错误，支持对象 `{ field: msg }` 和数组 `[{ field, message }]` 两种形式
pub fn field_errors(body: &Value) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    let details = body.get("details").or_else(|| body.get("errors"));

    match details {
        Some(Value::Object(map)) => {
            for (field, value) in map {
                let message = match value {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("; "),
                    other => other.to_string(),
                };
                errors.insert(field.clone(), message);
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                let field = item.get("field").and_then(Value::as_str);
                let message = error_message(item);
                if let (Some(field), Some(message)) = (field, message) {
                    errors.insert(field.to_string(), message);
                }
            }
        }
        _ => {}
    }

    errors
}
