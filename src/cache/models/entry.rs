use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::time::Instant;

use crate::cache::keys::CacheKey;
use crate::error::ApiError;

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: Value,
    pub fetched_at: Instant,
    pub fetched_wall: DateTime<Utc>,
    pub stale_after: Duration,
    /// 产生该值的请求序号
    pub seq: u64,
    /// 被变更操作标记失效，下一次读取必须等待网络结果
    pub invalidated: bool,
    /// 乐观写入的预期值，尚未得到服务端确认
    pub optimistic: bool,
    pub last_error: Option<ApiError>,
}

impl CacheEntry {
    pub fn confirmed(key: CacheKey, value: Value, seq: u64, stale_after: Duration) -> Self {
        Self {
            key,
            value,
            fetched_at: Instant::now(),
            fetched_wall: Utc::now(),
            stale_after,
            seq,
            invalidated: false,
            optimistic: false,
            last_error: None,
        }
    }

    pub fn optimistic(key: CacheKey, value: Value, seq: u64, stale_after: Duration) -> Self {
        Self {
            optimistic: true,
            ..Self::confirmed(key, value, seq, stale_after)
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        !self.invalidated && now.saturating_duration_since(self.fetched_at) < self.stale_after
    }
}

/// 提供给界面的读取状态
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    /// 最近一次可展示的值，失效或请求失败时仍保留
    pub data: Option<T>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub is_stale: bool,
    pub is_invalidated: bool,
    pub is_optimistic: bool,
    pub is_fetching: bool,
    pub last_error: Option<ApiError>,
}

impl<T> QueryState<T> {
    pub fn empty(is_fetching: bool) -> Self {
        Self {
            data: None,
            fetched_at: None,
            is_stale: false,
            is_invalidated: false,
            is_optimistic: false,
            is_fetching,
            last_error: None,
        }
    }

    /// 首次加载中：没有任何可展示数据
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }
}
