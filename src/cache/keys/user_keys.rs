use super::{CacheKey, KeyPattern, OP_DETAIL, OP_LIST, OP_LOGIN_LOGS, ResourceKind};
use crate::api::models::UserQuery;

/// 用户列表键族
pub fn lists() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Users, OP_LIST)
}

/// 生成用户列表缓存键
pub fn list(query: &UserQuery) -> CacheKey {
    CacheKey::new(ResourceKind::Users, OP_LIST).with_query(query)
}

/// 生成用户信息缓存键
pub fn detail(id: &str) -> CacheKey {
    CacheKey::new(ResourceKind::Users, OP_DETAIL).param("id", id)
}

pub fn detail_pattern(id: &str) -> KeyPattern {
    KeyPattern::operation(ResourceKind::Users, OP_DETAIL).param("id", id)
}

/// 生成登录日志缓存键
pub fn login_logs(id: &str, page: u32, limit: u32) -> CacheKey {
    CacheKey::new(ResourceKind::Users, OP_LOGIN_LOGS)
        .param("id", id)
        .param("page", page.to_string())
        .param("limit", limit.to_string())
}

/// 某个用户的登录日志
pub fn login_logs_pattern(id: &str) -> KeyPattern {
    KeyPattern::operation(ResourceKind::Users, OP_LOGIN_LOGS).param("id", id)
}
