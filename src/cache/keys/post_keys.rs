use super::{CacheKey, KeyPattern, OP_DETAIL, OP_LIST, ResourceKind};
use crate::api::models::PostQuery;

/// 文章列表键族
pub fn lists() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Posts, OP_LIST)
}

/// 生成文章列表缓存键
pub fn list(query: &PostQuery) -> CacheKey {
    CacheKey::new(ResourceKind::Posts, OP_LIST).with_query(query)
}

/// 文章详情键族
pub fn details() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Posts, OP_DETAIL)
}

/// 生成文章详情缓存键
pub fn detail(id: &str) -> CacheKey {
    CacheKey::new(ResourceKind::Posts, OP_DETAIL).param("id", id)
}

/// 单篇文章详情的匹配模式
pub fn detail_pattern(id: &str) -> KeyPattern {
    details().param("id", id)
}
