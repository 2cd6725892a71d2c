use super::{CacheKey, KeyPattern, OP_DETAIL, OP_LIST, OP_STATS, ResourceKind};
use crate::api::models::CommentQuery;

/// 评论列表键族
pub fn lists() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Comments, OP_LIST)
}

/// 生成评论列表缓存键
pub fn list(query: &CommentQuery) -> CacheKey {
    CacheKey::new(ResourceKind::Comments, OP_LIST).with_query(query)
}

/// 生成评论统计缓存键
pub fn stats() -> CacheKey {
    CacheKey::new(ResourceKind::Comments, OP_STATS)
}

pub fn stats_pattern() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Comments, OP_STATS)
}

pub fn details() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Comments, OP_DETAIL)
}

/// 生成评论详情缓存键
pub fn detail(id: &str) -> CacheKey {
    CacheKey::new(ResourceKind::Comments, OP_DETAIL).param("id", id)
}

pub fn detail_pattern(id: &str) -> KeyPattern {
    details().param("id", id)
}
