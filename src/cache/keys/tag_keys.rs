use super::{CacheKey, KeyPattern, OP_CATALOG, OP_DETAIL, OP_LIST, OP_SEARCH, ResourceKind};
use crate::api::models::TagQuery;

pub fn lists() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Tags, OP_LIST)
}

pub fn list(query: &TagQuery) -> CacheKey {
    CacheKey::new(ResourceKind::Tags, OP_LIST).with_query(query)
}

/// 不分页的标签目录
pub fn catalog() -> CacheKey {
    CacheKey::new(ResourceKind::Tags, OP_CATALOG)
}

pub fn catalog_pattern() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Tags, OP_CATALOG)
}

pub fn searches() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Tags, OP_SEARCH)
}

pub fn search(keyword: &str) -> CacheKey {
    CacheKey::new(ResourceKind::Tags, OP_SEARCH).param("q", keyword)
}

pub fn details() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Tags, OP_DETAIL)
}

pub fn detail(id: &str) -> CacheKey {
    CacheKey::new(ResourceKind::Tags, OP_DETAIL).param("id", id)
}

pub fn detail_pattern(id: &str) -> KeyPattern {
    details().param("id", id)
}
