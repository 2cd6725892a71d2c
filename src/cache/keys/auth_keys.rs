use super::{CacheKey, KeyPattern, OP_PROFILE, ResourceKind};

/// 当前登录用户资料
pub fn profile() -> CacheKey {
    CacheKey::new(ResourceKind::Auth, OP_PROFILE)
}

pub fn profile_pattern() -> KeyPattern {
    KeyPattern::operation(ResourceKind::Auth, OP_PROFILE)
}
