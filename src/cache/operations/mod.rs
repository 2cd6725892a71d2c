/// 缓存操作
/// 读取走查询缓存，变更成功后按对照表刷新相关键，并给出操作提示

// 文章缓存操作
pub mod post;

// 标签缓存操作
pub mod tag;

// 评论缓存操作
pub mod comment;

// 用户缓存操作
pub mod user;

// 当前用户资料
pub mod auth;

// 重新导出常用操作
pub use auth::AuthCacheOperations;
pub use comment::CommentCacheOperations;
pub use post::PostCacheOperations;
pub use tag::TagCacheOperations;
pub use user::UserCacheOperations;

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use super::keys::CacheKey;
use super::query::QueryCache;

/// 用服务端返回的实体回填详情键，失败只记日志
fn seed<T: Serialize>(cache: &QueryCache, key: &CacheKey, value: &T, stale_after: Duration) {
    if let Err(err) = cache.set(key, value, stale_after) {
        warn!("回填缓存失败: key={}, error={}", key, err);
    }
}
