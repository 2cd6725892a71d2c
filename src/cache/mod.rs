// 查询缓存模块
// 按 (资源类型, 操作, 参数) 缓存读取结果，变更操作按对照表失效相关键

// 缓存键
pub mod keys;

// 缓存数据模型
pub mod models;

// 变更影响对照表
pub mod invalidation;

// 各类读取的过期窗口
pub mod policy;

// 缓存引擎
pub mod query;

// 各资源的缓存操作
pub mod operations;

// 重新导出常用类型
pub use invalidation::{Effect, Mutation};
pub use keys::{CacheKey, KeyPattern, ResourceKind};
pub use models::{CacheEntry, QueryState};
pub use operations::{
    AuthCacheOperations, CommentCacheOperations, PostCacheOperations, TagCacheOperations,
    UserCacheOperations,
};
pub use query::QueryCache;
