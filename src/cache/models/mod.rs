/// 缓存数据模型
/// 定义缓存条目与界面读取状态
pub mod entry;

// 重新导出常用类型
pub use entry::{CacheEntry, QueryState};
