// 各类读取的过期窗口，频繁变化的列表短，近乎静态的目录长

use std::time::Duration;

/// 评论列表 2 分钟
pub const COMMENT_LIST: Duration = Duration::from_secs(2 * 60);
pub const COMMENT_DETAIL: Duration = Duration::from_secs(5 * 60);
pub const COMMENT_STATS: Duration = Duration::from_secs(5 * 60);

pub const POST_LIST: Duration = Duration::from_secs(5 * 60);
pub const POST_DETAIL: Duration = Duration::from_secs(5 * 60);

pub const TAG_LIST: Duration = Duration::from_secs(5 * 60);
pub const TAG_DETAIL: Duration = Duration::from_secs(5 * 60);
/// 标签目录 10 分钟
pub const TAG_CATALOG: Duration = Duration::from_secs(10 * 60);
pub const TAG_SEARCH: Duration = Duration::from_secs(2 * 60);

pub const USER_LIST: Duration = Duration::from_secs(5 * 60);
pub const USER_DETAIL: Duration = Duration::from_secs(5 * 60);
pub const USER_LOGIN_LOGS: Duration = Duration::from_secs(60);

pub const PROFILE: Duration = Duration::from_secs(5 * 60);

/// 标签搜索关键字的最短长度，更短时不发请求
pub const TAG_SEARCH_MIN_CHARS: usize = 2;
