/// 缓存键模块
/// 键由 (资源类型, 操作名, 有序参数) 组成，按资源类型划分键族
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::api::models::query_pairs;

// 文章缓存键
pub mod post_keys;

// 标签缓存键
pub mod tag_keys;

// 评论缓存键
pub mod comment_keys;

// 用户缓存键
pub mod user_keys;

// 当前登录用户缓存键
pub mod auth_keys;

/// 分页列表
pub const OP_LIST: &str = "list";
/// 单条详情
pub const OP_DETAIL: &str = "detail";
/// 统计
pub const OP_STATS: &str = "stats";
/// 不分页的全量目录
pub const OP_CATALOG: &str = "all";
/// 搜索
pub const OP_SEARCH: &str = "search";
/// 当前用户资料
pub const OP_PROFILE: &str = "profile";
/// 登录日志
pub const OP_LOGIN_LOGS: &str = "login-logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Posts,
    Tags,
    Comments,
    Users,
    Auth,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Posts => "posts",
            ResourceKind::Tags => "tags",
            ResourceKind::Comments => "comments",
            ResourceKind::Users => "users",
            ResourceKind::Auth => "auth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ResourceKind,
    pub operation: &'static str,
    pub params: BTreeMap<String, String>,
}

impl CacheKey {
    pub fn new(kind: ResourceKind, operation: &'static str) -> Self {
        Self {
            kind,
            operation,
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// 用查询结构体的非空字段作为参数
    pub fn with_query<Q: Serialize>(mut self, query: &Q) -> Self {
        self.params.extend(query_pairs(query));
        self
    }

    /// 稳定哈希，参数顺序不影响结果
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hash_field(&mut hasher, self.kind.as_str());
        hash_field(&mut hasher, self.operation);
        for (name, value) in &self.params {
            hash_field(&mut hasher, name);
            hash_field(&mut hasher, value);
        }
        format!("{:x}", hasher.finalize())
    }
}

// 每段带长度前缀，编码无歧义
fn hash_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field.as_bytes());
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.operation)?;
        for (name, value) in &self.params {
            write!(f, ":{}={}", name, value)?;
        }
        Ok(())
    }
}

/// 键族匹配模式，未指定的部分视为通配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    pub kind: ResourceKind,
    pub operation: Option<&'static str>,
    pub params: BTreeMap<String, String>,
}

impl KeyPattern {
    /// 整个资源类型
    pub fn family(kind: ResourceKind) -> Self {
        Self {
            kind,
            operation: None,
            params: BTreeMap::new(),
        }
    }

    /// 资源类型下某个操作的全部键
    pub fn operation(kind: ResourceKind, operation: &'static str) -> Self {
        Self {
            kind,
            operation: Some(operation),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn matches(&self, key: &CacheKey) -> bool {
        self.kind == key.kind
            && self.operation.is_none_or(|op| op == key.operation)
            && self
                .params
                .iter()
                .all(|(name, value)| key.params.get(name) == Some(value))
    }
}
