// 通用的数据结构定义

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// 统一后的分页结果，调用方只会看到这一种形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 后端返回的分页信息，兼容 `page/limit/hasNext/hasPrev`
/// 与旧版 `current/pageSize/totalPages` 两种字段
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPagination {
    #[serde(alias = "current")]
    pub page: Option<u32>,
    #[serde(alias = "pageSize")]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: u64,
    pub total_pages: Option<u64>,
    pub has_next: Option<bool>,
    pub has_prev: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPage<T> {
    #[serde(alias = "items")]
    pub list: Vec<T>,
    #[serde(default)]
    pub pagination: RawPagination,
}

/// 列表接口响应：分页对象，或不分页的裸数组
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Paged(RawPage<T>),
    Bare(Vec<T>),
}

impl<T> From<RawPage<T>> for Page<T> {
    fn from(raw: RawPage<T>) -> Self {
        let RawPage { list, pagination } = raw;
        let page = pagination.page.unwrap_or(1).max(1);
        let limit = pagination
            .limit
            .unwrap_or_else(|| u32::try_from(list.len()).unwrap_or(u32::MAX));
        let total = pagination.total;
        let total_pages = pagination.total_pages.unwrap_or_else(|| {
            if limit == 0 {
                0
            } else {
                total.div_ceil(u64::from(limit))
            }
        });

        Page {
            has_next: pagination
                .has_next
                .unwrap_or(u64::from(page) < total_pages),
            has_prev: pagination.has_prev.unwrap_or(page > 1),
            items: list,
            page,
            limit,
            total,
        }
    }
}

impl<T> From<ListPayload<T>> for Page<T> {
    fn from(payload: ListPayload<T>) -> Self {
        match payload {
            ListPayload::Paged(raw) => raw.into(),
            ListPayload::Bare(items) => {
                let count = items.len();
                Page {
                    items,
                    page: 1,
                    limit: u32::try_from(count).unwrap_or(u32::MAX),
                    total: count as u64,
                    has_next: false,
                    has_prev: false,
                }
            }
        }
    }
}

/// 批量操作请求体
#[derive(Debug, Clone, Serialize)]
pub struct BatchIds<'a> {
    pub ids: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchStatus<'a, S> {
    pub ids: &'a [String],
    pub status: S,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}

/// 把查询结构体展开成查询串参数，跳过空值，键按字典序排列
pub fn query_pairs<Q: Serialize>(query: &Q) -> Vec<(String, String)> {
    let Ok(Value::Object(map)) = serde_json::to_value(query) else {
        return Vec::new();
    };

    let mut pairs: Vec<(String, String)> = map
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) if s.is_empty() => return None,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            Some((key, value))
        })
        .collect();
    pairs.sort();
    pairs
}
