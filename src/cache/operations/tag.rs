use std::sync::Arc;

use super::seed;
use crate::api::models::{CreateTagInput, Page, Tag, TagQuery, UpdateTagInput};
use crate::api::operations::TagService;
use crate::cache::keys::tag_keys;
use crate::cache::models::QueryState;
use crate::cache::{Mutation, QueryCache, policy};
use crate::error::ApiError;
use crate::notify::{Notice, Notifier};

/// 标签缓存操作
#[derive(Clone)]
pub struct TagCacheOperations {
    service: TagService,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl TagCacheOperations {
    pub fn new(service: TagService, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            cache,
            notifier,
        }
    }

    pub fn service(&self) -> &TagService {
        &self.service
    }

    pub async fn list(&self, query: &TagQuery) -> Result<Page<Tag>, ApiError> {
        let service = self.service.clone();
        let query_owned = query.clone();
        self.cache
            .fetch(&tag_keys::list(query), policy::TAG_LIST, move || async move {
                service.list(&query_owned).await
            })
            .await
    }

    pub fn peek_list(&self, query: &TagQuery) -> QueryState<Page<Tag>> {
        self.cache.peek(&tag_keys::list(query))
    }

    /// 全部标签
    pub async fn catalog(&self) -> Result<Vec<Tag>, ApiError> {
        let service = self.service.clone();
        self.cache
            .fetch(&tag_keys::catalog(), policy::TAG_CATALOG, move || async move {
                service.all().await
            })
            .await
    }

    /// 关键字不足两个字符时不发请求
    pub async fn search(&self, keyword: &str) -> Result<Vec<Tag>, ApiError> {
        let keyword = keyword.trim();
        if keyword.chars().count() < policy::TAG_SEARCH_MIN_CHARS {
            return Ok(Vec::new());
        }
        let service = self.service.clone();
        let keyword_owned = keyword.to_string();
        self.cache
            .fetch(&tag_keys::search(keyword), policy::TAG_SEARCH, move || async move {
                service.search(&keyword_owned).await
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Tag, ApiError> {
        let service = self.service.clone();
        let id_owned = id.to_string();
        self.cache
            .fetch(&tag_keys::detail(id), policy::TAG_DETAIL, move || async move {
                service.get_by_id(&id_owned).await
            })
            .await
    }

    pub async fn create(&self, input: &CreateTagInput) -> Result<Tag, ApiError> {
        let tag = self.service.create(input).await?;
        self.cache.apply(&Mutation::TagCreated);
        seed(&self.cache, &tag_keys::detail(&tag.id), &tag, policy::TAG_DETAIL);
        self.notifier.notify(Notice::success("标签创建成功"));
        Ok(tag)
    }

    pub async fn update(&self, id: &str, input: &UpdateTagInput) -> Result<Tag, ApiError> {
        let tag = self.service.update(id, input).await?;
        self.cache.apply(&Mutation::TagUpdated { id: id.to_string() });
        seed(&self.cache, &tag_keys::detail(&tag.id), &tag, policy::TAG_DETAIL);
        self.notifier.notify(Notice::success("标签更新成功"));
        Ok(tag)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.service.delete(id).await?;
        self.cache.apply(&Mutation::TagDeleted { id: id.to_string() });
        self.notifier.notify(Notice::success("标签删除成功"));
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        self.service.batch_delete(ids).await?;
        self.cache
            .apply(&Mutation::TagsBatchDeleted { ids: ids.to_vec() });
        self.notifier
            .notify(Notice::success(format!("{} 个标签删除成功", ids.len())));
        Ok(())
    }
}
