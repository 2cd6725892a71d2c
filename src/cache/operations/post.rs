use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::seed;
use crate::api::models::{CreatePostInput, Page, Post, PostQuery, PostStatus, UpdatePostInput};
use crate::api::operations::PostService;
use crate::cache::keys::post_keys;
use crate::cache::models::QueryState;
use crate::cache::{Mutation, QueryCache, policy};
use crate::error::ApiError;
use crate::notify::{Notice, Notifier};

/// 文章缓存操作
#[derive(Clone)]
pub struct PostCacheOperations {
    service: PostService,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl PostCacheOperations {
    pub fn new(service: PostService, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            cache,
            notifier,
        }
    }

    pub fn service(&self) -> &PostService {
        &self.service
    }

    pub async fn list(&self, query: &PostQuery) -> Result<Page<Post>, ApiError> {
        let service = self.service.clone();
        let query_owned = query.clone();
        self.cache
            .fetch(&post_keys::list(query), policy::POST_LIST, move || async move {
                service.list(&query_owned).await
            })
            .await
    }

    pub fn peek_list(&self, query: &PostQuery) -> QueryState<Page<Post>> {
        self.cache.peek(&post_keys::list(query))
    }

    pub async fn get(&self, id: &str) -> Result<Post, ApiError> {
        let service = self.service.clone();
        let id_owned = id.to_string();
        self.cache
            .fetch(&post_keys::detail(id), policy::POST_DETAIL, move || async move {
                service.get_by_id(&id_owned).await
            })
            .await
    }

    pub fn peek(&self, id: &str) -> QueryState<Post> {
        self.cache.peek(&post_keys::detail(id))
    }

    pub async fn create(&self, input: &CreatePostInput) -> Result<Post, ApiError> {
        let post = self.service.create(input).await?;
        self.cache.apply(&Mutation::PostCreated);
        seed(&self.cache, &post_keys::detail(&post.id), &post, policy::POST_DETAIL);
        self.notifier.notify(Notice::success("文章创建成功"));
        Ok(post)
    }

    pub async fn update(&self, id: &str, input: &UpdatePostInput) -> Result<Post, ApiError> {
        let post = self.service.update(id, input).await?;
        self.cache.apply(&Mutation::PostUpdated { id: id.to_string() });
        seed(&self.cache, &post_keys::detail(&post.id), &post, policy::POST_DETAIL);
        self.notifier.notify(Notice::success("文章更新成功"));
        Ok(post)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.service.delete(id).await?;
        self.cache.apply(&Mutation::PostDeleted { id: id.to_string() });
        self.notifier.notify(Notice::success("文章删除成功"));
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        self.service.batch_delete(ids).await?;
        self.cache.apply(&Mutation::PostsBatchDeleted { ids: ids.to_vec() });
        self.notifier
            .notify(Notice::success(format!("{} 篇文章删除成功", ids.len())));
        Ok(())
    }

    pub async fn publish(
        &self,
        id: &str,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Post, ApiError> {
        let post = self.service.publish(id, published_at).await?;
        self.cache.apply(&Mutation::PostPublished { id: id.to_string() });
        seed(&self.cache, &post_keys::detail(&post.id), &post, policy::POST_DETAIL);
        self.notifier.notify(Notice::success("文章发布成功"));
        Ok(post)
    }

    pub async fn unpublish(&self, id: &str) -> Result<Post, ApiError> {
        let post = self.service.unpublish(id).await?;
        self.cache
            .apply(&Mutation::PostUnpublished { id: id.to_string() });
        seed(&self.cache, &post_keys::detail(&post.id), &post, policy::POST_DETAIL);
        self.notifier.notify(Notice::success("文章已取消发布"));
        Ok(post)
    }

    pub async fn batch_update_status(
        &self,
        ids: &[String],
        status: PostStatus,
    ) -> Result<(), ApiError> {
        self.service.batch_update_status(ids, status).await?;
        self.cache
            .apply(&Mutation::PostsStatusChanged { ids: ids.to_vec() });
        self.notifier
            .notify(Notice::success(format!("{} 篇文章状态已更新", ids.len())));
        Ok(())
    }
}
