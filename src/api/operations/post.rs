// 文章服务

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use tracing::debug;

use super::{ensure_id, ensure_ids, segment};
use crate::api::client::ApiClient;
use crate::api::models::{
    BatchIds, BatchStatus, CreatePostInput, ListPayload, Page, Post, PostQuery, PostStatus,
    PublishRequest, UpdatePostInput,
};
use crate::error::ApiError;

#[derive(Clone)]
pub struct PostService {
    client: ApiClient,
}

impl PostService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 分页获取文章列表，筛选和排序都由服务端完成
    pub async fn list(&self, query: &PostQuery) -> Result<Page<Post>, ApiError> {
        let payload: ListPayload<Post> = self.client.get_query("/posts", query).await?;
        let page: Page<Post> = payload.into();
        debug!("获取文章列表: page={}, total={}", page.page, page.total);
        Ok(page)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Post, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.get(&format!("/posts/{}", segment(id))).await
    }

    pub async fn create(&self, input: &CreatePostInput) -> Result<Post, ApiError> {
        self.client.post("/posts", input).await
    }

    pub async fn update(&self, id: &str, input: &UpdatePostInput) -> Result<Post, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.put(&format!("/posts/{}", segment(id)), input).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        ensure_id(&self.client, id)?;
        let _: IgnoredAny = self.client.delete(&format!("/posts/{}", segment(id))).await?;
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        ensure_ids(&self.client, ids)?;
        let _: IgnoredAny = self
            .client
            .delete_with("/posts/batch", &BatchIds { ids })
            .await?;
        Ok(())
    }

    /// 发布文章，不指定时间时由服务端取当前时间
    pub async fn publish(
        &self,
        id: &str,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Post, ApiError> {
        ensure_id(&self.client, id)?;
        self.client
            .post(
                &format!("/posts/{}/publish", segment(id)),
                &PublishRequest { published_at },
            )
            .await
    }

    pub async fn unpublish(&self, id: &str) -> Result<Post, ApiError> {
        ensure_id(&self.client, id)?;
        self.client
            .post(&format!("/posts/{}/unpublish", segment(id)), &serde_json::json!({}))
            .await
    }

    pub async fn batch_update_status(
        &self,
        ids: &[String],
        status: PostStatus,
    ) -> Result<(), ApiError> {
        ensure_ids(&self.client, ids)?;
        let _: IgnoredAny = self
            .client
            .patch("/posts/batch/status", &BatchStatus { ids, status })
            .await?;
        Ok(())
    }
}
