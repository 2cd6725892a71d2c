// 标签服务

use serde::de::IgnoredAny;

use super::{ensure_id, ensure_ids, segment};
use crate::api::client::ApiClient;
use crate::api::models::{
    BatchIds, CreateTagInput, ListPayload, Page, Tag, TagQuery, UpdateTagInput,
};
use crate::error::ApiError;

#[derive(Clone)]
pub struct TagService {
    client: ApiClient,
}

impl TagService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &TagQuery) -> Result<Page<Tag>, ApiError> {
        let payload: ListPayload<Tag> = self.client.get_query("/tags", query).await?;
        Ok(payload.into())
    }

    /// 全部标签，不分页，供选择器使用
    pub async fn all(&self) -> Result<Vec<Tag>, ApiError> {
        self.client.get("/tags/all").await
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<Tag>, ApiError> {
        self.client
            .get_query("/tags/search", &serde_json::json!({ "q": keyword }))
            .await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Tag, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.get(&format!("/tags/{}", segment(id))).await
    }

    pub async fn create(&self, input: &CreateTagInput) -> Result<Tag, ApiError> {
        self.client.post("/tags", input).await
    }

    pub async fn update(&self, id: &str, input: &UpdateTagInput) -> Result<Tag, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.put(&format!("/tags/{}", segment(id)), input).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        ensure_id(&self.client, id)?;
        let _: IgnoredAny = self.client.delete(&format!("/tags/{}", segment(id))).await?;
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        ensure_ids(&self.client, ids)?;
        let _: IgnoredAny = self
            .client
            .delete_with("/tags/batch", &BatchIds { ids })
            .await?;
        Ok(())
    }
}
