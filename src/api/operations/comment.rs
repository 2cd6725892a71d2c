// 评论服务

use serde::de::IgnoredAny;
use serde_json::Value;

use super::{ensure_id, ensure_ids, segment};
use crate::api::client::ApiClient;
use crate::api::models::{
    BatchIds, BatchStatus, Comment, CommentList, CommentQuery, CommentStats, CommentStatus,
    CreateCommentInput, ListPayload, ReplyInput, StatusUpdate, UpdateCommentInput,
};
use crate::error::ApiError;

#[derive(Clone)]
pub struct CommentService {
    client: ApiClient,
}

impl CommentService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 评论列表，后端附带统计时一并返回
    pub async fn list(&self, query: &CommentQuery) -> Result<CommentList, ApiError> {
        let body: Value = self.client.get_query("/comments", query).await?;

        let stats = match body.get("stats") {
            Some(stats) if !stats.is_null() => Some(
                serde_json::from_value::<CommentStats>(stats.clone())
                    .map_err(|e| self.client.reject(ApiError::decode(e)))?,
            ),
            _ => None,
        };
        let payload: ListPayload<Comment> = serde_json::from_value(body)
            .map_err(|e| self.client.reject(ApiError::decode(e)))?;

        Ok(CommentList {
            page: payload.into(),
            stats,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Comment, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.get(&format!("/comments/{}", segment(id))).await
    }

    pub async fn create(&self, input: &CreateCommentInput) -> Result<Comment, ApiError> {
        self.client.post("/comments", input).await
    }

    pub async fn update(&self, id: &str, input: &UpdateCommentInput) -> Result<Comment, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.put(&format!("/comments/{}", segment(id)), input).await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: CommentStatus,
    ) -> Result<Comment, ApiError> {
        ensure_id(&self.client, id)?;
        self.client
            .patch(&format!("/comments/{}/status", segment(id)), &StatusUpdate { status })
            .await
    }

    pub async fn approve(&self, id: &str) -> Result<Comment, ApiError> {
        self.update_status(id, CommentStatus::Approved).await
    }

    pub async fn reject(&self, id: &str) -> Result<Comment, ApiError> {
        self.update_status(id, CommentStatus::Rejected).await
    }

    pub async fn mark_spam(&self, id: &str) -> Result<Comment, ApiError> {
        self.update_status(id, CommentStatus::Spam).await
    }

    pub async fn batch_update_status(
        &self,
        ids: &[String],
        status: CommentStatus,
    ) -> Result<(), ApiError> {
        ensure_ids(&self.client, ids)?;
        let _: IgnoredAny = self
            .client
            .patch("/comments/batch/status", &BatchStatus { ids, status })
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        ensure_id(&self.client, id)?;
        let _: IgnoredAny = self.client.delete(&format!("/comments/{}", segment(id))).await?;
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        ensure_ids(&self.client, ids)?;
        let _: IgnoredAny = self
            .client
            .delete_with("/comments/batch", &BatchIds { ids })
            .await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<CommentStats, ApiError> {
        self.client.get("/comments/stats").await
    }

    /// 以当前管理员身份回复
    pub async fn reply(&self, id: &str, content: &str) -> Result<Comment, ApiError> {
        ensure_id(&self.client, id)?;
        if content.trim().is_empty() {
            return Err(self.client.reject(ApiError::validation("回复内容不能为空")));
        }
        self.client
            .post(&format!("/comments/{}/reply", segment(id)), &ReplyInput { content })
            .await
    }
}
