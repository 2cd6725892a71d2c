// 用户服务

use serde::de::IgnoredAny;

use super::{ensure_id, ensure_ids, segment};
use crate::api::client::ApiClient;
use crate::api::models::{
    BatchIds, BatchStatus, CreateUserInput, ListPayload, LoginLog, Page, ResetPasswordRequest,
    StatusUpdate, UpdateUserInput, User, UserQuery, UserStatus,
};
use crate::error::ApiError;

#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>, ApiError> {
        let payload: ListPayload<User> = self.client.get_query("/users", query).await?;
        Ok(payload.into())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<User, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.get(&format!("/users/{}", segment(id))).await
    }

    pub async fn create(&self, input: &CreateUserInput) -> Result<User, ApiError> {
        self.client.post("/users", input).await
    }

    pub async fn update(&self, id: &str, input: &UpdateUserInput) -> Result<User, ApiError> {
        ensure_id(&self.client, id)?;
        self.client.put(&format!("/users/{}", segment(id)), input).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        ensure_id(&self.client, id)?;
        let _: IgnoredAny = self.client.delete(&format!("/users/{}", segment(id))).await?;
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        ensure_ids(&self.client, ids)?;
        let _: IgnoredAny = self
            .client
            .delete_with("/users/batch", &BatchIds { ids })
            .await?;
        Ok(())
    }

    pub async fn update_status(&self, id: &str, status: UserStatus) -> Result<User, ApiError> {
        ensure_id(&self.client, id)?;
        self.client
            .patch(&format!("/users/{}/status", segment(id)), &StatusUpdate { status })
            .await
    }

    pub async fn batch_update_status(
        &self,
        ids: &[String],
        status: UserStatus,
    ) -> Result<(), ApiError> {
        ensure_ids(&self.client, ids)?;
        let _: IgnoredAny = self
            .client
            .patch("/users/batch/status", &BatchStatus { ids, status })
            .await?;
        Ok(())
    }

    /// 管理员重置他人密码
    pub async fn reset_password(&self, id: &str, new_password: &str) -> Result<(), ApiError> {
        ensure_id(&self.client, id)?;
        if new_password.is_empty() {
            return Err(self.client.reject(ApiError::validation("新密码不能为空")));
        }
        let _: IgnoredAny = self
            .client
            .post(
                &format!("/users/{}/reset-password", segment(id)),
                &ResetPasswordRequest { new_password },
            )
            .await?;
        Ok(())
    }

    /// 解除登录失败导致的锁定
    pub async fn unlock(&self, id: &str) -> Result<User, ApiError> {
        ensure_id(&self.client, id)?;
        self.client
            .post(&format!("/users/{}/unlock", segment(id)), &serde_json::json!({}))
            .await
    }

    pub async fn login_logs(
        &self,
        id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<LoginLog>, ApiError> {
        ensure_id(&self.client, id)?;
        let payload: ListPayload<LoginLog> = self
            .client
            .get_query(
                &format!("/users/{}/login-logs", segment(id)),
                &serde_json::json!({ "page": page, "limit": limit }),
            )
            .await?;
        Ok(payload.into())
    }
}
