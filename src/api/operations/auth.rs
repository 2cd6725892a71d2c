// 认证服务
// 只负责接口调用，令牌的保存与清除由会话模块完成

use serde::de::IgnoredAny;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest, User,
};
use crate::api::transport::{Body, Method};
use crate::error::ApiError;

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 登录请求不携带旧令牌，密码错误的 401 不会波及当前会话
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(self
                .client
                .reject(ApiError::validation("请输入用户名和密码")));
        }
        let body = self.client.json_body(request)?;
        self.client
            .request(Method::POST, "/auth/login", body, RequestOptions::anonymous())
            .await
    }

    /// 通知服务端注销，失败不提示
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let body = self.client.json_body(&RefreshTokenRequest { refresh_token })?;
        let _: IgnoredAny = self
            .client
            .request(Method::POST, "/auth/logout", body, RequestOptions::silent())
            .await?;
        Ok(())
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResponse, ApiError> {
        let body = self.client.json_body(&RefreshTokenRequest { refresh_token })?;
        self.client
            .request(
                Method::POST,
                "/auth/refresh",
                body,
                RequestOptions::anonymous(),
            )
            .await
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        self.client.get("/auth/profile").await
    }

    /// 启动时校验恢复的会话，失败不提示；401 仍会结束会话
    pub async fn verify_profile(&self) -> Result<User, ApiError> {
        self.client
            .request(
                Method::GET,
                "/auth/profile",
                Body::Empty,
                RequestOptions::silent(),
            )
            .await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        if request.new_password.is_empty() {
            return Err(self.client.reject(ApiError::validation("新密码不能为空")));
        }
        if request.new_password == request.current_password {
            return Err(self
                .client
                .reject(ApiError::validation("新密码不能与当前密码相同")));
        }
        let _: IgnoredAny = self
            .client
            .post("/auth/change-password", request)
            .await?;
        Ok(())
    }
}
