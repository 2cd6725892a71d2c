use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::cell::{EndReason, Session, SessionCell, SessionState};
use crate::api::models::{ChangePasswordRequest, LoginRequest};
use crate::api::operations::AuthService;
use crate::cache::keys::auth_keys;
use crate::cache::{Mutation, QueryCache, policy};
use crate::error::{ApiError, ErrorKind};
use crate::notify::{Notice, Notifier};
use crate::utils::decode_claims;

/// 会话流程：启动恢复、登录、注销、刷新令牌
#[derive(Clone)]
pub struct SessionStore {
    cell: Arc<SessionCell>,
    auth: AuthService,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl SessionStore {
    pub fn new(
        cell: Arc<SessionCell>,
        auth: AuthService,
        cache: QueryCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cell,
            auth,
            cache,
            notifier,
        }
    }

    pub fn cell(&self) -> &Arc<SessionCell> {
        &self.cell
    }

    pub fn current(&self) -> Option<Session> {
        self.cell.current()
    }

    pub fn state(&self) -> SessionState {
        self.cell.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.cell.subscribe()
    }

    /// 启动时读取持久化凭据，有则先进入已登录状态，再向服务端校验
    pub async fn initialize(&self) -> SessionState {
        match self.cell.credential_store().load().await {
            Ok(Some(credentials)) => {
                self.cell.restore(Session::from(credentials));
                // 失败已在 revalidate 中处理
                let _ = self.revalidate().await;
            }
            Ok(None) => {}
            Err(err) => warn!("读取登录凭据失败: {}", err),
        }
        self.cell.state()
    }

    /// 向服务端校验恢复的会话
    ///
    /// 401 由请求层结束会话；其他错误保留当前会话，下次请求再判断。
    pub async fn revalidate(&self) -> Result<(), ApiError> {
        if !self.cell.has_token() {
            return Ok(());
        }
        match self.auth.verify_profile().await {
            Ok(user) => {
                self.cache
                    .set(&auth_keys::profile(), &user, policy::PROFILE)?;
                self.cell.update_user(user).await;
                Ok(())
            }
            Err(err) if err.kind == ErrorKind::Auth => {
                info!("恢复的会话已失效");
                Err(err)
            }
            Err(err) => {
                warn!("校验会话失败，暂时保留: {}", err);
                Err(err)
            }
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        self.cell.begin_authentication();
        match self.auth.login(request).await {
            Ok(response) => {
                let session = Session::from(response);
                // 上一个账号的数据不能留给新账号
                self.cache.clear();
                self.cell.establish(session.clone()).await;
                if let Err(err) = self
                    .cache
                    .set(&auth_keys::profile(), &session.user, policy::PROFILE)
                {
                    warn!("写入用户资料缓存失败: {}", err);
                }
                self.notifier.notify(Notice::success("登录成功"));
                Ok(session)
            }
            Err(err) => {
                self.cell.abort_authentication();
                Err(err)
            }
        }
    }

    /// 注销：尽力通知服务端，然后无条件清空本地状态
    pub async fn logout(&self) {
        let refresh_token = self.cell.current().and_then(|s| s.refresh_token);
        if let Some(refresh_token) = refresh_token {
            if let Err(err) = self.auth.logout(&refresh_token).await {
                warn!("服务端注销失败: {}", err);
            }
        }
        self.cell.terminate(EndReason::Logout).await;
    }

    /// 用刷新令牌换取新令牌，任何失败都会结束会话
    pub async fn refresh(&self) -> Result<Session, ApiError> {
        let Some(refresh_token) = self.cell.current().and_then(|s| s.refresh_token) else {
            self.cell.terminate(EndReason::RefreshFailed).await;
            return Err(ApiError::new(ErrorKind::Auth, "没有可用的刷新令牌"));
        };

        match self.auth.refresh(&refresh_token).await {
            Ok(response) => {
                let session = Session::from(response);
                self.cell.establish(session.clone()).await;
                info!("令牌已刷新: user={}", session.username);
                Ok(session)
            }
            Err(err) => {
                warn!("刷新令牌失败: {}", err);
                self.cell.terminate(EndReason::RefreshFailed).await;
                Err(err)
            }
        }
    }

    /// 当前令牌的过期时间，令牌不是 JWT 时返回 None
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        let token = self.cell.token()?;
        decode_claims(&token).ok()?.expires_at()
    }

    /// 距离过期不足 `margin` 时需要刷新
    pub fn needs_refresh(&self, margin: Duration) -> bool {
        let Some(expires_at) = self.token_expires_at() else {
            return false;
        };
        // 余量超出可表示范围时按需要刷新处理
        let Ok(margin) = chrono::Duration::from_std(margin) else {
            return true;
        };
        expires_at
            .checked_sub_signed(margin)
            .is_none_or(|refresh_at| refresh_at <= Utc::now())
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.auth.change_password(request).await?;
        self.cache.apply(&Mutation::PasswordChanged);
        self.notifier.notify(Notice::success("密码修改成功"));
        Ok(())
    }
}
