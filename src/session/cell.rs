use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{info, warn};

use super::persist::{CredentialStore, PersistedCredentials};
use crate::api::models::{LoginResponse, User, UserRole};
use crate::cache::QueryCache;
use crate::middleware::{LOGIN_PATH, Navigator};

/// 当前登录会话
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

impl Session {
    pub fn new(token: String, refresh_token: Option<String>, user: User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            token,
            refresh_token,
            user,
        }
    }

    pub fn persisted(&self) -> PersistedCredentials {
        PersistedCredentials {
            token: self.token.clone(),
            refresh_token: self.refresh_token.clone(),
            user: self.user.clone(),
        }
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session::new(response.token, Some(response.refresh_token), response.user)
    }
}

impl From<PersistedCredentials> for Session {
    fn from(credentials: PersistedCredentials) -> Self {
        Session::new(
            credentials.token,
            credentials.refresh_token,
            credentials.user,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// 会话结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Logout,
    /// 服务端返回 401
    Expired,
    RefreshFailed,
}

/// 唯一持有会话的地方
///
/// 请求层从这里取令牌，401 时也只通过这里结束会话。
/// 结束会话会一并清空持久化凭据和查询缓存。
pub struct SessionCell {
    current: Mutex<Option<Session>>,
    state: watch::Sender<SessionState>,
    store: Arc<dyn CredentialStore>,
    cache: QueryCache,
    navigator: Arc<dyn Navigator>,
}

impl SessionCell {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        cache: QueryCache,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            current: Mutex::new(None),
            state,
            store,
            cache,
            navigator,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.slot().as_ref().map(|session| session.token.clone())
    }

    pub fn has_token(&self) -> bool {
        self.slot().is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.slot().clone()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn begin_authentication(&self) {
        self.state.send_replace(SessionState::Authenticating);
    }

    /// 登录失败，回到进入登录前的状态
    pub fn abort_authentication(&self) {
        let state = if self.has_token() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };
        self.state.send_replace(state);
    }

    /// 登录或刷新成功，写入内存并持久化
    pub async fn establish(&self, session: Session) {
        let persisted = session.persisted();
        info!("会话已建立: user={}", session.username);
        *self.slot() = Some(session);
        self.state.send_replace(SessionState::Authenticated);

        // 持久化失败不影响本次会话
        if let Err(err) = self.store.save(&persisted).await {
            warn!("保存登录凭据失败: {}", err);
        }
    }

    /// 启动时从持久化凭据恢复，不重复写回
    pub fn restore(&self, session: Session) {
        info!("已恢复会话: user={}", session.username);
        *self.slot() = Some(session);
        self.state.send_replace(SessionState::Authenticated);
    }

    /// 用服务端返回的最新资料更新会话
    pub async fn update_user(&self, user: User) {
        let persisted = {
            let mut slot = self.slot();
            let Some(current) = slot.as_mut() else {
                return;
            };
            *current = Session::new(current.token.clone(), current.refresh_token.clone(), user);
            current.persisted()
        };

        if let Err(err) = self.store.save(&persisted).await {
            warn!("更新登录凭据失败: {}", err);
        }
    }

    /// 请求层收到 401
    ///
    /// 只有携带当前令牌的请求才能结束会话，已被替换的旧令牌和匿名请求的 401 忽略。
    pub async fn expire(&self, token_used: Option<&str>) {
        let Some(token_used) = token_used else {
            return;
        };
        if self.token().as_deref() != Some(token_used) {
            return;
        }
        self.terminate(EndReason::Expired).await;
    }

    /// 结束会话：清空内存、持久化凭据和查询缓存
    pub async fn terminate(&self, reason: EndReason) {
        let previous = self.slot().take();
        self.cache.clear();
        if let Err(err) = self.store.clear().await {
            warn!("清除登录凭据失败: {}", err);
        }

        let was_active = previous.is_some() || self.state() != SessionState::Unauthenticated;
        self.state.send_replace(SessionState::Unauthenticated);

        if let Some(session) = previous {
            info!("会话已结束: user={}, reason={:?}", session.username, reason);
        }
        if was_active {
            self.navigator.redirect(LOGIN_PATH);
        }
    }
}
