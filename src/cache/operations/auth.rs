use crate::api::models::User;
use crate::api::operations::AuthService;
use crate::cache::keys::auth_keys;
use crate::cache::models::QueryState;
use crate::cache::{QueryCache, policy};
use crate::error::ApiError;

/// 当前登录用户资料
#[derive(Clone)]
pub struct AuthCacheOperations {
    service: AuthService,
    cache: QueryCache,
}

impl AuthCacheOperations {
    pub fn new(service: AuthService, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let service = self.service.clone();
        self.cache
            .fetch(&auth_keys::profile(), policy::PROFILE, move || async move {
                service.profile().await
            })
            .await
    }

    pub fn peek_profile(&self) -> QueryState<User> {
        self.cache.peek(&auth_keys::profile())
    }
}
