use std::sync::Arc;

use super::seed;
use crate::api::models::{
    CreateUserInput, LoginLog, Page, UpdateUserInput, User, UserQuery, UserStatus,
};
use crate::api::operations::UserService;
use crate::cache::keys::user_keys;
use crate::cache::models::QueryState;
use crate::cache::{Mutation, QueryCache, policy};
use crate::error::ApiError;
use crate::notify::{Notice, Notifier};

/// 用户缓存操作
#[derive(Clone)]
pub struct UserCacheOperations {
    service: UserService,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl UserCacheOperations {
    pub fn new(service: UserService, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            cache,
            notifier,
        }
    }

    pub fn service(&self) -> &UserService {
        &self.service
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>, ApiError> {
        let service = self.service.clone();
        let query_owned = query.clone();
        self.cache
            .fetch(&user_keys::list(query), policy::USER_LIST, move || async move {
                service.list(&query_owned).await
            })
            .await
    }

    pub fn peek_list(&self, query: &UserQuery) -> QueryState<Page<User>> {
        self.cache.peek(&user_keys::list(query))
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        let service = self.service.clone();
        let id_owned = id.to_string();
        self.cache
            .fetch(&user_keys::detail(id), policy::USER_DETAIL, move || async move {
                service.get_by_id(&id_owned).await
            })
            .await
    }

    pub async fn login_logs(
        &self,
        id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<LoginLog>, ApiError> {
        let service = self.service.clone();
        let id_owned = id.to_string();
        self.cache
            .fetch(
                &user_keys::login_logs(id, page, limit),
                policy::USER_LOGIN_LOGS,
                move || async move { service.login_logs(&id_owned, page, limit).await },
            )
            .await
    }

    pub async fn create(&self, input: &CreateUserInput) -> Result<User, ApiError> {
        let user = self.service.create(input).await?;
        self.cache.apply(&Mutation::UserCreated);
        seed(&self.cache, &user_keys::detail(&user.id), &user, policy::USER_DETAIL);
        self.notifier.notify(Notice::success("用户创建成功"));
        Ok(user)
    }

    pub async fn update(&self, id: &str, input: &UpdateUserInput) -> Result<User, ApiError> {
        let user = self.service.update(id, input).await?;
        self.cache.apply(&Mutation::UserUpdated { id: id.to_string() });
        seed(&self.cache, &user_keys::detail(&user.id), &user, policy::USER_DETAIL);
        self.notifier.notify(Notice::success("用户更新成功"));
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.service.delete(id).await?;
        self.cache.apply(&Mutation::UserDeleted { id: id.to_string() });
        self.notifier.notify(Notice::success("用户删除成功"));
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        self.service.batch_delete(ids).await?;
        self.cache
            .apply(&Mutation::UsersBatchDeleted { ids: ids.to_vec() });
        self.notifier
            .notify(Notice::success(format!("{} 个用户删除成功", ids.len())));
        Ok(())
    }

    pub async fn update_status(&self, id: &str, status: UserStatus) -> Result<User, ApiError> {
        let user = self.service.update_status(id, status).await?;
        self.cache
            .apply(&Mutation::UserStatusChanged { id: id.to_string() });
        seed(&self.cache, &user_keys::detail(&user.id), &user, policy::USER_DETAIL);
        self.notifier.notify(Notice::success("用户状态已更新"));
        Ok(user)
    }

    pub async fn batch_update_status(
        &self,
        ids: &[String],
        status: UserStatus,
    ) -> Result<(), ApiError> {
        self.service.batch_update_status(ids, status).await?;
        self.cache
            .apply(&Mutation::UsersStatusChanged { ids: ids.to_vec() });
        self.notifier
            .notify(Notice::success(format!("{} 个用户状态已更新", ids.len())));
        Ok(())
    }

    pub async fn reset_password(&self, id: &str, new_password: &str) -> Result<(), ApiError> {
        self.service.reset_password(id, new_password).await?;
        self.cache
            .apply(&Mutation::UserPasswordReset { id: id.to_string() });
        self.notifier.notify(Notice::success("密码已重置"));
        Ok(())
    }

    pub async fn unlock(&self, id: &str) -> Result<User, ApiError> {
        let user = self.service.unlock(id).await?;
        self.cache.apply(&Mutation::UserUnlocked { id: id.to_string() });
        seed(&self.cache, &user_keys::detail(&user.id), &user, policy::USER_DETAIL);
        self.notifier.notify(Notice::success("账号已解锁"));
        Ok(user)
    }
}
