use std::sync::Arc;

use api::operations::{AuthService, CommentService, PostService, TagService, UploadService, UserService};
use api::{ApiClient, ReqwestTransport, Transport};
use cache::{
    AuthCacheOperations, CommentCacheOperations, PostCacheOperations, QueryCache,
    TagCacheOperations, UserCacheOperations,
};
use config::Config;
use error::ConfigError;
use middleware::{GuardDecision, Navigator, TracingNavigator};
use notify::{Notifier, TracingNotifier};
use session::{
    CredentialStore, FileCredentialStore, RedisCredentialStore, SessionCell, SessionStore,
};

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod session;
pub mod utils;

/// 后台管理端的依赖集合
///
/// 会话、查询缓存、请求客户端各只有一份，所有服务共享。
#[derive(Clone)]
pub struct AdminContext {
    pub config: Config,
    pub cache: QueryCache,
    pub client: ApiClient,
    pub session: SessionStore,
    pub posts: PostCacheOperations,
    pub tags: TagCacheOperations,
    pub comments: CommentCacheOperations,
    pub users: UserCacheOperations,
    pub profile: AuthCacheOperations,
    pub uploads: UploadService,
}

impl AdminContext {
    pub fn from_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let cache = QueryCache::new(config.default_stale());
        let cell = Arc::new(SessionCell::new(credentials, cache.clone(), navigator));
        let client = ApiClient::new(
            transport,
            cell.clone(),
            notifier.clone(),
            config.envelope_format,
            config.request_timeout(),
        );

        let auth = AuthService::new(client.clone());
        let session = SessionStore::new(cell, auth.clone(), cache.clone(), notifier.clone());

        AdminContext {
            posts: PostCacheOperations::new(
                PostService::new(client.clone()),
                cache.clone(),
                notifier.clone(),
            ),
            tags: TagCacheOperations::new(
                TagService::new(client.clone()),
                cache.clone(),
                notifier.clone(),
            ),
            comments: CommentCacheOperations::new(
                CommentService::new(client.clone()),
                cache.clone(),
                notifier.clone(),
            ),
            users: UserCacheOperations::new(
                UserService::new(client.clone()),
                cache.clone(),
                notifier,
            ),
            profile: AuthCacheOperations::new(auth, cache.clone()),
            uploads: UploadService::new(client.clone()),
            config,
            cache,
            client,
            session,
        }
    }

    /// 按配置连接真实后端；配置了 REDIS_URL 时凭据存 Redis，否则存本地文件
    pub fn connect(config: Config) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(&config.api_base_url, config.request_timeout())?;

        let credentials: Arc<dyn CredentialStore> = match &config.redis_url {
            Some(redis_url) => Arc::new(RedisCredentialStore::open(
                redis_url,
                config.redis_namespace.clone(),
            )?),
            None => Arc::new(FileCredentialStore::new(config.credentials_path.clone())),
        };

        Ok(Self::from_parts(
            config,
            Arc::new(transport),
            credentials,
            Arc::new(TracingNotifier),
            Arc::new(TracingNavigator),
        ))
    }

    /// 导航前的守卫判断
    pub fn guard(&self, path: &str) -> GuardDecision {
        middleware::evaluate(path, self.session.cell().has_token())
    }
}
