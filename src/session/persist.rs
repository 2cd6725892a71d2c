use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::models::User;
use crate::error::StorageError;

/// 落盘的登录凭据，只是会话的派生副本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCredentials {
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

/// 凭据持久化
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<PersistedCredentials>, StorageError>;

    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

/// 进程内存储，测试和一次性命令使用
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<PersistedCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credentials: PersistedCredentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }

    pub fn snapshot(&self) -> Option<PersistedCredentials> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace(&self, value: Option<PersistedCredentials>) {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<PersistedCredentials>, StorageError> {
        Ok(self.snapshot())
    }

    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), StorageError> {
        self.replace(Some(credentials.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.replace(None);
        Ok(())
    }
}

/// JSON 文件存储
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<PersistedCredentials>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // 文件损坏按未登录处理
        match serde_json::from_slice(&bytes) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(err) => {
                warn!("凭据文件无法解析，已忽略: {}: {}", self.path.display(), err);
                Ok(None)
            }
        }
    }

    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // 先写临时文件再改名，避免留下半个文件
        let json = serde_json::to_vec_pretty(credentials)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!("凭据已写入 {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn token_key(namespace: &str) -> String {
    format!("admin:credentials:{}:token", namespace)
}

fn refresh_token_key(namespace: &str) -> String {
    format!("admin:credentials:{}:refresh_token", namespace)
}

fn user_key(namespace: &str) -> String {
    format!("admin:credentials:{}:user", namespace)
}

/// Redis 存储，多个进程共用同一份凭据
pub struct RedisCredentialStore {
    redis: Arc<RedisClient>,
    namespace: String,
}

impl RedisCredentialStore {
    pub fn new(redis: Arc<RedisClient>, namespace: impl Into<String>) -> Self {
        Self {
            redis,
            namespace: namespace.into(),
        }
    }

    pub fn open(redis_url: &str, namespace: impl Into<String>) -> Result<Self, StorageError> {
        let client = RedisClient::open(redis_url)?;
        Ok(Self::new(Arc::new(client), namespace))
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn load(&self) -> Result<Option<PersistedCredentials>, StorageError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let token: Option<String> = conn.get(token_key(&self.namespace)).await?;
        let Some(token) = token else {
            return Ok(None);
        };
        let refresh_token: Option<String> = conn.get(refresh_token_key(&self.namespace)).await?;
        let user: Option<String> = conn.get(user_key(&self.namespace)).await?;

        let Some(user) = user else {
            warn!("Redis 中的凭据缺少用户信息，已忽略");
            return Ok(None);
        };
        match serde_json::from_str::<User>(&user) {
            Ok(user) => Ok(Some(PersistedCredentials {
                token,
                refresh_token,
                user,
            })),
            Err(err) => {
                warn!("Redis 中的用户信息无法解析，已忽略: {}", err);
                Ok(None)
            }
        }
    }

    async fn save(&self, credentials: &PersistedCredentials) -> Result<(), StorageError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let user = serde_json::to_string(&credentials.user)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(token_key(&self.namespace), &credentials.token)
            .ignore()
            .set(user_key(&self.namespace), user)
            .ignore();
        let refresh = match &credentials.refresh_token {
            Some(refresh_token) => pipe.set(refresh_token_key(&self.namespace), refresh_token),
            None => pipe.del(refresh_token_key(&self.namespace)),
        };
        refresh.ignore();

        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let keys = vec![
            token_key(&self.namespace),
            refresh_token_key(&self.namespace),
            user_key(&self.namespace),
        ];
        let _: () = conn.del(keys).await?;
        Ok(())
    }
}
