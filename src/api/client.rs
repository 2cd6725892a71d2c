use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::envelope::{self, EnvelopeFormat};
use super::models::query_pairs;
use super::transport::{Body, HttpRequest, HttpResponse, Method, MultipartFile, Transport, TransportError};
use crate::error::{ApiError, ErrorKind};
use crate::notify::{Notice, Notifier};
use crate::session::SessionCell;

/// 单次请求的选项
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// 失败时不发提示
    pub silent: bool,
    /// 不携带令牌，401 也不会结束会话
    pub anonymous: bool,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self {
            anonymous: true,
            ..Self::default()
        }
    }

    pub fn with_query<Q: Serialize>(mut self, query: &Q) -> Self {
        self.query.extend(query_pairs(query));
        self
    }
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    session: Arc<SessionCell>,
    notifier: Arc<dyn Notifier>,
    envelope: EnvelopeFormat,
    timeout: Duration,
}

/// 后端接口客户端
///
/// 统一处理鉴权头、响应信封、错误分类和失败提示。
/// 401 是唯一会结束会话的地方。
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionCell>,
        notifier: Arc<dyn Notifier>,
        envelope: EnvelopeFormat,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                session,
                notifier,
                envelope,
                timeout,
            }),
        }
    }

    pub fn session(&self) -> &Arc<SessionCell> {
        &self.inner.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    /// 发出请求并把解包后的数据解析为 `T`
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let silent = options.silent;
        let value = self.send(method, path, body, options).await?;
        serde_json::from_value(value).map_err(|err| {
            let err = ApiError::decode(err);
            warn!("{} 响应结构不符: {}", path, err);
            if !silent {
                self.inner.notifier.notify(Notice::error(err.message.clone()));
            }
            err
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, Body::Empty, RequestOptions::default())
            .await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize,
    {
        let options = RequestOptions::default().with_query(query);
        self.request(Method::GET, path, Body::Empty, options).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.json_body(body)?;
        self.request(Method::POST, path, body, RequestOptions::default())
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.json_body(body)?;
        self.request(Method::PUT, path, body, RequestOptions::default())
            .await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.json_body(body)?;
        self.request(Method::PATCH, path, body, RequestOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, Body::Empty, RequestOptions::default())
            .await
    }

    /// 带请求体的删除，批量删除使用
    pub async fn delete_with<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.json_body(body)?;
        self.request(Method::DELETE, path, body, RequestOptions::default())
            .await
    }

    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file: MultipartFile,
    ) -> Result<T, ApiError> {
        self.request(
            Method::POST,
            path,
            Body::Multipart(file),
            RequestOptions::default(),
        )
        .await
    }

    /// 本地校验失败，不发请求，但和服务端失败一样给出提示
    pub fn reject(&self, err: ApiError) -> ApiError {
        self.inner.notifier.notify(Notice::error(err.message.clone()));
        err
    }

    pub(crate) fn json_body<B: Serialize + ?Sized>(&self, body: &B) -> Result<Body, ApiError> {
        serde_json::to_value(body)
            .map(Body::Json)
            .map_err(|err| {
                self.reject(ApiError::new(
                    ErrorKind::Unexpected,
                    format!("请求体序列化失败: {}", err),
                ))
            })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Body,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let token = if options.anonymous {
            None
        } else {
            self.inner.session.token()
        };

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("X-Request-Id".to_string(), Uuid::new_v4().to_string()),
        ];
        if matches!(body, Body::Json(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = &token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let request = HttpRequest {
            method: method.clone(),
            path: path.to_string(),
            query: options.query,
            headers,
            body,
            timeout: self.inner.timeout,
        };

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.inner.timeout, self.inner.transport.send(request)).await;

        let result = match outcome {
            Err(_) | Ok(Err(TransportError::Timeout)) => {
                Err(ApiError::network("请求超时，请检查网络连接"))
            }
            Ok(Err(TransportError::Connect(reason))) => {
                warn!("{} {} 网络错误: {}", method, path, reason);
                Err(ApiError::network(ErrorKind::Network.default_message()))
            }
            Ok(Err(TransportError::Request(reason))) => {
                Err(ApiError::new(ErrorKind::Unexpected, reason))
            }
            Ok(Ok(response)) => {
                debug!(
                    "{} {} -> {} ({} ms)",
                    method,
                    path,
                    response.status,
                    started.elapsed().as_millis()
                );
                self.classify(response, token.as_deref()).await
            }
        };

        if let Err(err) = &result {
            debug!("{} {} 失败: {:?}", method, path, err.kind);
            if !options.silent {
                self.inner.notifier.notify(Notice::error(err.message.clone()));
            }
        }
        result
    }

    async fn classify(
        &self,
        response: HttpResponse,
        token_used: Option<&str>,
    ) -> Result<Value, ApiError> {
        if response.is_success() {
            return self.inner.envelope.unwrap_success(response.body);
        }

        let kind = ErrorKind::from_status(response.status);
        let message = envelope::error_message(&response.body)
            .unwrap_or_else(|| kind.default_message().to_string());
        let err = ApiError::new(kind, message)
            .with_status(response.status)
            .with_field_errors(envelope::field_errors(&response.body));

        if kind == ErrorKind::Auth {
            self.inner.session.expire(token_used).await;
        }
        Err(err)
    }
}
