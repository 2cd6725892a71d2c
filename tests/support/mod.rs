#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use blog_admin::AdminContext;
use blog_admin::api::models::LoginRequest;
use blog_admin::api::{Body, HttpRequest, HttpResponse, Transport};
use blog_admin::api::transport::TransportError;
use blog_admin::config::Config;
use blog_admin::middleware::Navigator;
use blog_admin::notify::{Notice, NoticeLevel, Notifier};
use blog_admin::session::{CredentialStore, MemoryCredentialStore};
use serde_json::{Map, Value, json};
use tokio::sync::Semaphore;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin123!";
pub const TIMESTAMP: &str = "2024-01-01T00:00:00Z";

#[derive(Default)]
struct BackendState {
    posts: Vec<Value>,
    tags: Vec<Value>,
    comments: Vec<Value>,
    users: Vec<Value>,
    tokens: HashSet<String>,
    refresh_tokens: HashSet<String>,
    next_id: u64,
    scripted: HashMap<(String, String), VecDeque<(u16, Value)>>,
    requests: Vec<HttpRequest>,
}

/// 内存中的假后端，按管理接口的约定响应
pub struct FakeBackend {
    state: Mutex<BackendState>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    delay: Mutex<Option<Duration>>,
    offline: Mutex<bool>,
    /// 旧版分页字段 current/pageSize
    legacy_pagination: Mutex<bool>,
    /// 错误信息放在 msg 字段
    error_field_msg: Mutex<bool>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self {
            state: Mutex::new(BackendState::default()),
            gate: Mutex::new(None),
            delay: Mutex::new(None),
            offline: Mutex::new(false),
            legacy_pagination: Mutex::new(false),
            error_field_msg: Mutex::new(false),
        };
        backend.state.lock().unwrap().users.push(json!({
            "id": "user-1",
            "username": ADMIN_USERNAME,
            "email": "admin@example.com",
            "displayName": "Admin",
            "role": "owner",
            "status": "active",
            "createdAt": TIMESTAMP,
            "updatedAt": TIMESTAMP,
        }));
        Arc::new(backend)
    }

    fn next_id(state: &mut BackendState, prefix: &str) -> String {
        state.next_id += 1;
        format!("{}-{}", prefix, state.next_id)
    }

    pub fn seed_tag(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state, "tag");
        state.tags.push(json!({
            "id": id,
            "name": name,
            "slug": name.to_lowercase(),
            "visibility": "public",
            "createdAt": TIMESTAMP,
            "updatedAt": TIMESTAMP,
        }));
        id
    }

    pub fn seed_post(&self, title: &str, tag_ids: &[&str]) -> String {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state, "post");
        let tags: Vec<Value> = state
            .tags
            .iter()
            .filter(|t| tag_ids.contains(&t["id"].as_str().unwrap_or_default()))
            .cloned()
            .collect();
        state.posts.push(json!({
            "id": id,
            "title": title,
            "slug": title.to_lowercase().replace(' ', "-"),
            "content": format!("# {}", title),
            "status": "draft",
            "visibility": "public",
            "createdAt": TIMESTAMP,
            "updatedAt": TIMESTAMP,
            "authorId": "user-1",
            "tags": tags,
        }));
        id
    }

    pub fn seed_comment(&self, post_id: &str, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state, "comment");
        state.comments.push(json!({
            "id": id,
            "postId": post_id,
            "content": content,
            "authorName": "Reader",
            "authorEmail": "reader@example.com",
            "status": "pending",
            "type": "comment",
            "createdAt": TIMESTAMP,
            "updatedAt": TIMESTAMP,
        }));
        id
    }

    /// 下一次匹配的请求直接返回给定的状态码和响应体
    pub fn respond_next(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body));
    }

    /// 让服务端忘记所有已签发的令牌
    pub fn revoke_tokens(&self) {
        let mut state = self.state.lock().unwrap();
        state.tokens.clear();
        state.refresh_tokens.clear();
    }

    pub fn issue_token(&self) -> String {
        let mut state = self.state.lock().unwrap();
        let token = Self::next_id(&mut state, "token");
        state.tokens.insert(token.clone());
        token
    }

    /// 之后的请求在放行前阻塞
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn open(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn use_legacy_pagination(&self) {
        *self.legacy_pagination.lock().unwrap() = true;
    }

    pub fn use_msg_field(&self) {
        *self.error_field_msg.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn calls(&self, method: &str, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method.as_str() == method && r.path == path)
            .count()
    }

    pub fn last_request(&self, method: &str, path: &str) -> Option<HttpRequest> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .rev()
            .find(|r| r.method.as_str() == method && r.path == path)
            .cloned()
    }

    pub fn post(&self, id: &str) -> Option<Value> {
        find(&self.state.lock().unwrap().posts, id).cloned()
    }

    pub fn tag_count(&self) -> usize {
        self.state.lock().unwrap().tags.len()
    }

    fn ok(data: Value) -> HttpResponse {
        HttpResponse::new(
            200,
            json!({ "code": 200, "message": "success", "data": data, "timestamp": 1_700_000_000 }),
        )
    }

    fn error(&self, status: u16, message: &str) -> HttpResponse {
        let field = if *self.error_field_msg.lock().unwrap() {
            "msg"
        } else {
            "message"
        };
        let mut body = Map::new();
        body.insert("code".into(), json!(status));
        body.insert(field.into(), json!(message));
        HttpResponse::new(status, Value::Object(body))
    }

    fn paginate(&self, items: Vec<Value>, request: &HttpRequest) -> Value {
        let page: usize = request
            .query_param("page")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        let limit: usize = request
            .query_param("limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let total = items.len();
        let total_pages = total.div_ceil(limit.max(1));
        let list: Vec<Value> = items
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        let pagination = if *self.legacy_pagination.lock().unwrap() {
            json!({ "current": page, "pageSize": limit, "total": total, "totalPages": total_pages })
        } else {
            json!({
                "page": page,
                "limit": limit,
                "total": total,
                "totalPages": total_pages,
                "hasNext": page < total_pages,
                "hasPrev": page > 1,
            })
        };
        json!({ "list": list, "pagination": pagination })
    }

    fn route(&self, request: &HttpRequest) -> HttpResponse {
        let method = request.method.as_str().to_string();
        let path = request.path.clone();

        let scripted = self
            .state
            .lock()
            .unwrap()
            .scripted
            .get_mut(&(method.clone(), path.clone()))
            .and_then(VecDeque::pop_front);
        if let Some((status, body)) = scripted {
            return HttpResponse::new(status, body);
        }

        let decoded: Vec<String> = path
            .trim_matches('/')
            .split('/')
            .map(|segment| urlencoding::decode(segment).unwrap().into_owned())
            .collect();
        let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();
        match (method.as_str(), segments.as_slice()) {
            ("POST", ["auth", "login"]) => return self.login(request),
            ("POST", ["auth", "refresh"]) => return self.refresh(request),
            _ => {}
        }

        if !self.authorized(request) {
            return self.error(401, "未授权");
        }

        let mut state = self.state.lock().unwrap();
        match (method.as_str(), segments.as_slice()) {
            ("POST", ["auth", "logout"]) => {
                if let Some(refresh) = body_str(request, "refreshToken") {
                    state.refresh_tokens.remove(&refresh);
                }
                Self::ok(Value::Null)
            }
            ("GET", ["auth", "profile"]) => Self::ok(state.users[0].clone()),
            ("POST", ["auth", "change-password"]) => Self::ok(Value::Null),

            ("POST", ["uploads", "images"]) => match &request.body {
                Body::Multipart(file) => Self::ok(json!({
                    "url": format!("https://cdn.example.com/{}", file.file_name),
                    "filename": file.file_name,
                    "size": file.bytes.len(),
                })),
                _ => {
                    drop(state);
                    self.error(400, "缺少文件")
                }
            },

            ("GET", ["tags", "all"]) => {
                let tags: Vec<Value> = state.tags.iter().map(|t| tag_view(&state, t)).collect();
                Self::ok(Value::Array(tags))
            }
            ("GET", ["tags", "search"]) => {
                let q = request.query_param("q").unwrap_or_default().to_lowercase();
                let tags: Vec<Value> = state
                    .tags
                    .iter()
                    .filter(|t| t["name"].as_str().unwrap_or_default().to_lowercase().contains(&q))
                    .map(|t| tag_view(&state, t))
                    .collect();
                Self::ok(Value::Array(tags))
            }
            ("GET", ["comments", "stats"]) => Self::ok(comment_stats(&state.comments)),

            ("DELETE", [resource, "batch"]) => {
                let ids = body_ids(request);
                let Some(collection) = collection_mut(&mut state, resource) else {
                    drop(state);
                    return self.error(404, "接口不存在");
                };
                if ids.iter().any(|id| find(collection, id).is_none()) {
                    drop(state);
                    return self.error(404, "部分记录不存在");
                }
                collection.retain(|item| !ids.contains(&id_of(item)));
                cascade_delete(&mut state, resource, &ids);
                Self::ok(Value::Null)
            }
            ("PATCH", [resource, "batch", "status"]) => {
                let ids = body_ids(request);
                let status = body_str(request, "status").unwrap_or_default();
                let Some(collection) = collection_mut(&mut state, resource) else {
                    drop(state);
                    return self.error(404, "接口不存在");
                };
                if ids.iter().any(|id| find(collection, id).is_none()) {
                    drop(state);
                    return self.error(404, "部分记录不存在");
                }
                for item in collection.iter_mut() {
                    if ids.contains(&id_of(item)) {
                        item["status"] = json!(status);
                    }
                }
                Self::ok(Value::Null)
            }

            ("GET", [resource]) => {
                let Some(collection) = collection_mut(&mut state, resource) else {
                    drop(state);
                    return self.error(404, "接口不存在");
                };
                let status = request.query_param("status");
                let keyword = request.query_param("keyword").map(str::to_lowercase);
                let post_id = request.query_param("postId");
                let items: Vec<Value> = collection
                    .iter()
                    .filter(|item| status.is_none_or(|s| item["status"] == s))
                    .filter(|item| post_id.is_none_or(|p| item["postId"] == p))
                    .filter(|item| {
                        keyword.as_ref().is_none_or(|k| {
                            let text = item["title"]
                                .as_str()
                                .or(item["name"].as_str())
                                .or(item["content"].as_str())
                                .unwrap_or_default();
                            text.to_lowercase().contains(k)
                        })
                    })
                    .cloned()
                    .collect();
                let items = if *resource == "tags" {
                    items.iter().map(|t| tag_view(&state, t)).collect()
                } else {
                    items
                };
                let stats = (*resource == "comments").then(|| comment_stats(&state.comments));
                drop(state);
                let mut data = self.paginate(items, request);
                if let Some(stats) = stats {
                    data["stats"] = stats;
                }
                Self::ok(data)
            }
            ("POST", [resource]) => {
                let input = match &request.body {
                    Body::Json(Value::Object(map)) => map.clone(),
                    _ => {
                        drop(state);
                        return self.error(400, "请求体无效");
                    }
                };
                if *resource == "tags"
                    && state
                        .tags
                        .iter()
                        .any(|t| t["name"] == input.get("name").cloned().unwrap_or_default())
                {
                    drop(state);
                    let mut response = self.error(422, "标签名称已存在");
                    response.body["details"] = json!({ "name": "名称已存在" });
                    return response;
                }
                let prefix = resource.trim_end_matches('s');
                let id = Self::next_id(&mut state, prefix);
                let entity = build_entity(&state, resource, &id, input);
                match collection_mut(&mut state, resource) {
                    Some(collection) => {
                        collection.push(entity.clone());
                        Self::ok(entity)
                    }
                    None => {
                        drop(state);
                        self.error(404, "接口不存在")
                    }
                }
            }
            ("GET", [resource, id]) => {
                let found = collection_mut(&mut state, resource).and_then(|c| find(c, id).cloned());
                match found {
                    Some(item) if *resource == "tags" => Self::ok(tag_view(&state, &item)),
                    Some(item) => Self::ok(item),
                    None => {
                        drop(state);
                        self.error(404, "记录不存在")
                    }
                }
            }
            ("PUT", [resource, id]) => {
                let patch = match &request.body {
                    Body::Json(Value::Object(map)) => map.clone(),
                    _ => Map::new(),
                };
                let tags = state.tags.clone();
                let updated = collection_mut(&mut state, resource)
                    .and_then(|c| find_mut(c, id))
                    .map(|item| {
                        for (key, value) in patch {
                            if key == "tagIds" {
                                item["tags"] = resolve_tags(&tags, &value);
                            } else {
                                item[key.as_str()] = value;
                            }
                        }
                        item["updatedAt"] = json!("2024-02-01T00:00:00Z");
                        item.clone()
                    });
                if *resource == "tags" {
                    if let Some(tag) = &updated {
                        // 文章里内嵌的标签同步更新
                        for post in state.posts.iter_mut() {
                            if let Some(list) = post["tags"].as_array_mut() {
                                for embedded in list.iter_mut() {
                                    if embedded["id"] == tag["id"] {
                                        *embedded = tag.clone();
                                    }
                                }
                            }
                        }
                    }
                }
                match updated {
                    Some(item) => Self::ok(item),
                    None => {
                        drop(state);
                        self.error(404, "记录不存在")
                    }
                }
            }
            ("DELETE", [resource, id]) => {
                let removed = collection_mut(&mut state, resource).is_some_and(|c| {
                    let before = c.len();
                    c.retain(|item| item["id"] != *id);
                    c.len() < before
                });
                if removed {
                    cascade_delete(&mut state, resource, &[id.to_string()]);
                    Self::ok(Value::Null)
                } else {
                    drop(state);
                    self.error(404, "记录不存在")
                }
            }
            ("PATCH", [resource, id, "status"]) => {
                let status = body_str(request, "status").unwrap_or_default();
                let updated = collection_mut(&mut state, resource)
                    .and_then(|c| find_mut(c, id))
                    .map(|item| {
                        item["status"] = json!(status);
                        item.clone()
                    });
                match updated {
                    Some(item) => Self::ok(item),
                    None => {
                        drop(state);
                        self.error(404, "记录不存在")
                    }
                }
            }
            ("POST", ["posts", id, action @ ("publish" | "unpublish")]) => {
                let published_at = body_str(request, "publishedAt");
                match find_mut(&mut state.posts, id) {
                    Some(post) => {
                        if *action == "publish" {
                            post["status"] = json!("published");
                            post["publishedAt"] =
                                json!(published_at.unwrap_or_else(|| TIMESTAMP.to_string()));
                        } else {
                            post["status"] = json!("draft");
                        }
                        Self::ok(post.clone())
                    }
                    None => {
                        drop(state);
                        self.error(404, "文章不存在")
                    }
                }
            }
            ("POST", ["comments", id, "reply"]) => {
                let Some(parent) = find(&state.comments, id).cloned() else {
                    drop(state);
                    return self.error(404, "评论不存在");
                };
                let reply_id = Self::next_id(&mut state, "comment");
                let reply = json!({
                    "id": reply_id,
                    "postId": parent["postId"],
                    "parentId": id,
                    "content": body_str(request, "content").unwrap_or_default(),
                    "authorName": "Admin",
                    "authorEmail": "admin@example.com",
                    "status": "approved",
                    "type": "reply",
                    "level": 1,
                    "createdAt": TIMESTAMP,
                    "updatedAt": TIMESTAMP,
                });
                state.comments.push(reply.clone());
                if let Some(parent) = find_mut(&mut state.comments, id) {
                    let count = parent["replyCount"].as_u64().unwrap_or(0);
                    parent["replyCount"] = json!(count + 1);
                }
                Self::ok(reply)
            }
            ("POST", ["users", id, "unlock"]) => match find_mut(&mut state.users, id) {
                Some(user) => {
                    user["status"] = json!("active");
                    user["loginFailCount"] = json!(0);
                    Self::ok(user.clone())
                }
                None => {
                    drop(state);
                    self.error(404, "用户不存在")
                }
            },
            ("POST", ["users", _id, "reset-password"]) => Self::ok(Value::Null),
            ("GET", ["users", _id, "login-logs"]) => {
                drop(state);
                let logs = vec![json!({
                    "ip": "127.0.0.1",
                    "userAgent": "test",
                    "success": true,
                    "createdAt": TIMESTAMP,
                    "device": "desktop",
                })];
                Self::ok(self.paginate(logs, request))
            }
            _ => {
                drop(state);
                self.error(404, "接口不存在")
            }
        }
    }

    fn authorized(&self, request: &HttpRequest) -> bool {
        let state = self.state.lock().unwrap();
        request
            .header("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| state.tokens.contains(token))
    }

    fn issue_pair(&self) -> Value {
        let mut state = self.state.lock().unwrap();
        let token = Self::next_id(&mut state, "token");
        let refresh = Self::next_id(&mut state, "refresh");
        state.tokens.insert(token.clone());
        state.refresh_tokens.insert(refresh.clone());
        json!({ "token": token, "refreshToken": refresh, "user": state.users[0].clone() })
    }

    fn login(&self, request: &HttpRequest) -> HttpResponse {
        let username = body_str(request, "username").unwrap_or_default();
        let password = body_str(request, "password").unwrap_or_default();
        if username == ADMIN_USERNAME && password == ADMIN_PASSWORD {
            Self::ok(self.issue_pair())
        } else {
            self.error(401, "用户名或密码错误")
        }
    }

    fn refresh(&self, request: &HttpRequest) -> HttpResponse {
        let refresh = body_str(request, "refreshToken").unwrap_or_default();
        let valid = self.state.lock().unwrap().refresh_tokens.remove(&refresh);
        if valid {
            Self::ok(self.issue_pair())
        } else {
            self.error(401, "刷新令牌无效")
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.state.lock().unwrap().requests.push(request.clone());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.offline.lock().unwrap() {
            return Err(TransportError::Connect("connection refused".into()));
        }
        Ok(self.route(&request))
    }
}

fn id_of(item: &Value) -> String {
    item["id"].as_str().unwrap_or_default().to_string()
}

fn find<'a>(items: &'a [Value], id: &str) -> Option<&'a Value> {
    items.iter().find(|item| item["id"] == id)
}

fn find_mut<'a>(items: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    items.iter_mut().find(|item| item["id"] == id)
}

fn collection_mut<'a>(state: &'a mut BackendState, resource: &str) -> Option<&'a mut Vec<Value>> {
    match resource {
        "posts" => Some(&mut state.posts),
        "tags" => Some(&mut state.tags),
        "comments" => Some(&mut state.comments),
        "users" => Some(&mut state.users),
        _ => None,
    }
}

fn body_str(request: &HttpRequest, field: &str) -> Option<String> {
    match &request.body {
        Body::Json(body) => body.get(field).and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn body_ids(request: &HttpRequest) -> Vec<String> {
    match &request.body {
        Body::Json(body) => body["ids"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn resolve_tags(tags: &[Value], ids: &Value) -> Value {
    let ids: Vec<&str> = ids
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    Value::Array(
        tags.iter()
            .filter(|t| ids.contains(&t["id"].as_str().unwrap_or_default()))
            .cloned()
            .collect(),
    )
}

fn tag_view(state: &BackendState, tag: &Value) -> Value {
    let count = state
        .posts
        .iter()
        .filter(|p| {
            p["tags"]
                .as_array()
                .is_some_and(|tags| tags.iter().any(|t| t["id"] == tag["id"]))
        })
        .count();
    let mut view = tag.clone();
    view["postCount"] = json!(count);
    view
}

fn comment_stats(comments: &[Value]) -> Value {
    let count = |status: &str| comments.iter().filter(|c| c["status"] == status).count();
    json!({
        "total": comments.len(),
        "pending": count("pending"),
        "approved": count("approved"),
        "rejected": count("rejected"),
        "spam": count("spam"),
    })
}

fn build_entity(state: &BackendState, resource: &str, id: &str, input: Map<String, Value>) -> Value {
    let mut entity = Map::new();
    entity.insert("id".into(), json!(id));
    entity.insert("createdAt".into(), json!(TIMESTAMP));
    entity.insert("updatedAt".into(), json!(TIMESTAMP));
    match resource {
        "posts" => {
            entity.insert("authorId".into(), json!("user-1"));
            entity.insert("visibility".into(), json!("public"));
            let slug = input
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase()
                .replace(' ', "-");
            entity.insert("slug".into(), json!(slug));
            let tags = input
                .get("tagIds")
                .map(|ids| resolve_tags(&state.tags, ids))
                .unwrap_or_else(|| json!([]));
            entity.insert("tags".into(), tags);
        }
        "tags" => {
            let slug = input
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            entity.insert("slug".into(), json!(slug));
            entity.insert("visibility".into(), json!("public"));
        }
        "comments" => {
            entity.insert("status".into(), json!("pending"));
        }
        _ => {}
    }
    for (key, value) in input {
        if key != "tagIds" && key != "password" {
            entity.insert(key, value);
        }
    }
    Value::Object(entity)
}

fn cascade_delete(state: &mut BackendState, resource: &str, ids: &[String]) {
    match resource {
        "tags" => {
            for post in state.posts.iter_mut() {
                if let Some(tags) = post["tags"].as_array_mut() {
                    tags.retain(|t| !ids.contains(&id_of(t)));
                }
            }
        }
        "posts" => {
            state
                .comments
                .retain(|c| !ids.contains(&c["postId"].as_str().unwrap_or_default().to_string()));
        }
        _ => {}
    }
}

/// 记录所有提示
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message)
            .collect()
    }

    pub fn successes(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Success)
            .map(|n| n.message)
            .collect()
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// 记录所有跳转
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_string());
    }
}

pub struct Harness {
    pub ctx: AdminContext,
    pub backend: Arc<FakeBackend>,
    pub notices: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub credentials: Arc<MemoryCredentialStore>,
}

pub fn harness() -> Harness {
    harness_with(FakeBackend::new(), Arc::new(MemoryCredentialStore::new()))
}

pub fn harness_with(backend: Arc<FakeBackend>, credentials: Arc<MemoryCredentialStore>) -> Harness {
    let store: Arc<dyn CredentialStore> = credentials.clone();
    context_with(backend, store, credentials)
}

pub fn context_with(
    backend: Arc<FakeBackend>,
    store: Arc<dyn CredentialStore>,
    credentials: Arc<MemoryCredentialStore>,
) -> Harness {
    let notices = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let config = Config {
        request_timeout_secs: 5,
        ..Config::default()
    };
    let ctx = AdminContext::from_parts(
        config,
        backend.clone(),
        store,
        notices.clone(),
        navigator.clone(),
    );
    Harness {
        ctx,
        backend,
        notices,
        navigator,
        credentials,
    }
}

impl Harness {
    pub async fn login(&self) {
        self.ctx
            .session
            .login(&LoginRequest::new(ADMIN_USERNAME, ADMIN_PASSWORD))
            .await
            .expect("login should succeed");
        self.notices.clear();
    }
}

pub async fn logged_in() -> Harness {
    let harness = harness();
    harness.login().await;
    harness
}
