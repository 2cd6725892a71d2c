use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::invalidation::{Effect, Mutation};
use super::keys::{CacheKey, KeyPattern};
use super::models::{CacheEntry, QueryState};
use crate::error::ApiError;

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

struct InFlight {
    key: CacheKey,
    seq: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, InFlight>,
    /// 首次加载失败、尚无条目时记录的错误
    failures: HashMap<String, ApiError>,
    /// 每个键允许提交的最小请求序号
    watermarks: HashMap<String, u64>,
    /// clear() 之后全局的最小序号
    floor: u64,
}

impl CacheState {
    fn watermark(&self, hash: &str) -> u64 {
        self.watermarks
            .get(hash)
            .copied()
            .unwrap_or(0)
            .max(self.floor)
    }
}

struct CacheInner {
    state: Mutex<CacheState>,
    seq: AtomicU64,
    default_stale: Duration,
}

impl CacheInner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // 临界区内没有会 panic 的操作，被毒化时直接沿用内部数据
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn commit(
        &self,
        key: &CacheKey,
        hash: &str,
        seq: u64,
        stale_after: Duration,
        result: &Result<Value, ApiError>,
    ) {
        let mut state = self.lock();
        if state.in_flight.get(hash).is_some_and(|f| f.seq == seq) {
            state.in_flight.remove(hash);
        }

        if seq < state.watermark(hash) {
            debug!("丢弃过期响应: key={}, seq={}", key, seq);
            return;
        }

        match result {
            Ok(value) => {
                if state.entries.get(hash).is_some_and(|entry| entry.seq > seq) {
                    debug!("已有更新的数据，忽略响应: key={}, seq={}", key, seq);
                    return;
                }
                state.failures.remove(hash);
                state.entries.insert(
                    hash.to_string(),
                    CacheEntry::confirmed(key.clone(), value.clone(), seq, stale_after),
                );
            }
            Err(err) => {
                warn!("缓存读取失败: key={}, error={}", key, err);
                match state.entries.get_mut(hash) {
                    Some(entry) => entry.last_error = Some(err.clone()),
                    None => {
                        state.failures.insert(hash.to_string(), err.clone());
                    }
                }
            }
        }
    }
}

enum Plan {
    Serve(Value),
    Await(SharedFetch),
}

/// 查询缓存
///
/// 所有读取按 [`CacheKey`] 存放；过期的值先返回再后台刷新，
/// 被变更操作标记失效的值不会再由 [`QueryCache::fetch`] 返回。
/// 同一个键的并发读取共享一次请求。
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(default_stale: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                state: Mutex::new(CacheState::default()),
                seq: AtomicU64::new(0),
                default_stale,
            }),
        }
    }

    pub fn default_stale(&self) -> Duration {
        self.inner.default_stale
    }

    /// 读取一个键
    ///
    /// - 未过期：直接返回缓存
    /// - 已过期但未失效：返回缓存，同时在后台刷新
    /// - 缺失或已失效：等待网络结果（与同键的进行中请求合并）
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &CacheKey,
        stale_after: Duration,
        fetcher: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let hash = key.hash();
        let plan = {
            let mut state = self.inner.lock();
            let now = Instant::now();
            let cached = state
                .entries
                .get(&hash)
                .filter(|entry| !entry.invalidated)
                .map(|entry| (entry.is_fresh(now), entry.value.clone()));
            let joined = state.in_flight.get(&hash).map(|f| f.future.clone());

            match (cached, joined) {
                (Some((true, value)), _) => Plan::Serve(value),
                (Some((false, value)), joined) => {
                    if joined.is_none() {
                        debug!("数据已过期，后台刷新: key={}", key);
                        let refresh = self.start(&mut state, key, &hash, stale_after, fetcher);
                        tokio::spawn(refresh);
                    }
                    Plan::Serve(value)
                }
                (None, Some(future)) => {
                    debug!("合并进行中的请求: key={}", key);
                    Plan::Await(future)
                }
                (None, None) => Plan::Await(self.start(&mut state, key, &hash, stale_after, fetcher)),
            }
        };

        let value = match plan {
            Plan::Serve(value) => value,
            Plan::Await(future) => future.await?,
        };
        serde_json::from_value(value).map_err(ApiError::decode)
    }

    fn start<T, F, Fut>(
        &self,
        state: &mut CacheState,
        key: &CacheKey,
        hash: &str,
        stale_after: Duration,
        fetcher: F,
    ) -> SharedFetch
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let seq = self.inner.next_seq();
        let inner: Weak<CacheInner> = Arc::downgrade(&self.inner);
        let request = fetcher();
        let commit_key = key.clone();
        let commit_hash = hash.to_string();

        let future = async move {
            let result = request
                .await
                .and_then(|value| serde_json::to_value(value).map_err(ApiError::decode));
            if let Some(inner) = inner.upgrade() {
                inner.commit(&commit_key, &commit_hash, seq, stale_after, &result);
            }
            result
        }
        .boxed()
        .shared();

        state.in_flight.insert(
            hash.to_string(),
            InFlight {
                key: key.clone(),
                seq,
                future: future.clone(),
            },
        );
        future
    }

    /// 查看一个键的当前状态，不触发请求
    pub fn peek<T: DeserializeOwned>(&self, key: &CacheKey) -> QueryState<T> {
        let hash = key.hash();
        let state = self.inner.lock();
        let is_fetching = state.in_flight.contains_key(&hash);

        let Some(entry) = state.entries.get(&hash) else {
            let mut query = QueryState::empty(is_fetching);
            query.last_error = state.failures.get(&hash).cloned();
            return query;
        };

        let (data, last_error) = match serde_json::from_value(entry.value.clone()) {
            Ok(data) => (Some(data), entry.last_error.clone()),
            Err(err) => (None, Some(ApiError::decode(err))),
        };
        QueryState {
            data,
            fetched_at: Some(entry.fetched_wall),
            is_stale: !entry.is_fresh(Instant::now()),
            is_invalidated: entry.invalidated,
            is_optimistic: entry.optimistic,
            is_fetching,
            last_error,
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.lock().entries.contains_key(&key.hash())
    }

    /// 直接写入服务端已确认的值，例如创建、更新后回填详情
    pub fn set<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        stale_after: Duration,
    ) -> Result<(), ApiError> {
        let value = serde_json::to_value(value).map_err(ApiError::decode)?;
        let hash = key.hash();
        let mut state = self.inner.lock();
        let seq = self.inner.next_seq();
        state.watermarks.insert(hash.clone(), seq);
        state.in_flight.remove(&hash);
        state.failures.remove(&hash);
        state.entries.insert(
            hash,
            CacheEntry::confirmed(key.clone(), value, seq, stale_after),
        );
        Ok(())
    }

    /// 标记匹配的键失效，并放弃它们进行中的请求
    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let mut state = self.inner.lock();
        let watermark = self.inner.next_seq();
        let mut touched = 0;

        let CacheState {
            entries,
            in_flight,
            watermarks,
            ..
        } = &mut *state;
        for (hash, entry) in entries.iter_mut() {
            if pattern.matches(&entry.key) {
                entry.invalidated = true;
                watermarks.insert(hash.clone(), watermark);
                touched += 1;
            }
        }
        in_flight.retain(|hash, f| {
            if pattern.matches(&f.key) {
                watermarks.insert(hash.clone(), watermark);
                false
            } else {
                true
            }
        });
        touched
    }

    /// 删除匹配的键
    pub fn remove(&self, pattern: &KeyPattern) -> usize {
        let mut state = self.inner.lock();
        let watermark = self.inner.next_seq();

        let CacheState {
            entries,
            in_flight,
            failures,
            watermarks,
            ..
        } = &mut *state;
        let before = entries.len();
        entries.retain(|hash, entry| {
            if pattern.matches(&entry.key) {
                watermarks.insert(hash.clone(), watermark);
                false
            } else {
                true
            }
        });
        in_flight.retain(|hash, f| {
            if pattern.matches(&f.key) {
                watermarks.insert(hash.clone(), watermark);
                failures.remove(hash);
                false
            } else {
                true
            }
        });
        before - entries.len()
    }

    /// 按对照表应用一次变更的全部影响
    pub fn apply(&self, mutation: &Mutation) {
        let effects = mutation.effects();
        debug!("应用缓存变更: {:?}, 影响 {} 项", mutation, effects.len());
        for effect in &effects {
            match effect {
                Effect::Invalidate(pattern) => {
                    self.invalidate(pattern);
                }
                Effect::Remove(pattern) => {
                    self.remove(pattern);
                }
            }
        }
    }

    /// 清空全部缓存，进行中的请求结果也会被丢弃
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.entries.clear();
        state.in_flight.clear();
        state.failures.clear();
        state.watermarks.clear();
        state.floor = self.inner.next_seq();
        debug!("查询缓存已清空");
    }

    /// 乐观更新
    ///
    /// 先写入预期值，请求成功后以服务端返回值为准；
    /// 失败时恢复到写入前的值并返回错误。
    pub async fn mutate_optimistic<T, Fut>(
        &self,
        key: &CacheKey,
        expected: &T,
        request: Fut,
    ) -> Result<T, ApiError>
    where
        T: Serialize,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let expected = serde_json::to_value(expected).map_err(ApiError::decode)?;
        let hash = key.hash();

        let (previous, seq, stale_after) = {
            let mut state = self.inner.lock();
            let seq = self.inner.next_seq();
            let previous = state.entries.get(&hash).cloned();
            let stale_after = previous
                .as_ref()
                .map(|entry| entry.stale_after)
                .unwrap_or(self.inner.default_stale);
            state.watermarks.insert(hash.clone(), seq);
            state.in_flight.remove(&hash);
            state.entries.insert(
                hash.clone(),
                CacheEntry::optimistic(key.clone(), expected, seq, stale_after),
            );
            (previous, seq, stale_after)
        };

        let result = request.await;

        let mut state = self.inner.lock();
        // 期间被删除或有更新的写入时不再改动
        let Some(current) = state.entries.get(&hash).filter(|entry| entry.seq == seq) else {
            return result;
        };
        // 请求期间被标记失效的，结果落地后仍保持失效
        let invalidated = current.invalidated || state.watermark(&hash) > seq;

        match result {
            Ok(confirmed) => {
                let value = serde_json::to_value(&confirmed).map_err(ApiError::decode)?;
                let confirmed_seq = self.inner.next_seq();
                let mut entry = CacheEntry::confirmed(key.clone(), value, confirmed_seq, stale_after);
                entry.invalidated = invalidated;
                state.entries.insert(hash, entry);
                Ok(confirmed)
            }
            Err(err) => {
                debug!("乐观更新失败，回滚: key={}", key);
                match previous {
                    Some(mut entry) => {
                        entry.last_error = Some(err.clone());
                        entry.invalidated |= invalidated;
                        state.entries.insert(hash, entry);
                    }
                    None => {
                        state.entries.remove(&hash);
                    }
                }
                Err(err)
            }
        }
    }
}
