//! 요청 캐시.
//!
//! # 주요 기능
//!
//! - **중복 제거**: 같은 키의 요청이 진행 중이면 새 요청 없이 결과를 공유
//! - **구독**: 키별 `watch` 채널로 상태 변화를 전달
//! - **재실행**: 구독 중인 키 목록을 제공하여 재연결 시 다시 실행
//!
//! # 상태 전이
//!
//! ```text
//! Uninitialized ──start──> Pending ──성공──> Fulfilled
//!                             │               │
//!                             └──실패──> Rejected
//!                                             │
//!            Fulfilled / Rejected ──start──> Pending (이전 data 유지)
//! ```
//!
//! 진행 중인 요청은 tokio 태스크로 구동되므로 호출자가 결과를 기다리지
//! 않아도 끝까지 실행되고 캐시에 반영됩니다. 취소는 지원하지 않습니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, trace, Instrument};

use market_core::{AssetId, HistoryData, MarketData};

use super::key::QueryKey;
use crate::error::{QueryError, QueryResult};
use crate::state::MarketDataById;

/// 조회 결과 값.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryData {
    /// 식별자별 시세 목록 (findAll)
    MarketCaps(MarketDataById<AssetId>),
    /// 단건 시세
    Market(MarketData),
    /// 가격 이력
    PriceHistory(Vec<HistoryData>),
}

/// 조회 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryStatus {
    #[default]
    Uninitialized,
    Pending,
    Fulfilled,
    Rejected,
}

/// 키 하나의 조회 상태 스냅샷.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub status: QueryStatus,
    /// 마지막 성공 결과 (재요청/실패 중에도 유지)
    pub data: Option<QueryData>,
    /// 마지막 요청이 실패한 경우의 오류
    pub error: Option<QueryError>,
    /// 마지막 성공 시각
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending && self.data.is_none()
    }

    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Fulfilled
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Rejected
    }

    /// 요청이 끝난 상태인지 (성공 또는 실패).
    pub fn is_settled(&self) -> bool {
        matches!(self.status, QueryStatus::Fulfilled | QueryStatus::Rejected)
    }
}

/// 진행 중인 요청의 공유 future.
pub type SharedQuery = Shared<BoxFuture<'static, QueryResult<QueryData>>>;

struct Entry {
    tx: watch::Sender<QueryState>,
    in_flight: Option<(u64, SharedQuery)>,
    subscribers: usize,
}

impl Entry {
    fn new() -> Self {
        let (tx, _) = watch::channel(QueryState::default());
        Self {
            tx,
            in_flight: None,
            subscribers: 0,
        }
    }
}

#[derive(Default)]
struct CacheInner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_request_id: AtomicU64,
}

/// (엔드포인트, 인자) 키 기반 요청 캐시.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.lock().len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 요청을 시작하거나, 같은 키의 요청이 진행 중이면 그 요청을 공유합니다.
    ///
    /// `fetch`는 새 요청이 필요한 경우에만 호출됩니다.
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn start<F>(&self, key: QueryKey, fetch: F) -> SharedQuery
    where
        F: FnOnce() -> BoxFuture<'static, QueryResult<QueryData>>,
    {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

        if let Some((request_id, shared)) = &entry.in_flight {
            debug!(key = %key, request_id, "joining in-flight query");
            return shared.clone();
        }

        let request_id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        let cache = self.clone();
        let settle_key = key.clone();
        let fut = fetch();
        let span = market_core::query_span!(key.endpoint(), key);
        let shared = async move {
            let result = fut.await;
            cache.settle(&settle_key, request_id, &result);
            result
        }
        .instrument(span)
        .boxed()
        .shared();

        entry.in_flight = Some((request_id, shared.clone()));
        entry.tx.send_modify(|state| state.status = QueryStatus::Pending);
        drop(entries);

        trace!(key = %key, request_id, "query started");
        tokio::spawn(shared.clone());
        shared
    }

    /// 요청을 시작(또는 공유)하고 결과를 기다립니다.
    pub async fn run<F>(&self, key: QueryKey, fetch: F) -> QueryResult<QueryData>
    where
        F: FnOnce() -> BoxFuture<'static, QueryResult<QueryData>>,
    {
        self.start(key, fetch).await
    }

    fn settle(&self, key: &QueryKey, request_id: u64, result: &QueryResult<QueryData>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        // reset 이후 도착한 이전 요청의 결과는 버림
        match &entry.in_flight {
            Some((current, _)) if *current == request_id => entry.in_flight = None,
            _ => {
                debug!(key = %key, request_id, "discarding stale query result");
                return;
            }
        }

        entry.tx.send_modify(|state| match result {
            Ok(data) => {
                state.status = QueryStatus::Fulfilled;
                state.data = Some(data.clone());
                state.error = None;
                state.fulfilled_at = Some(Utc::now());
            }
            Err(error) => {
                state.status = QueryStatus::Rejected;
                state.error = Some(error.clone());
            }
        });
    }

    /// 키의 상태 변화를 구독합니다.
    pub fn subscribe(&self, key: QueryKey) -> QuerySubscription {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.subscribers += 1;
        let rx = entry.tx.subscribe();
        drop(entries);

        QuerySubscription {
            key,
            rx,
            cache: self.clone(),
        }
    }

    fn unsubscribe(&self, key: &QueryKey) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
        }
    }

    /// 키의 현재 상태. 한 번도 요청되지 않았으면 `Uninitialized`.
    pub fn state(&self, key: &QueryKey) -> QueryState {
        self.lock()
            .get(key)
            .map(|entry| entry.tx.borrow().clone())
            .unwrap_or_default()
    }

    /// 요청이 진행 중인지 확인.
    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// 키의 현재 구독자 수.
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.lock().get(key).map_or(0, |entry| entry.subscribers)
    }

    /// 구독자가 하나 이상 있는 키 목록.
    pub fn subscribed_keys(&self) -> Vec<QueryKey> {
        self.lock()
            .iter()
            .filter(|(_, entry)| entry.subscribers > 0)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// 모든 조회 상태를 초기화합니다.
    ///
    /// 구독 중인 키는 `Uninitialized`로 되돌리고, 구독이 없는 키는 제거합니다.
    /// 진행 중인 요청의 결과는 이후 무시됩니다.
    pub fn reset(&self) {
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.subscribers > 0);
        for entry in entries.values_mut() {
            entry.in_flight = None;
            entry.tx.send_replace(QueryState::default());
        }
    }
}

/// 키 하나에 대한 구독 핸들.
///
/// 드롭되면 구독자 수가 줄어듭니다.
pub struct QuerySubscription {
    key: QueryKey,
    rx: watch::Receiver<QueryState>,
    cache: QueryCache,
}

impl QuerySubscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// 현재 상태 스냅샷.
    pub fn state(&self) -> QueryState {
        self.rx.borrow().clone()
    }

    /// 다음 상태 변화까지 대기합니다. 캐시가 사라지면 `None`.
    pub async fn changed(&mut self) -> Option<QueryState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// 요청이 끝난 상태(성공 또는 실패)가 될 때까지 대기합니다.
    pub async fn settled(&mut self) -> Option<QueryState> {
        self.rx
            .wait_for(QueryState::is_settled)
            .await
            .ok()
            .map(|state| state.clone())
    }
}

impl Drop for QuerySubscription {
    fn drop(&mut self) {
        self.cache.unsubscribe(&self.key);
    }
}

impl std::fmt::Debug for QuerySubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySubscription")
            .field("key", &self.key)
            .field("status", &self.rx.borrow().status)
            .finish()
    }
}
