//! 네트워크 연결 상태 관찰과 재연결 시 재요청.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::cache::{QueryCache, QueryData};
use super::key::QueryKey;
use crate::error::QueryResult;

/// 네트워크 연결 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityStatus {
    Online,
    Offline,
}

/// 연결 상태 관찰자.
///
/// 브라우저 online/offline 이벤트, OS 네트워크 알림, 주기적 헬스체크 등
/// 어떤 소스든 이 trait으로 연결할 수 있습니다.
pub trait ConnectivityObserver: Send + Sync {
    /// 연결 상태 변화를 전달하는 채널.
    fn watch(&self) -> watch::Receiver<ConnectivityStatus>;
}

/// 호출자가 직접 상태를 설정하는 관찰자.
#[derive(Debug)]
pub struct ManualConnectivity {
    tx: watch::Sender<ConnectivityStatus>,
}

impl Default for ManualConnectivity {
    fn default() -> Self {
        Self::new(ConnectivityStatus::Online)
    }
}

impl ManualConnectivity {
    pub fn new(initial: ConnectivityStatus) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn set_online(&self) {
        self.set(ConnectivityStatus::Online);
    }

    pub fn set_offline(&self) {
        self.set(ConnectivityStatus::Offline);
    }

    pub fn set(&self, status: ConnectivityStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }

    pub fn status(&self) -> ConnectivityStatus {
        *self.tx.borrow()
    }
}

impl ConnectivityObserver for ManualConnectivity {
    fn watch(&self) -> watch::Receiver<ConnectivityStatus> {
        self.tx.subscribe()
    }
}

/// 키에 해당하는 요청 future를 만드는 실행기.
pub trait QueryExecutor: Send + Sync + 'static {
    fn fetcher(&self, key: &QueryKey) -> BoxFuture<'static, QueryResult<QueryData>>;
}

/// 구독 중인 모든 키를 다시 요청합니다. 시작한 요청 수를 반환.
pub fn refetch_subscribed<E>(cache: &QueryCache, executor: &E) -> usize
where
    E: QueryExecutor + ?Sized,
{
    let keys = cache.subscribed_keys();
    for key in &keys {
        let _ = cache.start(key.clone(), || executor.fetcher(key));
    }
    keys.len()
}

/// Offline → Online 전이마다 구독 중인 조회를 재실행하는 태스크를 시작합니다.
///
/// 관찰자의 채널이 닫히면 태스크도 종료됩니다.
pub fn spawn_refetch_on_reconnect<E>(
    cache: QueryCache,
    executor: Arc<E>,
    observer: &dyn ConnectivityObserver,
) -> JoinHandle<()>
where
    E: QueryExecutor + ?Sized,
{
    let mut rx = observer.watch();

    tokio::spawn(async move {
        let mut previous = *rx.borrow_and_update();

        while rx.changed().await.is_ok() {
            let current = *rx.borrow_and_update();
            if previous == ConnectivityStatus::Offline && current == ConnectivityStatus::Online {
                let count = refetch_subscribed(&cache, executor.as_ref());
                info!(queries = count, "network reconnected, refetching subscribed queries");
            } else {
                debug!(?previous, ?current, "connectivity changed");
            }
            previous = current;
        }
    })
}
