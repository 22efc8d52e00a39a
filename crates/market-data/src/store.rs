//! 주입 가능한 시장 데이터 스토어.
//!
//! 전역 싱글턴 대신 호출자가 소유/공유하는 스토어입니다.
//! 복제본은 같은 상태를 공유합니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::debug;

use crate::state::{reduce, MarketDataAction, MarketDataState};

struct StoreInner {
    state: RwLock<MarketDataState>,
    /// 변경마다 증가하는 버전 (구독자 알림용)
    version_tx: watch::Sender<u64>,
    /// `reset`마다 증가하는 세대. 이전 세대에서 시작된 요청의 결과는 적용하지 않음
    epoch: AtomicU64,
}

/// 시장 데이터 스토어.
#[derive(Clone)]
pub struct MarketStore {
    inner: Arc<StoreInner>,
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new(MarketDataState::default())
    }
}

impl std::fmt::Debug for MarketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStore")
            .field("version", &self.version())
            .finish()
    }
}

impl MarketStore {
    /// 주어진 초기 상태로 스토어를 생성합니다.
    pub fn new(initial: MarketDataState) -> Self {
        let (version_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                version_tx,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, MarketDataState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bump_version(&self, action: &'static str) {
        self.inner.version_tx.send_modify(|v| *v += 1);
        debug!(action, version = self.version(), "market data action applied");
    }

    /// 액션을 적용합니다. 동기적으로 완료됩니다.
    pub fn dispatch(&self, action: MarketDataAction) {
        let name = action.name();
        reduce(&mut self.write(), action);
        self.bump_version(name);
    }

    /// `epoch` 세대가 아직 유효할 때만 액션을 적용합니다.
    ///
    /// `reset` 이후 도착한 이전 요청의 결과는 버리고 `false`를 반환합니다.
    pub fn dispatch_in_epoch(&self, epoch: u64, action: MarketDataAction) -> bool {
        let name = action.name();
        {
            let mut state = self.write();
            let current = self.epoch();
            if current != epoch {
                debug!(action = name, epoch, current, "discarding stale market data action");
                return false;
            }
            reduce(&mut state, action);
        }
        self.bump_version(name);
        true
    }

    /// 상태를 초기화하고 세대를 넘깁니다.
    pub fn reset(&self) {
        {
            let mut state = self.write();
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            reduce(&mut state, MarketDataAction::Clear);
        }
        self.bump_version("clear");
    }

    /// 현재 세대.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// 상태에 대한 읽기 전용 접근.
    pub fn select<T>(&self, selector: impl FnOnce(&MarketDataState) -> T) -> T {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        selector(&state)
    }

    /// 현재 상태의 스냅샷.
    pub fn snapshot(&self) -> MarketDataState {
        self.select(MarketDataState::clone)
    }

    /// 현재 버전 (적용된 액션 수).
    pub fn version(&self) -> u64 {
        *self.inner.version_tx.borrow()
    }

    /// 상태 변경 알림을 구독합니다.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version_tx.subscribe()
    }
}
