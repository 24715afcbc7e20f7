//! Fixed-size pool of exclusive backend handles.
//!
//! All handles are opened by [`ConnectionPool::connect`] and live as long as
//! the pool. Callers borrow one with [`ConnectionPool::acquire`], which waits
//! in FIFO order when every handle is checked out, and give it back by
//! calling [`PooledHandle::release`] or simply dropping the guard.
//!
//! # Invariants
//!
//! - `available + checked_out == size` whenever the pool state is observed
//! - a handle is held by at most one [`PooledHandle`] at a time
//! - the pool never opens more than `size` slots

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, trace, warn};

use crate::ports::Connector;

use super::PoolError;

/// Pool sizing and behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Number of handles opened at startup.
    ///
    /// Default: 5
    pub size: usize,

    /// Check each handle with [`Connector::is_valid`] before lending it out,
    /// reopening it when the check fails.
    ///
    /// Default: true
    pub test_on_acquire: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            size: 5,
            test_on_acquire: true,
        }
    }
}

impl PoolOptions {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_test_on_acquire(mut self, enabled: bool) -> Self {
        self.test_on_acquire = enabled;
        self
    }
}

/// Point-in-time pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub size: usize,
    pub available: usize,
    pub checked_out: usize,
}

struct Slot<H> {
    id: usize,
    handle: H,
}

struct PoolState<H> {
    idle: VecDeque<Slot<H>>,
    checked_out: usize,
}

struct PoolInner<C: Connector> {
    connector: C,
    state: Mutex<PoolState<C::Handle>>,
    permits: Arc<Semaphore>,
    size: usize,
    test_on_acquire: bool,
}

impl<C: Connector> PoolInner<C> {
    fn lock_state(&self) -> MutexGuard<'_, PoolState<C::Handle>> {
        // Nothing panics while holding the lock, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn status(&self) -> PoolStatus {
        let state = self.lock_state();
        PoolStatus {
            size: self.size,
            available: state.idle.len(),
            checked_out: state.checked_out,
        }
    }

    fn take_idle(&self) -> Option<Slot<C::Handle>> {
        let mut state = self.lock_state();
        let slot = state.idle.pop_front()?;
        state.checked_out += 1;
        trace!(
            slot = slot.id,
            available = state.idle.len(),
            "Connection handed out"
        );
        Some(slot)
    }

    fn put_back(&self, slot: Slot<C::Handle>) {
        let mut state = self.lock_state();
        let id = slot.id;
        state.idle.push_back(slot);
        state.checked_out = state.checked_out.saturating_sub(1);
        trace!(slot = id, available = state.idle.len(), "Connection returned");
    }

    async fn revalidate(&self, slot: &mut Slot<C::Handle>) {
        if self.connector.is_valid(&mut slot.handle).await {
            return;
        }

        warn!(slot = slot.id, "Pooled connection failed liveness check, reconnecting");
        match self.connector.connect().await {
            Ok(handle) => {
                slot.handle = handle;
                info!(slot = slot.id, "Pooled connection reopened");
            }
            Err(e) => {
                warn!(
                    slot = slot.id,
                    error = %e,
                    "Reconnect failed, handing out existing connection"
                );
            }
        }
    }
}

/// Bounded pool of exclusive backend handles.
///
/// Cloning is cheap and every clone shares the same handles.
pub struct ConnectionPool<C: Connector> {
    inner: Arc<PoolInner<C>>,
}

impl<C: Connector> Clone for ConnectionPool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("status", &self.status())
            .field("test_on_acquire", &self.inner.test_on_acquire)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<C: Connector> ConnectionPool<C> {
    /// Opens `options.size` handles and builds the pool.
    ///
    /// # Errors
    ///
    /// - `InvalidSize` if `options.size` is zero
    /// - `Connect` if any handle cannot be opened; handles opened so far are dropped
    pub async fn connect(connector: C, options: PoolOptions) -> Result<Self, PoolError> {
        if options.size == 0 {
            return Err(PoolError::InvalidSize);
        }

        info!(size = options.size, "Opening connection pool");

        let mut idle = VecDeque::with_capacity(options.size);
        for id in 0..options.size {
            let handle = connector
                .connect()
                .await
                .map_err(|source| PoolError::Connect { slot: id, source })?;
            debug!(slot = id, "Connection opened");
            idle.push_back(Slot { id, handle });
        }

        Ok(Self {
            inner: Arc::new(PoolInner {
                connector,
                state: Mutex::new(PoolState {
                    idle,
                    checked_out: 0,
                }),
                permits: Arc::new(Semaphore::new(options.size)),
                size: options.size,
                test_on_acquire: options.test_on_acquire,
            }),
        })
    }

    /// Borrows a handle, waiting until one is free.
    ///
    /// Waiters are served in arrival order. There is no timeout: if every
    /// handle is held forever, this waits forever.
    ///
    /// Dropping the returned future before it completes never leaks a slot.
    ///
    /// # Errors
    ///
    /// - `Closed` if the pool was closed before or while waiting
    pub async fn acquire(&self) -> Result<PooledHandle<C>, PoolError> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        // Permit holders never outnumber idle slots, so this only fails if
        // the state was corrupted.
        let slot = self.inner.take_idle().ok_or(PoolError::Closed)?;

        let mut guard = PooledHandle {
            slot: Some(slot),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        };

        if self.inner.test_on_acquire {
            if let Some(slot) = guard.slot.as_mut() {
                self.inner.revalidate(slot).await;
            }
        }

        Ok(guard)
    }

    /// Current occupancy.
    pub fn status(&self) -> PoolStatus {
        self.inner.status()
    }

    /// Number of handles the pool was built with.
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Stops lending handles.
    ///
    /// Waiting and future `acquire` calls fail with `Closed`. Handles already
    /// checked out keep working and are still returned on release.
    pub fn close(&self) {
        if !self.inner.permits.is_closed() {
            self.inner.permits.close();
            info!(status = ?self.status(), "Connection pool closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.permits.is_closed()
    }
}

/// Occupancy view of a pool that hides its connector type.
pub trait PoolMonitor: Send + Sync {
    fn status(&self) -> PoolStatus;
}

impl<C: Connector> PoolMonitor for ConnectionPool<C> {
    fn status(&self) -> PoolStatus {
        ConnectionPool::status(self)
    }
}

/// Exclusive loan of one pooled handle.
///
/// Derefs to the handle. The handle goes back to the pool exactly once:
/// on [`release`](Self::release) or when the guard is dropped, whichever
/// comes first.
pub struct PooledHandle<C: Connector> {
    slot: Option<Slot<C::Handle>>,
    pool: Arc<PoolInner<C>>,
    // Dropped after `Drop::drop` has put the slot back.
    _permit: OwnedSemaphorePermit,
}

impl<C: Connector> PooledHandle<C> {
    /// Returns the handle to the pool.
    pub fn release(self) {
        drop(self);
    }

    /// Identity of the pool slot this handle occupies.
    pub fn slot_id(&self) -> usize {
        self.slot.as_ref().map_or(usize::MAX, |slot| slot.id)
    }
}

impl<C: Connector> Deref for PooledHandle<C> {
    type Target = C::Handle;

    fn deref(&self) -> &Self::Target {
        &self
            .slot
            .as_ref()
            .expect("pooled handle is present until dropped")
            .handle
    }
}

impl<C: Connector> DerefMut for PooledHandle<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self
            .slot
            .as_mut()
            .expect("pooled handle is present until dropped")
            .handle
    }
}

impl<C: Connector> fmt::Debug for PooledHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledHandle")
            .field("slot", &self.slot_id())
            .finish()
    }
}

impl<C: Connector> Drop for PooledHandle<C> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.pool.put_back(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ConnectorError;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    // ───────────────────────────────────────────────────────────────
    // Test connector
    // ───────────────────────────────────────────────────────────────

    #[derive(Debug)]
    struct TestConn {
        serial: usize,
        broken: bool,
    }

    #[derive(Default)]
    struct TestConnector {
        opened: AtomicUsize,
        fail_from: Option<usize>,
        refuse_reconnect: AtomicBool,
    }

    impl TestConnector {
        fn failing_from(n: usize) -> Self {
            Self {
                fail_from: Some(n),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl Connector for TestConnector {
        type Handle = TestConn;

        async fn connect(&self) -> Result<TestConn, ConnectorError> {
            let serial = self.opened.load(Ordering::SeqCst);
            if self.fail_from.is_some_and(|n| serial >= n)
                || self.refuse_reconnect.load(Ordering::SeqCst)
            {
                return Err(ConnectorError::new("connection refused"));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(TestConn {
                serial,
                broken: false,
            })
        }

        async fn is_valid(&self, handle: &mut TestConn) -> bool {
            !handle.broken
        }
    }

    async fn pool_of(size: usize) -> ConnectionPool<TestConnector> {
        ConnectionPool::connect(TestConnector::default(), PoolOptions::default().with_size(size))
            .await
            .unwrap()
    }

    fn assert_balanced(pool: &ConnectionPool<TestConnector>) {
        let status = pool.status();
        assert_eq!(status.available + status.checked_out, status.size);
    }

    // ───────────────────────────────────────────────────────────────
    // Construction
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn connect_opens_every_slot() {
        let pool = pool_of(5).await;
        assert_eq!(
            pool.status(),
            PoolStatus {
                size: 5,
                available: 5,
                checked_out: 0
            }
        );
        assert_eq!(pool.inner.connector.opened.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn connect_rejects_zero_size() {
        let result =
            ConnectionPool::connect(TestConnector::default(), PoolOptions::default().with_size(0))
                .await;
        assert!(matches!(result, Err(PoolError::InvalidSize)));
    }

    #[tokio::test]
    async fn connect_fails_when_backend_refuses() {
        let result = ConnectionPool::connect(
            TestConnector::failing_from(2),
            PoolOptions::default().with_size(3),
        )
        .await;
        assert!(matches!(result, Err(PoolError::Connect { slot: 2, .. })));
    }

    #[test]
    fn default_options() {
        let options = PoolOptions::default();
        assert_eq!(options.size, 5);
        assert!(options.test_on_acquire);
    }

    // ───────────────────────────────────────────────────────────────
    // Acquire / release
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn acquire_and_release_track_occupancy() {
        let pool = pool_of(3).await;

        let first = pool.acquire().await.unwrap();
        let second = pool.acquire().await.unwrap();
        assert_eq!(pool.status().checked_out, 2);
        assert_eq!(pool.status().available, 1);
        assert_balanced(&pool);

        first.release();
        assert_eq!(pool.status().checked_out, 1);
        assert_balanced(&pool);

        drop(second);
        assert_eq!(pool.status().available, 3);
        assert_balanced(&pool);
    }

    #[tokio::test]
    async fn handles_are_recycled_not_reopened() {
        let pool = pool_of(2).await;
        for _ in 0..10 {
            let handle = pool.acquire().await.unwrap();
            assert!(handle.serial < 2);
        }
        assert_eq!(pool.inner.connector.opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn size_handles_acquire_immediately_and_next_waits() {
        let pool = pool_of(3).await;

        let mut held = Vec::new();
        for _ in 0..3 {
            let handle = tokio::time::timeout(Duration::from_millis(100), pool.acquire())
                .await
                .expect("acquire within capacity must not wait")
                .unwrap();
            held.push(handle);
        }

        let blocked = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(blocked.is_err(), "acquire beyond capacity must wait");
        assert_balanced(&pool);

        held.pop();
        let unblocked = tokio::time::timeout(Duration::from_millis(100), pool.acquire()).await;
        assert!(unblocked.is_ok());
    }

    #[tokio::test]
    async fn waiter_wakes_on_release() {
        let pool = pool_of(1).await;
        let held = pool.acquire().await.unwrap();
        let held_slot = held.slot_id();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.map(|h| h.slot_id()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        held.release();
        let slot = waiter.await.unwrap().unwrap();
        assert_eq!(slot, held_slot);
    }

    #[tokio::test]
    async fn waiters_are_served_in_arrival_order() {
        let pool = pool_of(1).await;
        let held = pool.acquire().await.unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut waiters = Vec::new();
        for i in 0..3 {
            let pool = pool.clone();
            let order = Arc::clone(&order);
            waiters.push(tokio::spawn(async move {
                let handle = pool.acquire().await.unwrap();
                order.lock().unwrap().push(i);
                drop(handle);
            }));
            // Let each waiter enqueue before spawning the next.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        held.release();
        for waiter in waiters {
            waiter.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn handles_are_never_shared() {
        let pool = pool_of(3).await;
        let in_use = Arc::new(Mutex::new(HashSet::new()));

        let tasks: Vec<_> = (0..30)
            .map(|_| {
                let pool = pool.clone();
                let in_use = Arc::clone(&in_use);
                tokio::spawn(async move {
                    let handle = pool.acquire().await.unwrap();
                    let slot = handle.slot_id();
                    assert!(in_use.lock().unwrap().insert(slot), "slot {} lent twice", slot);
                    tokio::task::yield_now().await;
                    in_use.lock().unwrap().remove(&slot);
                    handle.release();
                })
            })
            .collect();

        for task in futures::future::join_all(tasks).await {
            task.unwrap();
        }
        assert_eq!(pool.status().available, 3);
    }

    #[tokio::test]
    async fn cancelled_acquire_does_not_leak() {
        let pool = pool_of(1).await;
        let held = pool.acquire().await.unwrap();

        let cancelled = tokio::time::timeout(Duration::from_millis(10), pool.acquire()).await;
        assert!(cancelled.is_err());

        held.release();
        assert_eq!(pool.status().available, 1);
        assert!(pool.acquire().await.is_ok());
    }

    // ───────────────────────────────────────────────────────────────
    // Closing
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn closed_pool_rejects_acquire() {
        let pool = pool_of(2).await;
        pool.close();
        assert!(pool.is_closed());
        assert!(matches!(pool.acquire().await, Err(PoolError::Closed)));
    }

    #[tokio::test]
    async fn close_fails_pending_waiters() {
        let pool = pool_of(1).await;
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        pool.close();
        assert!(matches!(waiter.await.unwrap(), Err(PoolError::Closed)));

        held.release();
        assert_eq!(pool.status().available, 1);
    }

    // ───────────────────────────────────────────────────────────────
    // Liveness checks
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn broken_handle_is_reopened_on_acquire() {
        let pool = pool_of(1).await;
        {
            let mut handle = pool.acquire().await.unwrap();
            handle.broken = true;
        }

        let handle = pool.acquire().await.unwrap();
        assert!(!handle.broken);
        assert_eq!(handle.serial, 1);
        assert_eq!(pool.inner.connector.opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn broken_handle_is_kept_when_checks_disabled() {
        let pool = ConnectionPool::connect(
            TestConnector::default(),
            PoolOptions::default().with_size(1).with_test_on_acquire(false),
        )
        .await
        .unwrap();
        {
            let mut handle = pool.acquire().await.unwrap();
            handle.broken = true;
        }

        let handle = pool.acquire().await.unwrap();
        assert!(handle.broken);
    }

    #[tokio::test]
    async fn failed_reconnect_still_hands_out_a_handle() {
        let pool = pool_of(1).await;
        {
            let mut handle = pool.acquire().await.unwrap();
            handle.broken = true;
        }
        pool.inner.connector.refuse_reconnect.store(true, Ordering::SeqCst);

        let handle = pool.acquire().await.unwrap();
        assert!(handle.broken);
        drop(handle);
        assert_eq!(pool.status().available, 1);
    }

    // ───────────────────────────────────────────────────────────────
    // Invariant
    // ───────────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn occupancy_always_balances(size in 1usize..6, ops in proptest::collection::vec(any::<(bool, u8)>(), 0..60)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let pool = pool_of(size).await;
                let mut held: Vec<PooledHandle<TestConnector>> = Vec::new();

                for (acquire, pick) in ops {
                    if acquire && pool.status().available > 0 {
                        held.push(pool.acquire().await.unwrap());
                    } else if !held.is_empty() {
                        let index = pick as usize % held.len();
                        held.swap_remove(index).release();
                    }

                    let status = pool.status();
                    prop_assert_eq!(status.available + status.checked_out, size);
                    prop_assert_eq!(status.checked_out, held.len());
                }
                Ok(())
            })?;
        }
    }
}
