// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-flight gate for access-token refreshes.
//!
//! The gate is either `Idle` or `Refreshing`. The first caller to arrive
//! while idle becomes the trigger and runs the refresh; everyone arriving
//! while a refresh is outstanding waits for that same result instead of
//! starting their own. The gate returns to `Idle` as soon as the refresh
//! settles, whatever the outcome, and also if the trigger is dropped
//! mid-refresh.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use super::error::ApiError;

/// Published result of a refresh; `None` while still in flight.
type PendingRefresh = Option<Result<String, ApiError>>;

enum GateState {
    Idle,
    Refreshing(watch::Receiver<PendingRefresh>),
}

enum Role {
    Trigger(watch::Sender<PendingRefresh>),
    Follower(watch::Receiver<PendingRefresh>),
}

/// Ensures at most one token refresh is in flight.
pub struct RefreshGate {
    state: Mutex<GateState>,
    refreshes: AtomicU64,
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), GateState::Refreshing(_))
    }

    /// Number of refreshes this gate has started.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Obtain a fresh access token.
    ///
    /// `refresh` only runs if no refresh is currently outstanding; otherwise
    /// the caller shares the outstanding refresh's result. A failed refresh
    /// fails every caller waiting on it.
    pub async fn refresh<F, Fut>(&self, refresh: F) -> Result<String, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ApiError>>,
    {
        // Check-then-set under one lock; never held across an await.
        let role = {
            let mut state = self.lock();
            match &*state {
                GateState::Refreshing(rx) => Role::Follower(rx.clone()),
                GateState::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = GateState::Refreshing(rx);
                    Role::Trigger(tx)
                }
            }
        };

        match role {
            Role::Trigger(tx) => {
                let settle = SettleOnDrop { gate: self };
                let n = self.refreshes.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::info!(refresh = n, "Refreshing access token");

                let result = refresh().await;
                drop(settle);

                match &result {
                    Ok(_) => tracing::info!(refresh = n, "Access token refreshed"),
                    Err(e) => tracing::warn!(refresh = n, error = %e, "Access token refresh failed"),
                }

                // Followers may all have gone away; nothing to do then.
                let _ = tx.send(Some(result.clone()));
                result
            }
            Role::Follower(mut rx) => {
                tracing::debug!("Refresh already in flight, waiting for its result");
                match rx.wait_for(Option::is_some).await {
                    Ok(settled) => (*settled).clone().unwrap_or_else(|| Err(abandoned())),
                    Err(_) => Err(abandoned()),
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Puts the gate back to `Idle` when the trigger finishes or is dropped.
struct SettleOnDrop<'a> {
    gate: &'a RefreshGate,
}

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        *self.gate.lock() = GateState::Idle;
    }
}

fn abandoned() -> ApiError {
    ApiError::named(
        "REFRESH_ABANDONED",
        "Token refresh was cancelled before completing",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ErrorCode;
    use std::sync::Arc;
    use std::time::Duration;

    async fn slow_refresh(calls: &AtomicU64, token: &str) -> Result<String, ApiError> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(token.to_string())
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let gate = RefreshGate::new();
        let calls = AtomicU64::new(0);

        let (a, b, c) = tokio::join!(
            gate.refresh(|| slow_refresh(&calls, "token-1")),
            gate.refresh(|| slow_refresh(&calls, "token-2")),
            gate.refresh(|| slow_refresh(&calls, "token-3")),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap(), "token-1");
        assert_eq!(b.unwrap(), "token-1");
        assert_eq!(c.unwrap(), "token-1");
        assert_eq!(gate.refresh_count(), 1);
        assert!(!gate.is_refreshing());
    }

    #[tokio::test]
    async fn test_gate_resets_after_success() {
        let gate = RefreshGate::new();
        let calls = AtomicU64::new(0);

        let first = gate.refresh(|| slow_refresh(&calls, "token-1")).await;
        let second = gate.refresh(|| slow_refresh(&calls, "token-2")).await;

        assert_eq!(first.unwrap(), "token-1");
        assert_eq!(second.unwrap(), "token-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_reaches_all_waiters_and_resets() {
        let gate = RefreshGate::new();
        let calls = AtomicU64::new(0);

        let failing = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err::<String, _>(ApiError::named("REFRESH_FAILED", "refresh rejected"))
        };

        let (a, b) = tokio::join!(gate.refresh(failing), gate.refresh(failing));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap_err().message, "refresh rejected");
        assert_eq!(b.unwrap_err().message, "refresh rejected");
        assert!(!gate.is_refreshing());

        let next = gate.refresh(|| slow_refresh(&calls, "token-ok")).await;
        assert_eq!(next.unwrap(), "token-ok");
    }

    #[tokio::test]
    async fn test_cancelled_trigger_releases_followers() {
        let gate = Arc::new(RefreshGate::new());

        let trigger = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.refresh(|| std::future::pending::<Result<String, ApiError>>())
                    .await
            })
        };

        while !gate.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let follower = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.refresh(|| async { Ok("unused".to_string()) }).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        trigger.abort();
        let err = follower.await.unwrap().unwrap_err();
        assert_eq!(err.code, ErrorCode::Named("REFRESH_ABANDONED".to_string()));
        assert!(!gate.is_refreshing());
    }
}
