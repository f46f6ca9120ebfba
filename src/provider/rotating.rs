//! [`RotatingCredentialProvider`]: expiration-aware caching with single-flight refresh
//! (spec §4.F).

use super::CredentialProvider;
use crate::clock::{Clock, SystemClock};
use crate::credential::Credential;
use crate::error::{CredentialError, Result};
use crate::executor::{hop, Executor};
use async_trait::async_trait;
use chrono::Duration;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex};

/// Default floor below which a cached credential is treated as expiring (spec §4.F).
pub const DEFAULT_MIN_REMAINING_LIFETIME: Duration = Duration::minutes(3);

// Joiners need a `Clone` output from the `Shared` future, but `CredentialError` isn't `Clone`
// (it wraps `std::io::Error` and a boxed transport error). Rather than `Arc`-wrap the error for
// everyone, the future feeding `Shared` resolves to a stringified error for joiners only; the
// caller that actually *initiates* the refresh never goes through this type and gets the
// original, typed `CredentialError` back untouched (spec §7: "surfaces inner errors unchanged").
type SharedResult = std::result::Result<Credential, String>;
type InFlight = Shared<BoxFuture<'static, SharedResult>>;

#[derive(Default)]
struct State {
    credential: Option<Credential>,
    in_flight: Option<InFlight>,
}

/// Wraps an inner provider (typically a metadata client) as an expiration-aware, single-flight
/// cache.
///
/// Concurrent callers that both observe an expiring (or absent) cached credential coalesce onto
/// one call to the inner provider; see spec §4.F and §8 invariant 2.
pub struct RotatingCredentialProvider {
    inner: Arc<dyn CredentialProvider>,
    state: Arc<Mutex<State>>,
    min_remaining_lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RotatingCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingCredentialProvider")
            .field("min_remaining_lifetime", &self.min_remaining_lifetime)
            .finish_non_exhaustive()
    }
}

impl RotatingCredentialProvider {
    /// Wrap `inner`, using the default 3-minute remaining-lifetime floor and the real clock.
    pub fn new(inner: Arc<dyn CredentialProvider>) -> Self {
        RotatingCredentialProvider {
            inner,
            state: Arc::new(Mutex::new(State::default())),
            min_remaining_lifetime: DEFAULT_MIN_REMAINING_LIFETIME,
            clock: Arc::new(SystemClock),
        }
    }

    /// Override the remaining-lifetime floor that triggers a refresh.
    pub fn with_min_remaining_lifetime(mut self, min_remaining_lifetime: Duration) -> Self {
        self.min_remaining_lifetime = min_remaining_lifetime;
        self
    }

    /// Override the time source (tests substitute a [`crate::clock::TestClock`]).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Schedule an eager refresh on `executor`, without waiting for it. Callers of
    /// `get_credential` before it completes join the same in-flight future (spec §4.F,
    /// pre-fetch variant).
    pub fn prefetch(self: &Arc<Self>, executor: &Executor) {
        let this = Arc::clone(self);
        let executor = executor.clone();
        executor.spawn(async move {
            let _ = this.refresh(&executor).await;
        });
    }

    fn cached(&self) -> Option<Credential> {
        let state = self.state.lock().expect("lock poisoned");
        state.credential.clone()
    }

    /// Run (or join) a single refresh epoch.
    ///
    /// Exactly one caller per epoch becomes the *initiator*: it performs the inner fetch itself,
    /// under a single mutex-guarded decision, and returns that fetch's result untouched. Every
    /// other overlapping caller becomes a *joiner*: it awaits the initiator's completion via a
    /// `futures::future::Shared` future fed by a one-shot channel, and on failure sees
    /// `CredentialError::Shared` instead of the original typed error (spec §9's
    /// single-flight design note, spec §7).
    async fn refresh(&self, executor: &Executor) -> Result<Credential> {
        enum Role {
            Join(InFlight),
            Initiate(tokio::sync::oneshot::Sender<SharedResult>),
        }

        let role = {
            let mut state = self.state.lock().expect("lock poisoned");
            if let Some(shared) = &state.in_flight {
                Role::Join(shared.clone())
            } else {
                let (tx, rx) = tokio::sync::oneshot::channel::<SharedResult>();
                let fut: BoxFuture<'static, SharedResult> = async move {
                    rx.await
                        .unwrap_or_else(|_| Err("refresh task dropped".to_string()))
                }
                .boxed();
                state.in_flight = Some(fut.shared());
                Role::Initiate(tx)
            }
        };

        match role {
            Role::Join(shared) => {
                // Resolve on the caller's executor regardless of which runtime drives the
                // underlying fetch (spec §5: every `get_credential` future resolves on the
                // requested executor).
                hop(executor, async move { shared.await })
                    .await
                    .map_err(CredentialError::Shared)
            }
            Role::Initiate(tx) => {
                let inner = Arc::clone(&self.inner);
                let state_slot = Arc::clone(&self.state);
                let inner_executor = executor.clone();
                hop(executor, async move {
                    let result = inner.get_credential(&inner_executor).await;

                    {
                        let mut state = state_slot.lock().expect("lock poisoned");
                        state.in_flight = None;
                        if let Ok(cred) = &result {
                            state.credential = Some(cred.clone());
                        }
                    }

                    let broadcast: SharedResult = match &result {
                        Ok(cred) => Ok(cred.clone()),
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = tx.send(broadcast);

                    result
                })
                .await
            }
        }
    }
}

#[async_trait]
impl CredentialProvider for RotatingCredentialProvider {
    async fn get_credential(&self, executor: &Executor) -> Result<Credential> {
        if let Some(cred) = self.cached() {
            if !cred.is_expiring_at(self.clock.now(), self.min_remaining_lifetime) {
                return Ok(cred);
            }
        }
        self.refresh(executor).await
    }

    async fn shutdown(&self) {
        let shared = {
            let state = self.state.lock().expect("lock poisoned");
            state.in_flight.clone()
        };
        if let Some(shared) = shared {
            let _ = shared.await;
        }
    }
}
