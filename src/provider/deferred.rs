//! [`DeferredCredentialProvider`]: turns a slow one-shot provider into a hot cache (spec §4.G).

use super::CredentialProvider;
use crate::context::ProviderContext;
use crate::credential::Credential;
use crate::error::{CredentialError, Result};
use crate::executor::{hop, Executor};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex};

type SharedResult = std::result::Result<Credential, Arc<CredentialError>>;

/// Wraps a slow one-shot provider (a file read, a metadata discovery) behind a memoized future.
///
/// The wrapped provider's `get_credential` is invoked at construction time, at most once
/// successfully; every subsequent call — whether before or after that fetch completes — observes
/// the same resolution (spec §3 invariant, §4.G).
pub struct DeferredCredentialProvider {
    startup: Shared<BoxFuture<'static, SharedResult>>,
    resolved: Arc<Mutex<Option<Credential>>>,
    inner: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for DeferredCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredCredentialProvider")
            .finish_non_exhaustive()
    }
}

impl DeferredCredentialProvider {
    /// Wrap `inner`, immediately kicking off its `get_credential` on `ctx`'s executor.
    pub fn new(inner: Arc<dyn CredentialProvider>, ctx: &ProviderContext) -> Self {
        let resolved = Arc::new(Mutex::new(None));
        let executor = ctx.executor().clone();
        let inner_for_fetch = Arc::clone(&inner);
        let resolved_for_fetch = Arc::clone(&resolved);

        let fut: BoxFuture<'static, SharedResult> = async move {
            match inner_for_fetch.get_credential(&executor).await {
                Ok(cred) => {
                    *resolved_for_fetch.lock().expect("lock poisoned") = Some(cred.clone());
                    Ok(cred)
                }
                Err(e) => {
                    // Flattened deliberately: callers should not need to match on the wrapped
                    // provider's transport/parsing error shape (spec §4.G, §7).
                    log::warn!(
                        target: crate::context::LOG_TARGET,
                        "deferred provider's inner fetch failed, reporting NoProvider: {e}"
                    );
                    Err(Arc::new(CredentialError::NoProvider))
                }
            }
        }
        .boxed();

        let startup = fut.shared();
        let driver = startup.clone();
        ctx.executor().spawn(async move {
            let _ = driver.await;
        });

        DeferredCredentialProvider {
            startup,
            resolved,
            inner,
        }
    }
}

#[async_trait]
impl CredentialProvider for DeferredCredentialProvider {
    async fn get_credential(&self, executor: &Executor) -> Result<Credential> {
        if let Some(cred) = self.resolved.lock().expect("lock poisoned").clone() {
            return Ok(cred);
        }

        let startup = self.startup.clone();
        hop(executor, async move { startup.await })
            .await
            .map_err(|_| CredentialError::NoProvider)
    }

    async fn shutdown(&self) {
        let startup = self.startup.clone();
        let _ = startup.await;
        self.inner.shutdown().await;
    }
}
