//! [`ChainCredentialProvider`]: tries providers in order, commits to the first that succeeds
//! (spec §4.J).

use super::{CredentialProvider, NullCredentialProvider, StaticCredentialProvider};
use crate::context::{ProviderContext, LOG_TARGET};
use crate::credential::Credential;
use crate::error::{CredentialError, Result};
use crate::executor::{hop, Executor};
use crate::factory::CredentialProviderFactory;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex};

type SharedResult = std::result::Result<Arc<dyn CredentialProvider>, Arc<CredentialError>>;

/// Tries a list of [`CredentialProviderFactory`] entries in order at construction time; the first
/// produced provider that successfully returns a credential is locked in as the chain's
/// `internal_provider` and serves every subsequent call without re-scanning the list (spec §3,
/// §4.J, §8 invariant 4).
pub struct ChainCredentialProvider {
    startup: Shared<BoxFuture<'static, SharedResult>>,
    internal: Arc<Mutex<Option<Arc<dyn CredentialProvider>>>>,
}

impl std::fmt::Debug for ChainCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainCredentialProvider")
            .field(
                "committed",
                &self.internal.lock().expect("lock poisoned").is_some(),
            )
            .finish_non_exhaustive()
    }
}

impl ChainCredentialProvider {
    /// Build a chain from an explicit, ordered list of factories, beginning the search
    /// immediately on `ctx`'s executor.
    pub fn new(factories: Vec<CredentialProviderFactory>, ctx: ProviderContext) -> Self {
        let internal = Arc::new(Mutex::new(None));
        let internal_for_fetch = Arc::clone(&internal);

        let fut: BoxFuture<'static, SharedResult> = async move {
            for factory in factories {
                let provider = factory.create(&ctx);
                log::debug!(target: LOG_TARGET, "chain trying provider `{}`", factory.name());
                match provider.get_credential(ctx.executor()).await {
                    Ok(_) => {
                        log::debug!(target: LOG_TARGET, "chain committed to provider `{}`", factory.name());
                        *internal_for_fetch.lock().expect("lock poisoned") = Some(Arc::clone(&provider));
                        return Ok(provider);
                    }
                    Err(e) => {
                        log::debug!(
                            target: LOG_TARGET,
                            "chain provider `{}` failed, trying next: {e}",
                            factory.name()
                        );
                    }
                }
            }
            Err(Arc::new(CredentialError::NoProvider))
        }
        .boxed();

        let startup = fut.shared();
        let driver = startup.clone();
        ctx.executor().spawn(async move {
            let _ = driver.await;
        });

        ChainCredentialProvider { startup, internal }
    }

    /// The default provider search order (spec §4.J):
    /// environment, ECS, EC2 IMDS, shared-credentials file, then a static empty terminator — on
    /// Linux-like systems. Elsewhere, ECS and EC2 IMDS are skipped since they assume a Linux
    /// container/instance environment.
    pub fn default_chain(ctx: ProviderContext) -> Self {
        ChainCredentialProvider::new(Self::default_factories(), ctx)
    }

    fn default_factories() -> Vec<CredentialProviderFactory> {
        if cfg!(target_os = "linux") {
            vec![
                CredentialProviderFactory::environment(),
                CredentialProviderFactory::ecs(),
                CredentialProviderFactory::ec2(),
                CredentialProviderFactory::config_file(None, None),
                CredentialProviderFactory::empty(),
            ]
        } else {
            vec![
                CredentialProviderFactory::environment(),
                CredentialProviderFactory::config_file(None, None),
                CredentialProviderFactory::empty(),
            ]
        }
    }
}

#[async_trait]
impl CredentialProvider for ChainCredentialProvider {
    async fn get_credential(&self, executor: &Executor) -> Result<Credential> {
        let committed = self.internal.lock().expect("lock poisoned").clone();
        let provider = match committed {
            Some(provider) => provider,
            None => {
                let startup = self.startup.clone();
                hop(executor, async move { startup.await })
                    .await
                    .map_err(|_| CredentialError::NoProvider)?
            }
        };
        provider.get_credential(executor).await
    }

    async fn shutdown(&self) {
        let startup = self.startup.clone();
        let _ = startup.await;
        let provider = self.internal.lock().expect("lock poisoned").clone();
        if let Some(provider) = provider {
            provider.shutdown().await;
        }
    }
}

/// `Null`-terminated chain: replaces the default `empty` terminator with
/// [`NullCredentialProvider`], so an exhausted chain fails instead of producing a signable-skip
/// empty credential. Either terminator is spec-conformant (spec §9 open question); this crate
/// defaults to `empty` and exposes this constructor for callers who want the stricter behavior.
pub fn null_terminated(mut factories: Vec<CredentialProviderFactory>) -> Vec<CredentialProviderFactory> {
    if matches!(factories.last(), Some(f) if f.name() == "empty") {
        factories.pop();
        factories.push(CredentialProviderFactory::null());
    }
    factories
}

#[allow(unused)]
fn _assert_terminators_exist() {
    let _ = StaticCredentialProvider::empty();
    let _ = NullCredentialProvider::new();
}
