//! [`CredentialProviderFactory`]: a one-shot builder that captures a closure over
//! [`ProviderContext`] (spec §4.K).
//!
//! Named constructors exist for every provider the default chain can select; `custom` lets a
//! caller splice in anything else that implements [`CredentialProvider`].

use crate::context::ProviderContext;
use crate::environment::{vars, Environment};
use crate::metadata::{EcsMetadataClient, ImdsMetadataClient, MetadataCredentialProvider};
use crate::provider::{
    ChainCredentialProvider, CredentialProvider, DeferredCredentialProvider, FileCredentialProvider,
    NullCredentialProvider, RotatingCredentialProvider, StaticCredentialProvider,
};
use std::path::PathBuf;
use std::sync::Arc;

type Builder = Arc<dyn Fn(&ProviderContext) -> Arc<dyn CredentialProvider> + Send + Sync>;

/// Captures `(ProviderContext) -> Arc<dyn CredentialProvider>`, deferring actual provider
/// construction until a [`ChainCredentialProvider`] (or any other caller) is ready to invoke it.
#[derive(Clone)]
pub struct CredentialProviderFactory {
    name: &'static str,
    builder: Builder,
}

impl std::fmt::Debug for CredentialProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProviderFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CredentialProviderFactory {
    /// The factory's name, used only for logging (spec §4.J chain trace).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build the provider this factory describes.
    pub fn create(&self, ctx: &ProviderContext) -> Arc<dyn CredentialProvider> {
        (self.builder)(ctx)
    }

    /// A user-supplied builder.
    pub fn custom(
        name: &'static str,
        builder: impl Fn(&ProviderContext) -> Arc<dyn CredentialProvider> + Send + Sync + 'static,
    ) -> Self {
        CredentialProviderFactory {
            name,
            builder: Arc::new(builder),
        }
    }

    /// Fixed credential strings, supplied directly rather than read from the environment or a
    /// file.
    pub fn static_credential(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        CredentialProviderFactory::custom("static", move |_ctx| {
            Arc::new(StaticCredentialProvider::from_parts(
                access_key_id.clone(),
                secret_access_key.clone(),
                session_token.clone(),
            )) as Arc<dyn CredentialProvider>
        })
    }

    /// `StaticCredentialProvider::from_environment()`, or [`NullCredentialProvider`] if the
    /// required environment variables are absent.
    pub fn environment() -> Self {
        CredentialProviderFactory::custom("environment", |_ctx| {
            match StaticCredentialProvider::from_environment() {
                Some(provider) => Arc::new(provider) as Arc<dyn CredentialProvider>,
                None => Arc::new(NullCredentialProvider::new()) as Arc<dyn CredentialProvider>,
            }
        })
    }

    /// An ECS metadata client wrapped in [`RotatingCredentialProvider`]; [`NullCredentialProvider`]
    /// if `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` is unset. The wrapped provider is eagerly
    /// prefetched so the first real `get_credential` call usually finds a cached value instead of
    /// blocking on the metadata round trip.
    pub fn ecs() -> Self {
        CredentialProviderFactory::custom("ecs", |ctx| {
            let client = EcsMetadataClient::new();
            if !client.is_active() {
                return Arc::new(NullCredentialProvider::new()) as Arc<dyn CredentialProvider>;
            }
            let metadata = MetadataCredentialProvider::new(client, ctx.clone());
            let provider = Arc::new(RotatingCredentialProvider::new(Arc::new(metadata)));
            provider.prefetch(ctx.executor());
            provider as Arc<dyn CredentialProvider>
        })
    }

    /// An IMDS client wrapped in [`RotatingCredentialProvider`], prefetched the same way as
    /// [`CredentialProviderFactory::ecs`].
    pub fn ec2() -> Self {
        CredentialProviderFactory::custom("ec2", |ctx| {
            let metadata =
                MetadataCredentialProvider::new(ImdsMetadataClient::new(), ctx.clone());
            let provider = Arc::new(RotatingCredentialProvider::new(Arc::new(metadata)));
            provider.prefetch(ctx.executor());
            provider as Arc<dyn CredentialProvider>
        })
    }

    /// A shared-credentials-file provider wrapped in [`DeferredCredentialProvider`]. `path`
    /// defaults to `~/.aws/credentials` (or `AWS_SHARED_CREDENTIALS_FILE`); `profile` defaults to
    /// `AWS_PROFILE`, falling back to `"default"`.
    pub fn config_file(path: Option<PathBuf>, profile: Option<String>) -> Self {
        CredentialProviderFactory::custom("config_file", move |ctx| {
            let mut file_provider = FileCredentialProvider::new();
            if let Some(path) = &path {
                file_provider = file_provider.with_path(path.clone());
            }
            if let Some(profile) = &profile {
                file_provider = file_provider.with_profile(profile.clone());
            } else if let Some(profile) = Environment::new().lookup(vars::AWS_PROFILE) {
                file_provider = file_provider.with_profile(profile);
            }
            Arc::new(DeferredCredentialProvider::new(Arc::new(file_provider), ctx))
                as Arc<dyn CredentialProvider>
        })
    }

    /// The deliberately empty static credential used as the default chain terminator
    /// (spec §4.J, §9).
    pub fn empty() -> Self {
        CredentialProviderFactory::custom("empty", |_ctx| {
            Arc::new(StaticCredentialProvider::empty()) as Arc<dyn CredentialProvider>
        })
    }

    /// [`NullCredentialProvider`], used to force a chain to fail instead of terminating on
    /// `empty` (spec §9 open question).
    pub fn null() -> Self {
        CredentialProviderFactory::custom("null", |_ctx| {
            Arc::new(NullCredentialProvider::new()) as Arc<dyn CredentialProvider>
        })
    }
}

#[allow(unused)]
fn _assert_chain_factory_exists() {
    let _ = |factories: Vec<CredentialProviderFactory>, ctx: ProviderContext| {
        ChainCredentialProvider::new(factories, ctx)
    };
}
