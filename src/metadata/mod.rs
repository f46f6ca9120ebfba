//! `MetadataClient` trait and its ECS / IMDS implementations (spec §4.E).

mod ecs;
mod imds;

pub use ecs::EcsMetadataClient;
pub use imds::ImdsMetadataClient;

use crate::context::ProviderContext;
use crate::credential::Credential;
use crate::error::Result;
use crate::provider::CredentialProvider;
use async_trait::async_trait;

/// Produces a [`Credential`] from a remote metadata endpoint's JSON document.
///
/// This is a narrower trait than [`CredentialProvider`]: it names the metadata-endpoint-specific
/// contract (spec §4.E), while [`MetadataCredentialProvider`] adapts any implementation into the
/// uniform provider interface the rest of the crate composes over.
#[async_trait]
pub trait MetadataClient: Send + Sync + std::fmt::Debug {
    /// Fetch a credential from the metadata endpoint.
    async fn get_metadata(&self, ctx: &ProviderContext) -> Result<Credential>;
}

/// Adapts any [`MetadataClient`] into a [`CredentialProvider`].
#[derive(Debug, Clone)]
pub struct MetadataCredentialProvider<M> {
    client: M,
    ctx: ProviderContext,
}

impl<M: MetadataClient> MetadataCredentialProvider<M> {
    /// Wrap `client`, using `ctx` for every `get_metadata` call.
    pub fn new(client: M, ctx: ProviderContext) -> Self {
        MetadataCredentialProvider { client, ctx }
    }
}

#[async_trait]
impl<M: MetadataClient> CredentialProvider for MetadataCredentialProvider<M> {
    async fn get_credential(&self, _executor: &crate::executor::Executor) -> Result<Credential> {
        self.client.get_metadata(&self.ctx).await
    }
}

/// Parse the AWS metadata date format `yyyy-MM-dd'T'HH:mm:ss'Z'` (always UTC).
pub(crate) fn parse_metadata_timestamp(
    value: &str,
) -> std::result::Result<chrono::DateTime<chrono::Utc>, chrono::ParseError> {
    chrono::DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&chrono::Utc))
}
