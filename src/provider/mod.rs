//! Provider polymorphism (spec §9): one async trait, no inheritance, composition only.

mod chain;
mod deferred;
mod file;
mod null;
mod rotating;
mod static_provider;

pub use chain::{null_terminated, ChainCredentialProvider};
pub use deferred::DeferredCredentialProvider;
pub use file::FileCredentialProvider;
pub use null::NullCredentialProvider;
pub use rotating::RotatingCredentialProvider;
pub use static_provider::StaticCredentialProvider;

use crate::credential::Credential;
use crate::error::Result;
use crate::executor::Executor;
use async_trait::async_trait;

/// A source of AWS credentials.
///
/// Implementations: [`StaticCredentialProvider`], [`NullCredentialProvider`],
/// [`RotatingCredentialProvider`], [`DeferredCredentialProvider`], [`ChainCredentialProvider`],
/// and the metadata-backed providers in [`crate::metadata`]. No inheritance; providers compose
/// by wrapping one another.
#[async_trait]
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    /// Resolve a credential, with the returned future resolving on `executor` (spec §5).
    async fn get_credential(&self, executor: &Executor) -> Result<Credential>;

    /// Release any held resources, waiting for in-flight work to settle first.
    ///
    /// The default implementation is a no-op; providers that own in-flight futures or inner
    /// providers (namely [`DeferredCredentialProvider`] and [`ChainCredentialProvider`]) override
    /// it to wait on startup before forwarding shutdown.
    async fn shutdown(&self) {}
}
