//! Credential acquisition and rotation core for an AWS SDK runtime.
//!
//! This crate obtains valid AWS SigV4 credentials on behalf of request signers, from one of
//! several possible sources, under concurrent load, while honoring expiration and minimizing
//! work. See the module docs on [`provider`] for the composition model.
//!
//! Request/response encoding, SigV4 signing itself, the middleware chain, and service model
//! shapes are out of scope; this crate only supplies credentials to whatever signs with them.

pub mod clock;
pub mod context;
pub mod credential;
pub mod environment;
pub mod error;
pub mod executor;
pub mod factory;
pub mod http_client;
pub mod ini;
pub mod metadata;
pub mod provider;

pub use clock::{Clock, SystemClock};
pub use context::ProviderContext;
pub use credential::Credential;
pub use environment::Environment;
pub use error::{CredentialError, Result};
pub use executor::Executor;
pub use factory::CredentialProviderFactory;
pub use http_client::HttpClient;
pub use metadata::{EcsMetadataClient, ImdsMetadataClient, MetadataClient};
pub use provider::{
    ChainCredentialProvider, CredentialProvider, DeferredCredentialProvider, FileCredentialProvider,
    NullCredentialProvider, RotatingCredentialProvider, StaticCredentialProvider,
};

#[cfg(feature = "reqwest-client")]
pub use http_client::ReqwestHttpClient;
