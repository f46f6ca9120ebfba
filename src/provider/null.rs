//! [`NullCredentialProvider`]: a sentinel used in place of `Option<Provider>` (spec §4.I).

use super::CredentialProvider;
use crate::credential::Credential;
use crate::error::{CredentialError, Result};
use crate::executor::Executor;
use async_trait::async_trait;

/// Always fails with [`CredentialError::NoProvider`].
///
/// Used wherever the crate would otherwise need an `Option<Box<dyn CredentialProvider>>`, keeping
/// every provider slot a plain trait object (spec §9: "no inheritance, pure composition").
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCredentialProvider;

impl NullCredentialProvider {
    /// Construct the sentinel provider.
    pub fn new() -> Self {
        NullCredentialProvider
    }
}

#[async_trait]
impl CredentialProvider for NullCredentialProvider {
    async fn get_credential(&self, _executor: &Executor) -> Result<Credential> {
        Err(CredentialError::NoProvider)
    }
}
