//! [`StaticCredentialProvider`] and the `Null` sentinel (spec §4.H, §4.I).

use super::CredentialProvider;
use crate::credential::Credential;
use crate::environment::{vars, Environment};
use crate::error::Result;
use crate::executor::Executor;
use async_trait::async_trait;

/// Always returns the same fixed [`Credential`] (spec §4.H).
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Wrap a fixed credential.
    pub fn new(credential: Credential) -> Self {
        StaticCredentialProvider { credential }
    }

    /// Build a credential directly from its parts.
    pub fn from_parts(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        StaticCredentialProvider::new(Credential::new(
            access_key_id,
            secret_access_key,
            session_token,
        ))
    }

    /// The deliberately empty credential used as the default chain terminator (spec §4.J).
    pub fn empty() -> Self {
        StaticCredentialProvider::new(Credential::anonymous())
    }

    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and optionally `AWS_SESSION_TOKEN` from
    /// the process environment. Returns `None` if either of the first two is absent (spec §4.H).
    pub fn from_environment() -> Option<Self> {
        let env = Environment::new();
        let access_key_id = env.lookup(vars::AWS_ACCESS_KEY_ID)?;
        let secret_access_key = env.lookup(vars::AWS_SECRET_ACCESS_KEY)?;
        let session_token = env.lookup(vars::AWS_SESSION_TOKEN);
        Some(StaticCredentialProvider::from_parts(
            access_key_id,
            secret_access_key,
            session_token,
        ))
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn get_credential(&self, _executor: &Executor) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}
