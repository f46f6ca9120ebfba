//! File-backed provider (spec §4.L): parses the AWS shared-credentials file on demand.
//!
//! All I/O happens on a blocking thread; callers typically wrap this provider in
//! [`DeferredCredentialProvider`](super::DeferredCredentialProvider) so that blocking happens at
//! most once.

use super::CredentialProvider;
use crate::credential::Credential;
use crate::environment::{vars, Environment};
use crate::error::{CredentialError, Result};
use crate::executor::Executor;
use crate::ini;
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads and parses the AWS shared-credentials file, looking up a single profile.
///
/// The path defaults to `~/.aws/credentials`, overridable by `AWS_SHARED_CREDENTIALS_FILE`; the
/// profile defaults to `AWS_PROFILE`, falling back to `"default"` (spec §4.L, §6).
#[derive(Debug, Clone, Default)]
pub struct FileCredentialProvider {
    path: Option<PathBuf>,
    profile: Option<String>,
}

impl FileCredentialProvider {
    /// Use the default path (`~/.aws/credentials` or `AWS_SHARED_CREDENTIALS_FILE`) and default
    /// profile (`AWS_PROFILE` or `"default"`).
    pub fn new() -> Self {
        FileCredentialProvider::default()
    }

    /// Override the credentials file path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Override the profile name.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    fn resolve_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        let env = Environment::new();
        if let Some(path) = env.lookup(vars::AWS_SHARED_CREDENTIALS_FILE) {
            return ini::expand_tilde(&path);
        }
        ini::expand_tilde("~/.aws/credentials")
    }

    fn resolve_profile(&self) -> String {
        if let Some(profile) = &self.profile {
            return profile.clone();
        }
        Environment::new()
            .lookup(vars::AWS_PROFILE)
            .unwrap_or_else(|| "default".to_string())
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn get_credential(&self, _executor: &Executor) -> Result<Credential> {
        let path = self.resolve_path();
        let profile = self.resolve_profile();

        let read_path = path.clone();
        let bytes = tokio::task::spawn_blocking(move || std::fs::read(&read_path))
            .await
            .expect("blocking file read task panicked")
            .map_err(|source| CredentialError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let profiles = ini::parse(&bytes)?;
        let (access_key_id, secret_access_key, session_token) =
            ini::lookup_profile(&profiles, &profile)?;

        Ok(Credential::new(
            access_key_id,
            secret_access_key,
            session_token.map(str::to_string),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rt() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("runtime")
    }

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn happy_path_reads_default_profile() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        let file = write_fixture(
            "[default]\naws_access_key_id = AWSACCESSKEYID\naws_secret_access_key = AWSSECRETACCESSKEY\n",
        );
        let provider = FileCredentialProvider::new().with_path(file.path());

        let cred = rt
            .block_on(provider.get_credential(&rt.handle().clone()))
            .expect("must succeed");
        assert_eq!(cred.access_key_id(), "AWSACCESSKEYID");
        assert_eq!(cred.secret_access_key(), "AWSSECRETACCESSKEY");
        assert_eq!(cred.session_token(), None);
    }

    #[test]
    fn missing_profile_fails() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        let file = write_fixture(
            "[default]\naws_access_key_id = AK\naws_secret_access_key = SK\n",
        );
        let provider = FileCredentialProvider::new()
            .with_path(file.path())
            .with_profile("other");

        let err = rt
            .block_on(provider.get_credential(&rt.handle().clone()))
            .unwrap_err();
        assert!(matches!(err, CredentialError::MissingProfile(name) if name == "other"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        let provider =
            FileCredentialProvider::new().with_path("/nonexistent/path/to/credentials");

        let err = rt
            .block_on(provider.get_credential(&rt.handle().clone()))
            .unwrap_err();
        assert!(matches!(err, CredentialError::Io { .. }));
    }

    #[test]
    fn profile_defaults_to_aws_profile_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        let file = write_fixture(
            "[prod]\naws_access_key_id = PRODKEY\naws_secret_access_key = PRODSECRET\naws_session_token = PRODTOKEN\n",
        );
        temp_env::with_var(vars::AWS_PROFILE, Some("prod"), || {
            let provider = FileCredentialProvider::new().with_path(file.path());
            let cred = rt
                .block_on(provider.get_credential(&rt.handle().clone()))
                .expect("must succeed");
            assert_eq!(cred.access_key_id(), "PRODKEY");
            assert_eq!(cred.session_token(), Some("PRODTOKEN"));
        });
    }
}
