//! Error taxonomy for credential acquisition and rotation.

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Everything that can go wrong while resolving AWS credentials.
///
/// Individual provider failures are usually *absorbed* by a
/// [`ChainCredentialProvider`](crate::provider::ChainCredentialProvider) rather than propagated;
/// see that type's docs for the propagation policy.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// No provider in a chain could supply credentials.
    #[error("no provider in the chain could supply credentials")]
    NoProvider,

    /// The chain terminated with an explicitly empty credential rather than failing outright.
    ///
    /// Reserved: the default chain terminator is [`Credential::anonymous`](crate::Credential::anonymous),
    /// which is a *success* carrying an empty credential, not this error. This variant exists for
    /// callers who configure a chain to fail instead of falling back to an empty credential.
    #[error("chain produced no usable credentials")]
    NoCredentials,

    /// The named profile does not exist in the parsed credentials file.
    #[error("profile `{0}` not found in credentials file")]
    MissingProfile(String),

    /// The profile is missing `aws_access_key_id`.
    #[error("profile is missing aws_access_key_id")]
    MissingAccessKeyId,

    /// The profile is missing `aws_secret_access_key`.
    #[error("profile is missing aws_secret_access_key")]
    MissingSecretAccessKey,

    /// A line in the credentials file is neither a section header nor a `key = value` pair.
    #[error("invalid syntax in credentials file: {0}")]
    InvalidCredentialFileSyntax(String),

    /// `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` is not set.
    #[error("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI is not set; ECS metadata service is unavailable")]
    NoECSMetaDataService,

    /// The IMDS role-name lookup did not return a usable role name.
    #[error("could not get instance role name from IMDS")]
    CouldNotGetInstanceRoleName,

    /// The IMDSv2 token request returned a 200 with an empty body.
    #[error("could not read IMDSv2 token from response")]
    CouldNotReadTokenFromResponse,

    /// The IMDSv2 token request returned an unexpected, non-200 status.
    #[error("unexpected status {0} from IMDSv2 token endpoint")]
    UnexpectedTokenResponseStatus(u16),

    /// A metadata endpoint returned 200 with an empty body.
    #[error("metadata endpoint returned an empty body")]
    MissingMetaData,

    /// The metadata response body could not be decoded as the expected JSON shape.
    #[error("failed to decode metadata response: {0}")]
    FailedToDecode(#[source] serde_json::Error),

    /// The HTTP step timed out.
    #[error("request to {0} timed out")]
    Timeout(String),

    /// The `HttpClient` collaborator failed in a way the core does not interpret further.
    #[error("http transport error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The credentials file could not be read from disk.
    #[error("failed to read credentials file `{path}`: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A refresh this call joined (rather than initiated) failed.
    ///
    /// [`RotatingCredentialProvider`](crate::provider::RotatingCredentialProvider) coalesces
    /// concurrent refreshes into one [`futures::future::Shared`] future, whose `Output` must be
    /// `Clone`; since `CredentialError` is not `Clone` (it wraps `std::io::Error` and boxed
    /// transport errors), joined callers observe the original failure's message instead of the
    /// original typed variant.
    #[error("shared credential refresh failed: {0}")]
    Shared(String),
}

impl CredentialError {
    /// Wrap an arbitrary transport error as [`CredentialError::Http`].
    pub fn http(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        CredentialError::Http(Box::new(err))
    }
}
