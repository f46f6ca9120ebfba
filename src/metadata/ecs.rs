use super::{parse_metadata_timestamp, MetadataClient};
use crate::context::{ProviderContext, LOG_TARGET};
use crate::credential::Credential;
use crate::environment::{vars, Environment};
use crate::error::{CredentialError, Result};
use crate::http_client::Request;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const ECS_ENDPOINT: &str = "http://169.254.170.2";
const ECS_TIMEOUT: Duration = Duration::from_secs(2);

/// Fetches credentials from the ECS container credentials endpoint (spec §4.E).
///
/// Active iff `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` is set; the endpoint is
/// `http://169.254.170.2` plus that relative URI.
#[derive(Debug, Clone, Default)]
pub struct EcsMetadataClient {
    environment: Environment,
}

impl EcsMetadataClient {
    /// Construct a new ECS metadata client.
    pub fn new() -> Self {
        EcsMetadataClient {
            environment: Environment::new(),
        }
    }

    /// True iff the environment currently enables this client.
    pub fn is_active(&self) -> bool {
        self.environment
            .lookup(vars::AWS_CONTAINER_CREDENTIALS_RELATIVE_URI)
            .is_some()
    }
}

#[async_trait]
impl MetadataClient for EcsMetadataClient {
    async fn get_metadata(&self, ctx: &ProviderContext) -> Result<Credential> {
        let relative_uri = self
            .environment
            .lookup(vars::AWS_CONTAINER_CREDENTIALS_RELATIVE_URI)
            .ok_or(CredentialError::NoECSMetaDataService)?;

        let url = format!("{ECS_ENDPOINT}{relative_uri}");
        log::debug!(target: LOG_TARGET, "fetching ECS container credentials from {url}");

        let resp = ctx
            .http_client()
            .execute(Request::get(&url), ECS_TIMEOUT, ctx.executor())
            .await?;

        if resp.body.is_empty() {
            return Err(CredentialError::MissingMetaData);
        }

        let doc: EcsCredentialsDocument =
            serde_json::from_slice(&resp.body).map_err(CredentialError::FailedToDecode)?;

        let expiration = parse_metadata_timestamp(&doc.expiration).ok();

        let mut cred = Credential::new(doc.access_key_id, doc.secret_access_key, Some(doc.token));
        if let Some(expiration) = expiration {
            cred = cred.with_expiration(expiration);
        }
        Ok(cred)
    }
}

#[derive(Debug, Deserialize)]
struct EcsCredentialsDocument {
    #[serde(rename = "AccessKeyId")]
    access_key_id: String,
    #[serde(rename = "SecretAccessKey")]
    secret_access_key: String,
    #[serde(rename = "Token")]
    token: String,
    #[serde(rename = "Expiration")]
    expiration: String,
    #[allow(dead_code)]
    #[serde(rename = "RoleArn", default)]
    role_arn: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use crate::http_client::mock::{ok_response, MockHttpClient, Script};
    use std::sync::Arc;

    fn ctx_with(client: MockHttpClient, executor: Executor) -> ProviderContext {
        ProviderContext::new(Arc::new(client), executor)
    }

    fn rt() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("runtime")
    }

    #[test]
    fn inactive_without_env_var() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        temp_env::with_var_unset(vars::AWS_CONTAINER_CREDENTIALS_RELATIVE_URI, || {
            rt.block_on(async {
                let client = EcsMetadataClient::new();
                assert!(!client.is_active());
                let ctx = ctx_with(MockHttpClient::new(vec![]), rt.handle().clone());
                let err = client.get_metadata(&ctx).await.unwrap_err();
                assert!(matches!(err, CredentialError::NoECSMetaDataService));
            });
        });
    }

    #[test]
    fn happy_path_decodes_document() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        temp_env::with_var(
            vars::AWS_CONTAINER_CREDENTIALS_RELATIVE_URI,
            Some("/path"),
            || {
                rt.block_on(async {
                    let body = br#"{"AccessKeyId":"abc123","SecretAccessKey":"123abc","Token":"xyz987","Expiration":"2030-01-01T00:00:00Z","RoleArn":"arn"}"#;
                    let mock =
                        MockHttpClient::new(vec![Script::Respond(ok_response(body.to_vec()))]);
                    let ctx = ctx_with(mock, rt.handle().clone());

                    let client = EcsMetadataClient::new();
                    assert!(client.is_active());
                    let cred = client.get_metadata(&ctx).await.expect("must succeed");
                    assert_eq!(cred.access_key_id(), "abc123");
                    assert_eq!(cred.secret_access_key(), "123abc");
                    assert_eq!(cred.session_token(), Some("xyz987"));
                    assert!(cred.expiration().is_some());
                });
            },
        );
    }

    #[test]
    fn issues_get_against_fixed_host_plus_relative_uri() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        temp_env::with_var(
            vars::AWS_CONTAINER_CREDENTIALS_RELATIVE_URI,
            Some("/v2/credentials/abc"),
            || {
                rt.block_on(async {
                    let body = br#"{"AccessKeyId":"a","SecretAccessKey":"s","Token":"t","Expiration":"2030-01-01T00:00:00Z"}"#;
                    let mock = Arc::new(MockHttpClient::new(vec![Script::Respond(ok_response(
                        body.to_vec(),
                    ))]));
                    let ctx = ProviderContext::new(mock.clone(), rt.handle().clone());

                    let client = EcsMetadataClient::new();
                    client.get_metadata(&ctx).await.expect("must succeed");

                    let requests = mock.requests();
                    assert_eq!(requests.len(), 1);
                    assert_eq!(requests[0].url, "http://169.254.170.2/v2/credentials/abc");
                });
            },
        );
    }

    #[test]
    fn empty_body_is_missing_metadata() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        temp_env::with_var(vars::AWS_CONTAINER_CREDENTIALS_RELATIVE_URI, Some("/x"), || {
            rt.block_on(async {
                let mock = MockHttpClient::new(vec![Script::Respond(ok_response(Vec::new()))]);
                let ctx = ctx_with(mock, rt.handle().clone());
                let client = EcsMetadataClient::new();
                let err = client.get_metadata(&ctx).await.unwrap_err();
                assert!(matches!(err, CredentialError::MissingMetaData));
            });
        });
    }
}
