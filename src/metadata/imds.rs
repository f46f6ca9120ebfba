use super::{parse_metadata_timestamp, MetadataClient};
use crate::context::{ProviderContext, LOG_TARGET};
use crate::credential::Credential;
use crate::error::{CredentialError, Result};
use crate::http_client::Request;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;

const IMDS_ENDPOINT: &str = "http://169.254.169.254";
const IMDS_TIMEOUT: Duration = Duration::from_secs(2);
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_TTL_SECONDS: &str = "21600";
/// How much earlier than the token's real TTL we treat it as expired, enforcing a re-read
/// well before AWS would reject it. Mirrors the teacher's `IMDSv2Loader`, which shaves 10
/// minutes off the 6-hour TTL for the same reason.
const TOKEN_EARLY_EXPIRY: ChronoDuration = ChronoDuration::seconds(600);

/// Fetches credentials from the EC2 Instance Metadata Service, negotiating IMDSv2 and
/// transparently falling back to IMDSv1 (spec §4.E).
///
/// The IMDSv2 session token is cached independently of whatever caching the caller layers on top
/// (typically a [`RotatingCredentialProvider`](crate::provider::RotatingCredentialProvider))
/// because the token and the credential it unlocks have unrelated lifetimes.
#[derive(Debug)]
pub struct ImdsMetadataClient {
    token: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl Default for ImdsMetadataClient {
    fn default() -> Self {
        ImdsMetadataClient {
            token: Mutex::new(None),
        }
    }
}

impl ImdsMetadataClient {
    /// Construct a new IMDS client with no cached token.
    pub fn new() -> Self {
        Self::default()
    }

    fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.token.lock().expect("lock poisoned");
        match &*guard {
            Some((token, expires_at)) if *expires_at > now => Some(token.clone()),
            _ => None,
        }
    }

    fn store_token(&self, token: String, now: DateTime<Utc>) {
        let expires_at = now + ChronoDuration::seconds(21600) - TOKEN_EARLY_EXPIRY;
        *self.token.lock().expect("lock poisoned") = Some((token, expires_at));
    }

    /// Step 1: TokenRequest. On success, the token is cached and returned; any failure (wrong
    /// status or transport error) falls back to IMDSv1 by returning `None` rather than
    /// propagating the error.
    async fn request_token(&self, ctx: &ProviderContext) -> Option<String> {
        let now = Utc::now();
        if let Some(token) = self.cached_token(now) {
            return Some(token);
        }

        let req = Request::put(format!("{IMDS_ENDPOINT}/latest/api/token"))
            .with_header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS);

        let resp = match ctx
            .http_client()
            .execute(req, IMDS_TIMEOUT, ctx.executor())
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "IMDSv2 token request failed, falling back to IMDSv1: {e}");
                return None;
            }
        };

        if resp.status != http::StatusCode::OK || resp.body.is_empty() {
            log::debug!(
                target: LOG_TARGET,
                "IMDSv2 token request returned status {}, falling back to IMDSv1",
                resp.status
            );
            return None;
        }

        let token = resp.body_str().into_owned();
        self.store_token(token.clone(), now);
        Some(token)
    }

    fn request_with_token(url: impl Into<String>, token: Option<&str>) -> Request {
        let req = Request::get(url);
        match token {
            Some(token) => req.with_header(TOKEN_HEADER, token),
            None => req,
        }
    }

    /// Step 2: RoleLookup.
    async fn lookup_role_name(&self, ctx: &ProviderContext, token: Option<&str>) -> Result<String> {
        let req = Self::request_with_token(
            format!("{IMDS_ENDPOINT}/latest/meta-data/iam/security-credentials/"),
            token,
        );
        let resp = ctx
            .http_client()
            .execute(req, IMDS_TIMEOUT, ctx.executor())
            .await?;

        if resp.status != http::StatusCode::OK || resp.body.is_empty() {
            return Err(CredentialError::CouldNotGetInstanceRoleName);
        }

        Ok(resp.body_str().into_owned())
    }

    /// Step 3: CredentialFetch.
    async fn fetch_role_credentials(
        &self,
        ctx: &ProviderContext,
        token: Option<&str>,
        role: &str,
    ) -> Result<Credential> {
        let req = Self::request_with_token(
            format!("{IMDS_ENDPOINT}/latest/meta-data/iam/security-credentials/{role}"),
            token,
        );
        let resp = ctx
            .http_client()
            .execute(req, IMDS_TIMEOUT, ctx.executor())
            .await?;

        if resp.body.is_empty() {
            return Err(CredentialError::MissingMetaData);
        }
        if resp.status != http::StatusCode::OK {
            return Err(CredentialError::MissingMetaData);
        }

        let doc: ImdsCredentialsDocument =
            serde_json::from_slice(&resp.body).map_err(CredentialError::FailedToDecode)?;

        let mut cred =
            Credential::new(doc.access_key_id, doc.secret_access_key, Some(doc.token));
        if let Ok(expiration) = parse_metadata_timestamp(&doc.expiration) {
            cred = cred.with_expiration(expiration);
        }
        Ok(cred)
    }
}

#[async_trait]
impl MetadataClient for ImdsMetadataClient {
    async fn get_metadata(&self, ctx: &ProviderContext) -> Result<Credential> {
        let token = self.request_token(ctx).await;
        let role = self.lookup_role_name(ctx, token.as_deref()).await?;
        self.fetch_role_credentials(ctx, token.as_deref(), &role)
            .await
    }
}

#[derive(Debug, Deserialize)]
struct ImdsCredentialsDocument {
    #[serde(rename = "AccessKeyId")]
    access_key_id: String,
    #[serde(rename = "SecretAccessKey")]
    secret_access_key: String,
    #[serde(rename = "Token")]
    token: String,
    #[serde(rename = "Expiration")]
    expiration: String,
    #[allow(dead_code)]
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[allow(dead_code)]
    #[serde(rename = "LastUpdated", default)]
    last_updated: Option<String>,
    #[allow(dead_code)]
    #[serde(rename = "Type", default)]
    credential_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::mock::{ok_response, status_response, MockHttpClient, Script};
    use std::sync::Arc;

    fn rt() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("runtime")
    }

    const CRED_BODY: &[u8] =
        br#"{"AccessKeyId":"AK","SecretAccessKey":"SK","Token":"TOK","Expiration":"2030-01-01T00:00:00Z","Code":"Success","LastUpdated":"2020-01-01T00:00:00Z","Type":"AWS-HMAC"}"#;

    #[test]
    fn imdsv2_happy_path_uses_token_on_every_step() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        rt.block_on(async {
            let mock = Arc::new(MockHttpClient::new(vec![
                Script::Respond(ok_response("sekret-token")),
                Script::Respond(ok_response("my-role")),
                Script::Respond(ok_response(CRED_BODY.to_vec())),
            ]));
            let ctx = ProviderContext::new(mock.clone(), rt.handle().clone());
            let client = ImdsMetadataClient::new();

            let cred = client.get_metadata(&ctx).await.expect("must succeed");
            assert_eq!(cred.access_key_id(), "AK");
            assert_eq!(cred.session_token(), Some("TOK"));

            let requests = mock.requests();
            assert_eq!(requests.len(), 3);
            assert_eq!(requests[0].method, http::Method::PUT);
            assert_eq!(
                requests[1]
                    .headers
                    .get(TOKEN_HEADER)
                    .map(|v| v.to_str().unwrap()),
                Some("sekret-token")
            );
            assert_eq!(
                requests[2]
                    .headers
                    .get(TOKEN_HEADER)
                    .map(|v| v.to_str().unwrap()),
                Some("sekret-token")
            );
        });
    }

    #[test]
    fn token_request_failure_falls_back_to_v1_without_token_header() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        rt.block_on(async {
            let mock = Arc::new(MockHttpClient::new(vec![
                Script::Respond(status_response(http::StatusCode::NOT_FOUND)),
                Script::Respond(ok_response("my-role")),
                Script::Respond(ok_response(CRED_BODY.to_vec())),
            ]));
            let ctx = ProviderContext::new(mock.clone(), rt.handle().clone());
            let client = ImdsMetadataClient::new();

            let cred = client.get_metadata(&ctx).await.expect("must succeed");
            assert_eq!(cred.access_key_id(), "AK");

            let requests = mock.requests();
            assert_eq!(requests.len(), 3);
            assert!(requests[1].headers.get(TOKEN_HEADER).is_none());
            assert!(requests[2].headers.get(TOKEN_HEADER).is_none());
        });
    }

    #[test]
    fn token_request_transport_error_falls_back_to_v1_without_token_header() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        rt.block_on(async {
            let mock = Arc::new(MockHttpClient::new(vec![
                Script::Fail(CredentialError::Timeout(
                    "http://169.254.169.254/latest/api/token".to_string(),
                )),
                Script::Respond(ok_response("my-role")),
                Script::Respond(ok_response(CRED_BODY.to_vec())),
            ]));
            let ctx = ProviderContext::new(mock.clone(), rt.handle().clone());
            let client = ImdsMetadataClient::new();

            let cred = client.get_metadata(&ctx).await.expect("must succeed");
            assert_eq!(cred.access_key_id(), "AK");

            let requests = mock.requests();
            assert_eq!(requests.len(), 3);
            assert!(requests[1].headers.get(TOKEN_HEADER).is_none());
            assert!(requests[2].headers.get(TOKEN_HEADER).is_none());
        });
    }

    #[test]
    fn role_lookup_failure_is_could_not_get_instance_role_name() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        rt.block_on(async {
            let mock = Arc::new(MockHttpClient::new(vec![
                Script::Respond(ok_response("token")),
                Script::Respond(status_response(http::StatusCode::INTERNAL_SERVER_ERROR)),
            ]));
            let ctx = ProviderContext::new(mock, rt.handle().clone());
            let client = ImdsMetadataClient::new();

            let err = client.get_metadata(&ctx).await.unwrap_err();
            assert!(matches!(err, CredentialError::CouldNotGetInstanceRoleName));
        });
    }

    #[test]
    fn credential_fetch_failure_is_missing_metadata() {
        let _ = env_logger::builder().is_test(true).try_init();

        let rt = rt();
        rt.block_on(async {
            let mock = Arc::new(MockHttpClient::new(vec![
                Script::Respond(ok_response("token")),
                Script::Respond(ok_response("my-role")),
                Script::Respond(status_response(http::StatusCode::NOT_FOUND)),
            ]));
            let ctx = ProviderContext::new(mock, rt.handle().clone());
            let client = ImdsMetadataClient::new();

            let err = client.get_metadata(&ctx).await.unwrap_err();
            assert!(matches!(err, CredentialError::MissingMetaData));
        });
    }
}
