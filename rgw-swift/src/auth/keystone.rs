//! Keystone v3 密码认证
//!
//! [Identity API v3](https://docs.openstack.org/api-ref/identity/v3/#password-authentication-with-scoped-authorization)
//!
//! 认证成功后token在响应头`X-Subject-Token`中，Swift的endpoint从响应体的service catalog中
//! 找`type`为`object-store`的服务。

use super::{AuthError, AuthSession, Authenticator, SessionCache};
use rgw_swift_common::helper::header_str;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const OBJECT_STORE: &str = "object-store";

fn default_interface() -> String {
    "public".to_owned()
}

#[derive(Clone, Debug, Deserialize)]
pub struct KeystoneV3Credentials {
    /// like `https://keystone.example.com:5000/v3`
    pub auth_url: String,
    pub username: String,
    pub password: String,
    /// 用户所在domain的id
    pub domain_id: String,
    pub project_id: String,
    /// catalog中有多个region时用来筛选endpoint
    pub region: Option<String>,
    /// `public`, `internal` or `admin`，默认`public`
    #[serde(default = "default_interface")]
    pub interface: String,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    token: Token,
}

#[derive(Deserialize, Debug)]
struct Token {
    expires_at: Option<String>,
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize, Debug)]
struct CatalogEntry {
    r#type: String,
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[derive(Deserialize, Debug)]
struct Endpoint {
    interface: String,
    region: Option<String>,
    url: String,
}

pub struct KeystoneV3Authenticator {
    credentials: KeystoneV3Credentials,
    http_client: reqwest::Client,
    cache: SessionCache,
}

impl KeystoneV3Authenticator {
    pub fn new(credentials: KeystoneV3Credentials) -> Self {
        Self::with_http_client(credentials, reqwest::Client::new())
    }

    pub fn with_http_client(
        credentials: KeystoneV3Credentials,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            http_client,
            cache: SessionCache::default(),
        }
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    fn request_body(&self) -> serde_json::Value {
        let creds = &self.credentials;
        json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": creds.username,
                            "domain": { "id": creds.domain_id },
                            "password": creds.password,
                        }
                    }
                },
                "scope": {
                    "project": { "id": creds.project_id }
                }
            }
        })
    }

    async fn fetch(&self) -> Result<AuthSession, AuthError> {
        let url = format!(
            "{}/auth/tokens",
            self.credentials.auth_url.trim_end_matches('/')
        );
        tracing::debug!(%url, project_id = %self.credentials.project_id, "keystone: requesting token");

        let resp = self
            .http_client
            .post(&url)
            .json(&self.request_body())
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = AuthError::from_response(resp).await;
            tracing::warn!(error = %err, "keystone: authentication failed");
            return Err(err);
        }

        let token = header_str(resp.headers(), "x-subject-token")
            .ok_or_else(|| AuthError::InvalidResponse("missing X-Subject-Token".to_owned()))?
            .to_owned();
        let body: TokenResponse = resp.json().await?;

        let expires_at = match body.token.expires_at.as_deref() {
            Some(s) => Some(OffsetDateTime::parse(s, &Rfc3339).map_err(|e| {
                AuthError::InvalidResponse(format!("invalid token expires_at `{s}`: {e}"))
            })?),
            None => None,
        };
        let endpoint_url = select_endpoint(
            &body.token.catalog,
            &self.credentials.interface,
            self.credentials.region.as_deref(),
        )?;

        AuthSession::new(endpoint_url, token, expires_at)
    }
}

fn select_endpoint(
    catalog: &[CatalogEntry],
    interface: &str,
    region: Option<&str>,
) -> Result<String, AuthError> {
    catalog
        .iter()
        .filter(|entry| entry.r#type == OBJECT_STORE)
        .flat_map(|entry| entry.endpoints.iter())
        .find(|ep| {
            ep.interface == interface
                && region.is_none_or(|r| ep.region.as_deref() == Some(r))
        })
        .map(|ep| ep.url.trim_end_matches('/').to_owned())
        .ok_or_else(|| {
            AuthError::InvalidResponse(format!(
                "no {OBJECT_STORE} endpoint for interface `{interface}`, region `{}` in catalog",
                region.unwrap_or("*")
            ))
        })
}

#[async_trait::async_trait]
impl Authenticator for KeystoneV3Authenticator {
    async fn authenticate(&self) -> Result<AuthSession, AuthError> {
        self.cache.get_or_fetch(|| self.fetch()).await
    }
}
