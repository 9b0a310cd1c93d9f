//! Swift v1 认证（TempAuth / radosgw的`/auth/1.0`）
//!
//! [radosgw文档](https://docs.ceph.com/en/latest/radosgw/swift/auth/)

use super::{AuthError, AuthSession, Authenticator, SessionCache};
use rgw_swift_common::helper::header_str;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Clone, Debug, Deserialize)]
pub struct TempAuthCredentials {
    /// like `https://rgw.example.com/auth/1.0`
    pub auth_url: String,
    /// radosgw中为`{user}:{subuser}`
    pub user: String,
    pub key: String,
}

pub struct TempAuthAuthenticator {
    credentials: TempAuthCredentials,
    http_client: reqwest::Client,
    cache: SessionCache,
}

impl TempAuthAuthenticator {
    pub fn new(credentials: TempAuthCredentials) -> Self {
        Self::with_http_client(credentials, reqwest::Client::new())
    }

    pub fn with_http_client(credentials: TempAuthCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            http_client,
            cache: SessionCache::default(),
        }
    }

    /// 丢弃缓存的token
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    async fn fetch(&self) -> Result<AuthSession, AuthError> {
        tracing::debug!(auth_url = %self.credentials.auth_url, "tempauth: requesting token");
        let resp = self
            .http_client
            .get(&self.credentials.auth_url)
            .header("X-Auth-User", &self.credentials.user)
            .header("X-Auth-Key", &self.credentials.key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = AuthError::from_response(resp).await;
            tracing::warn!(error = %err, "tempauth: authentication failed");
            return Err(err);
        }

        let header = resp.headers();
        let endpoint_url = header_str(header, "x-storage-url")
            .ok_or_else(|| AuthError::InvalidResponse("missing X-Storage-Url".to_owned()))?;
        let token = header_str(header, "x-auth-token")
            .ok_or_else(|| AuthError::InvalidResponse("missing X-Auth-Token".to_owned()))?;
        // 剩余有效秒数，没有则视为不过期
        let expires_at = header_str(header, "x-auth-token-expires")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|secs| OffsetDateTime::now_utc() + Duration::from_secs(secs));

        AuthSession::new(endpoint_url, token, expires_at)
    }
}

#[async_trait::async_trait]
impl Authenticator for TempAuthAuthenticator {
    async fn authenticate(&self) -> Result<AuthSession, AuthError> {
        self.cache.get_or_fetch(|| self.fetch()).await
    }
}
