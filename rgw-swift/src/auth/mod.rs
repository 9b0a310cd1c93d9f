//! Authenticator definitions.
//!
//! 所有对Swift的请求都需要先拿到`AuthSession`（endpoint + token），构建client的时候传入实现了
//! `Authenticator` trait的类型。不同的认证方式（固定token、TempAuth、Keystone v3）都只是这个trait的
//! 不同实现，在构建client的时候选定，之后不会再切换。
//!
//! 需要缓存session的实现使用[`SessionCache`]，它保证并发调用`authenticate()`时只会有一次真正的
//! 认证请求。
//!
//! # Example
//! ```no_run
//! use rgw_swift::auth::{AuthError, AuthSession, Authenticator};
//! use rgw_swift::Client;
//! use std::sync::Arc;
//!
//! pub struct FixedAuth;
//!
//! #[async_trait::async_trait]
//! impl Authenticator for FixedAuth {
//!     async fn authenticate(&self) -> Result<AuthSession, AuthError> {
//!         AuthSession::new("https://rgw.example.com/swift/v1", "AUTH_tk_example", None)
//!     }
//! }
//!
//! fn get_swift_client() -> Client {
//!     Client::builder().authenticator(Arc::new(FixedAuth)).build()
//! }
//! ```

mod cache;
mod credentials;
mod error;
#[cfg(feature = "keystone")]
mod keystone;
mod static_token;
#[cfg(feature = "tempauth")]
mod tempauth;

pub use cache::SessionCache;
pub use credentials::Credentials;
pub use error::AuthError;
#[cfg(feature = "keystone")]
pub use keystone::{KeystoneV3Authenticator, KeystoneV3Credentials};
pub use static_token::StaticAuthenticator;
#[cfg(feature = "tempauth")]
pub use tempauth::{TempAuthAuthenticator, TempAuthCredentials};

use std::time::Duration;
use time::OffsetDateTime;

/// 一次认证的结果，`endpoint_url`和`token`保证非空
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSession {
    endpoint_url: String,
    token: String,
    expires_at: Option<OffsetDateTime>,
}

impl AuthSession {
    pub fn new(
        endpoint_url: impl Into<String>,
        token: impl Into<String>,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<Self, AuthError> {
        let endpoint_url = endpoint_url.into();
        let token = token.into();
        if endpoint_url.is_empty() {
            return Err(AuthError::InvalidSession("empty endpoint url".to_owned()));
        }
        if token.is_empty() {
            return Err(AuthError::InvalidSession("empty token".to_owned()));
        }
        Ok(Self {
            endpoint_url,
            token,
            expires_at,
        })
    }

    /// storage url, like `https://host/swift/v1/AUTH_xxx`
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    /// 没有过期时间的session一直有效；有过期时间的，在过期前`leeway`内就视为失效
    pub fn is_valid_at(&self, now: OffsetDateTime, leeway: Duration) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => now + leeway < expires_at,
        }
    }
}

#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<AuthSession, AuthError>;
}
