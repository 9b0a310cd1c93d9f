//! 可反序列化的凭证配置
//!
//! 凭证可以放在toml/json配置文件中，通过`type`字段区分认证方式，读取配置文件由调用者负责。
//!
//! # Example
//! ```no_run
//! use rgw_swift::auth::Credentials;
//! use rgw_swift::Client;
//!
//! fn get_swift_client() -> Client {
//!     let file_str = std::fs::read_to_string("tests/swift/config.toml").unwrap();
//!     let creds = toml::from_str::<Credentials>(&file_str).unwrap();
//!     Client::builder()
//!         .authenticator(creds.into_authenticator().unwrap())
//!         .build()
//! }
//! ```
//!
//! ```toml
//! type = "keystone_v3"
//! auth_url = "https://keystone.example.com:5000/v3"
//! username = "demo"
//! password = "secret"
//! domain_id = "default"
//! project_id = "0123456789abcdef"
//! ```

use super::{AuthError, Authenticator, StaticAuthenticator};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// 已知storage url和token，不需要认证服务
    Static { endpoint_url: String, token: String },
    #[cfg(feature = "tempauth")]
    TempAuth(super::TempAuthCredentials),
    #[cfg(feature = "keystone")]
    KeystoneV3(super::KeystoneV3Credentials),
}

impl Credentials {
    pub fn into_authenticator(self) -> Result<Arc<dyn Authenticator>, AuthError> {
        let authenticator: Arc<dyn Authenticator> = match self {
            Credentials::Static {
                endpoint_url,
                token,
            } => Arc::new(StaticAuthenticator::new(endpoint_url, token)?),
            #[cfg(feature = "tempauth")]
            Credentials::TempAuth(creds) => Arc::new(super::TempAuthAuthenticator::new(creds)),
            #[cfg(feature = "keystone")]
            Credentials::KeystoneV3(creds) => {
                Arc::new(super::KeystoneV3Authenticator::new(creds))
            }
        };
        Ok(authenticator)
    }
}
