use super::{AuthError, AuthSession, Authenticator};

/// 固定endpoint和token，不做缓存也不会过期，每次直接返回同一个session
#[derive(Clone, Debug)]
pub struct StaticAuthenticator {
    session: AuthSession,
}

impl StaticAuthenticator {
    pub fn new(endpoint_url: impl Into<String>, token: impl Into<String>) -> Result<Self, AuthError> {
        Ok(Self {
            session: AuthSession::new(endpoint_url, token, None)?,
        })
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self) -> Result<AuthSession, AuthError> {
        Ok(self.session.clone())
    }
}
