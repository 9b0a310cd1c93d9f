use super::{AuthError, AuthSession};
use std::future::Future;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

const DEFAULT_LEEWAY: Duration = Duration::from_secs(60);

/// 认证session的缓存
///
/// 取session的时候会一直持有锁直到认证请求结束，所以并发的`get_or_fetch`要么共享同一次请求的结果，
/// 要么直接拿到已缓存的有效session，不会出现写了一半的session。
///
/// 失效条件：
/// - session带有`expires_at`，且当前时间距离过期不足`leeway`
/// - 调用了[`SessionCache::invalidate`]
#[derive(Debug)]
pub struct SessionCache {
    slot: Mutex<Option<AuthSession>>,
    leeway: Duration,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_LEEWAY)
    }
}

impl SessionCache {
    pub fn new(leeway: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            leeway,
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<AuthSession, AuthError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AuthSession, AuthError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.as_ref() {
            if session.is_valid_at(OffsetDateTime::now_utc(), self.leeway) {
                tracing::trace!("reuse cached auth session");
                return Ok(session.clone());
            }
            tracing::debug!(expires_at = ?session.expires_at(), "cached auth session expired");
        }

        // 失败的时候丢弃旧session，下次调用重新认证
        *slot = None;
        let fresh = fetch().await?;
        *slot = Some(fresh.clone());
        Ok(fresh)
    }

    /// 丢弃缓存的session，下次调用`get_or_fetch`会重新认证
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    pub async fn cached(&self) -> Option<AuthSession> {
        self.slot.lock().await.clone()
    }
}
