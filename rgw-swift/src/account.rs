use crate::Client;
use crate::Error;
use crate::entity::Entity;
use crate::metadata::{EntityKind, MetadataMap};
use crate::temp_url::{self, TEMP_URL_KEY};
use crate::utils::ensure_name;
use rgw_swift_common::helper::unix_now;
use std::collections::HashMap;
use std::time::Duration;

/// 当前认证用户的account
///
/// radosgw目前不支持container级别的temp url key，所以key设置在account上，见
/// <http://tracker.ceph.com/issues/20862>
#[derive(Clone)]
pub struct Account {
    entity: Entity,
}

impl Account {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            entity: Entity::new(EntityKind::Account, None, client),
        }
    }

    pub async fn meta(&self) -> Result<MetadataMap, Error> {
        self.entity.meta("").await
    }

    pub async fn update(
        &self,
        meta: &MetadataMap,
        extra: Option<&HashMap<String, String>>,
    ) -> Result<(), Error> {
        self.entity.update("", meta, extra).await
    }

    /// 设置account的`temp-url-key`
    pub async fn set_temp_url_key(&self, key: &str) -> Result<(), Error> {
        let meta = MetadataMap::from([(TEMP_URL_KEY.to_owned(), key.to_owned())]);
        self.update(&meta, None).await
    }

    /// 生成object的`GET` temp url
    ///
    /// - `expires`：过期的Unix时间戳，单位秒
    ///
    /// 每次调用都会读取account元数据获取`temp-url-key`，没有设置时返回`Error::MissingTempUrlKey`
    pub async fn temp_url(
        &self,
        container: &str,
        object: &str,
        expires: u64,
    ) -> Result<String, Error> {
        ensure_name("container", container)?;
        ensure_name("object", object)?;

        let session = self.entity.client().authenticator.authenticate().await?;
        let meta = self.meta().await?;
        let key = meta
            .get(TEMP_URL_KEY)
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingTempUrlKey)?;

        let url = temp_url::generate(session.endpoint_url(), key, container, object, expires)?;
        tracing::debug!(container, object, expires, "temp url generated");
        Ok(url)
    }

    /// 和`temp_url`相同，过期时间为当前时间加上`valid_for`
    pub async fn temp_url_valid_for(
        &self,
        container: &str,
        object: &str,
        valid_for: Duration,
    ) -> Result<String, Error> {
        let now = u64::try_from(unix_now())
            .map_err(|_| Error::Common("system clock is before unix epoch".to_owned()))?;
        let expires = now
            .checked_add(valid_for.as_secs())
            .ok_or_else(|| Error::Common(format!("temp url expiry overflows: {valid_for:?}")))?;
        self.temp_url(container, object, expires).await
    }
}
