use crate::Error;
use crate::account::Account;
use crate::auth::Authenticator;
use crate::container::Container;
use crate::entity::Entity;
use crate::metadata::{EntityKind, MetadataMap, add_prefix};
use bon::bon;
use reqwest::Method;
use rgw_swift_common::helper::{ensure_success, into_header_map, parse_json_response};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Swift客户端，同时也是container集合的入口
///
/// `Client`可以廉价clone，所有handle共享同一个`Authenticator`和`reqwest::Client`
#[derive(Clone)]
pub struct Client {
    pub(crate) authenticator: Arc<dyn Authenticator>,
    pub(crate) http_client: reqwest::Client,
}

#[bon]
impl Client {
    #[builder]
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        /// 不传则使用默认的`reqwest::Client`，超时等设置请在这里配置
        http_client: Option<reqwest::Client>,
    ) -> Self {
        Self {
            authenticator,
            http_client: http_client.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub bytes: u64,
    pub last_modified: Option<String>,
}

impl Client {
    pub fn account(&self) -> Account {
        Account::new(self.clone())
    }

    pub fn container(&self, name: impl Into<String>) -> Container {
        Container::new(self.clone(), name.into())
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    fn containers(&self) -> Entity {
        Entity::new(EntityKind::Container, None, self.clone())
    }

    pub async fn meta(&self, container: &str) -> Result<MetadataMap, Error> {
        self.containers().meta(container).await
    }

    pub async fn update(
        &self,
        container: &str,
        meta: &MetadataMap,
        extra: Option<&HashMap<String, String>>,
    ) -> Result<(), Error> {
        self.containers().update(container, meta, extra).await
    }

    /// 列出account下的container，只取第一页（服务端默认最多10000个）
    pub async fn list(&self) -> Result<Vec<ContainerInfo>, Error> {
        let account = Entity::new(EntityKind::Account, None, self.clone());
        let resp = account
            .request(Method::GET, "")
            .await?
            .query(&[("format", "json")])
            .send()
            .await?;

        let res = parse_json_response(resp).await?;
        Ok(res)
    }

    /// 创建container，已存在时Swift同样返回成功
    pub async fn create(
        &self,
        container: &str,
        meta: Option<&MetadataMap>,
        extra: Option<&HashMap<String, String>>,
    ) -> Result<(), Error> {
        let mut header_map = meta
            .map(|m| add_prefix(EntityKind::Container, m))
            .transpose()?
            .unwrap_or_default();
        if let Some(extra) = extra {
            header_map.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let header = into_header_map(header_map)?;

        let resp = self
            .containers()
            .request(Method::PUT, container)
            .await?
            .headers(header)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    /// 只能删除空的container
    pub async fn delete(&self, container: &str) -> Result<(), Error> {
        let resp = self
            .containers()
            .request(Method::DELETE, container)
            .await?
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }
}
