//! account/container/object共用的元数据读写
//!
//! 三种资源的区别只有资源路径和元数据header前缀，所以用同一个[`Entity`]加上[`EntityKind`]表示，
//! 由kind决定路径怎么拼：
//!
//! - Account：endpoint本身
//! - Container：`{endpoint}/{name}`
//! - Object：`{endpoint}/{container}/{name}`，name中的`/`原样保留
//!
//! `meta`和`update`中的`name`指的是kind对应资源的名称，Account会忽略它。

use crate::Client;
use crate::Error;
use crate::metadata::{EntityKind, MetadataMap, add_prefix, strip_prefix};
use crate::utils::{encode_path, ensure_name, join_endpoint};
use reqwest::{Method, RequestBuilder};
use rgw_swift_common::helper::{ensure_success, into_header_map};
use std::collections::HashMap;

#[derive(Clone)]
pub struct Entity {
    kind: EntityKind,
    // 只有Object需要，所属的container
    container: Option<String>,
    client: Client,
}

impl Entity {
    pub(crate) fn new(kind: EntityKind, container: Option<String>, client: Client) -> Self {
        Self {
            kind,
            container,
            client,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// 相对于endpoint的资源路径（已编码，不带开头的`/`）
    ///
    /// 名称为空时返回`Error::MalformedResourceName`，这一步在任何网络请求之前
    pub(crate) fn resource_path(&self, name: &str) -> Result<String, Error> {
        match self.kind {
            EntityKind::Account => Ok(String::new()),
            EntityKind::Container => {
                ensure_name("container", name)?;
                Ok(encode_path(name))
            }
            EntityKind::Object => {
                let container = self.container.as_deref().unwrap_or_default();
                ensure_name("container", container)?;
                ensure_name("object", name)?;
                Ok(format!("{}/{}", encode_path(container), encode_path(name)))
            }
        }
    }

    /// 校验名称，认证，然后构造带token的请求
    pub(crate) async fn request(&self, method: Method, name: &str) -> Result<RequestBuilder, Error> {
        let path = self.resource_path(name)?;
        let session = self.client.authenticator.authenticate().await?;
        let url = join_endpoint(session.endpoint_url(), &path)?;
        tracing::debug!(kind = ?self.kind, %method, %url, "swift request");

        Ok(self
            .client
            .http_client
            .request(method, url)
            .header("X-Auth-Token", session.token()))
    }

    /// `HEAD`资源，返回去掉前缀后的用户元数据
    pub async fn meta(&self, name: &str) -> Result<MetadataMap, Error> {
        let req = self.request(Method::HEAD, name).await?;
        let resp = req
            .send()
            .await
            .map_err(|e| Error::MetadataFetch(e.into()))?;
        let resp = ensure_success(resp).await.map_err(|e| {
            tracing::warn!(kind = ?self.kind, name, error = %e, "metadata fetch failed");
            Error::MetadataFetch(e)
        })?;

        Ok(strip_prefix(self.kind, resp.headers()))
    }

    /// `POST`资源元数据
    ///
    /// - `meta`：用户元数据，会自动加上前缀
    /// - `extra`：其它原样发送的header，如`X-Remove-Container-Meta-Colour`，`X-Delete-After`
    ///
    /// 注意：Swift中object的`POST`会替换掉所有已有的用户元数据，account和container则只更新传入的key
    pub async fn update(
        &self,
        name: &str,
        meta: &MetadataMap,
        extra: Option<&HashMap<String, String>>,
    ) -> Result<(), Error> {
        let mut header_map = add_prefix(self.kind, meta).map_err(Error::MetadataUpdate)?;
        if let Some(extra) = extra {
            header_map.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let header = into_header_map(header_map).map_err(Error::MetadataUpdate)?;

        let req = self.request(Method::POST, name).await?;
        let resp = req
            .headers(header)
            .send()
            .await
            .map_err(|e| Error::MetadataUpdate(e.into()))?;
        ensure_success(resp).await.map_err(|e| {
            tracing::warn!(kind = ?self.kind, name, error = %e, "metadata update failed");
            Error::MetadataUpdate(e)
        })?;

        Ok(())
    }
}
