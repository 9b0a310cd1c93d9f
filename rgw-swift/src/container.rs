//! container中的object操作
//!
//! 上传下载只是把body交给reqwest，这里除了拼路径以外没有别的转换

use crate::Client;
use crate::Error;
use crate::entity::Entity;
use crate::metadata::{EntityKind, MetadataMap};
use crate::utils::{md5_hex, md5_hex_from_file};
use bytes::Bytes;
use reqwest::{Body, Method};
use rgw_swift_common::helper::{ensure_success, into_header_map, parse_json_response};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio_stream::{Stream, StreamExt};
use tokio_util::io::ReaderStream;

pub enum ObjectBody<'a> {
    Bytes(Vec<u8>),
    /// 从文件流式上传
    FilePath(&'a Path),
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    pub hash: Option<String>,
    #[serde(default)]
    pub bytes: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Clone)]
pub struct Container {
    name: String,
    objects: Entity,
}

impl Container {
    pub(crate) fn new(client: Client, name: String) -> Self {
        Self {
            objects: Entity::new(EntityKind::Object, Some(name.clone()), client),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn meta(&self, object: &str) -> Result<MetadataMap, Error> {
        self.objects.meta(object).await
    }

    /// Swift会用传入的`meta`替换object已有的全部用户元数据
    pub async fn update(
        &self,
        object: &str,
        meta: &MetadataMap,
        extra: Option<&HashMap<String, String>>,
    ) -> Result<(), Error> {
        self.objects.update(object, meta, extra).await
    }

    /// 列出container中的object，只取第一页
    pub async fn list(&self) -> Result<Vec<ObjectInfo>, Error> {
        let container = Entity::new(EntityKind::Container, None, self.objects.client().clone());
        let resp = container
            .request(Method::GET, &self.name)
            .await?
            .query(&[("format", "json")])
            .send()
            .await?;

        let res = parse_json_response(resp).await?;
        Ok(res)
    }

    /// 上传object，`ETag`设为内容的md5，服务端校验失败时返回422
    ///
    /// - `extra`：其它header，如`Content-Type`，`X-Object-Meta-*`，`X-Delete-At`
    pub async fn create(
        &self,
        object: &str,
        body: ObjectBody<'_>,
        extra: Option<&HashMap<String, String>>,
    ) -> Result<(), Error> {
        let mut header_map = extra.cloned().unwrap_or_default();
        let etag = match &body {
            ObjectBody::Bytes(bytes) => md5_hex(bytes),
            ObjectBody::FilePath(path) => md5_hex_from_file(path).await?,
        };
        header_map.insert("etag".to_owned(), etag);
        let header = into_header_map(header_map)?;

        let req = self.objects.request(Method::PUT, object).await?;
        let data = match body {
            ObjectBody::Bytes(bytes) => Body::from(bytes),
            ObjectBody::FilePath(path) => {
                let file = tokio::fs::File::open(path).await?;
                Body::wrap_stream(ReaderStream::new(file))
            }
        };

        let resp = req.headers(header).body(data).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    pub async fn get_bytes(&self, object: &str) -> Result<Bytes, Error> {
        let resp = self.get_response(object).await?;
        Ok(resp.bytes().await?)
    }

    pub async fn get_stream(
        &self,
        object: &str,
    ) -> Result<impl Stream<Item = Result<Bytes, Error>> + use<>, Error> {
        let resp = self.get_response(object).await?;
        Ok(resp.bytes_stream().map(|item| item.map_err(Error::from)))
    }

    pub async fn download_to_file(&self, object: &str, file_path: &Path) -> Result<(), Error> {
        let mut resp = self.get_response(object).await?;

        let mut file = tokio::fs::File::create(file_path).await?;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }

    pub async fn delete(&self, object: &str) -> Result<(), Error> {
        let resp = self
            .objects
            .request(Method::DELETE, object)
            .await?
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn get_response(&self, object: &str) -> Result<reqwest::Response, Error> {
        let resp = self.objects.request(Method::GET, object).await?.send().await?;
        Ok(ensure_success(resp).await?)
    }
}
