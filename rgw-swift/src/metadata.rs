//! 用户元数据和HTTP header之间的转换
//!
//! Swift通过带前缀的header传递用户元数据，前缀由资源类型决定：
//!
//! | kind      | prefix             |
//! |-----------|--------------------|
//! | Account   | `X-Account-Meta-`  |
//! | Container | `X-Container-Meta-`|
//! | Object    | `X-Object-Meta-`   |
//!
//! 对调用者可见的[`MetadataMap`]中的key不带前缀且都是小写。

use reqwest::header::HeaderMap;
use rgw_swift_common::Error;
use std::collections::HashMap;

/// key: 小写、不带前缀的元数据名；value: 元数据值
pub type MetadataMap = HashMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Account,
    Container,
    Object,
}

impl EntityKind {
    /// 小写的元数据header前缀
    pub const fn meta_prefix(self) -> &'static str {
        match self {
            EntityKind::Account => "x-account-meta-",
            EntityKind::Container => "x-container-meta-",
            EntityKind::Object => "x-object-meta-",
        }
    }
}

/// 只保留带`kind`前缀的header，去掉前缀后返回
///
/// 值按UTF-8解码（Swift原样保存非ASCII的值），不是合法UTF-8的header会被忽略
pub fn strip_prefix(kind: EntityKind, header: &HeaderMap) -> MetadataMap {
    let prefix = kind.meta_prefix();
    header
        .iter()
        .filter_map(|(name, value)| {
            // HeaderName总是小写的
            let key = name.as_str().strip_prefix(prefix)?;
            if key.is_empty() {
                return None;
            }
            // to_str只接受可见ASCII
            let value = std::str::from_utf8(value.as_bytes()).ok()?;
            Some((key.to_owned(), value.to_owned()))
        })
        .collect()
}

/// 给每个key加上`kind`前缀，key统一转为小写
///
/// 转小写后重复的key（如`Colour`和`colour`）返回`Error::Common`
pub fn add_prefix(kind: EntityKind, meta: &MetadataMap) -> Result<HashMap<String, String>, Error> {
    let prefix = kind.meta_prefix();
    let mut header_map = HashMap::with_capacity(meta.len());
    for (k, v) in meta {
        let name = format!("{prefix}{}", k.to_lowercase());
        if header_map.insert(name, v.clone()).is_some() {
            return Err(Error::Common(format!(
                "duplicate metadata key `{k}` (keys are case-insensitive)"
            )));
        }
    }
    Ok(header_map)
}
