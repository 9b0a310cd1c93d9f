//! Temp URL（带签名的临时下载链接）
//!
//! - [Swift tempurl middleware](https://docs.openstack.org/swift/latest/api/temporary_url_middleware.html)
//! - [radosgw temp url](https://docs.ceph.com/en/latest/radosgw/swift/tempurl/)
//!
//! 签名内容为`{method}\n{expires}\n{path}`，使用account元数据中的`temp-url-key`做HMAC-SHA1，
//! 输出小写hex。path为服务端看到的完整路径，包括endpoint中已有的`/swift/v1/AUTH_xxx`部分。
//!
//! radosgw只支持account级别的key，这里只使用一个key，并且只生成`GET`的链接。

use crate::Error;
use crate::utils::{encode_path, ensure_name, join_endpoint};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use rgw_swift_common::helper::sign_hmac_sha1_hex;
use std::fmt::{Display, Formatter};

/// account元数据中保存temp url key的key（已去掉`X-Account-Meta-`前缀）
pub const TEMP_URL_KEY: &str = "temp-url-key";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Head,
    Put,
    Post,
    Delete,
}

impl Display for HttpVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpVerb::Get => write!(f, "GET"),
            HttpVerb::Head => write!(f, "HEAD"),
            HttpVerb::Put => write!(f, "PUT"),
            HttpVerb::Post => write!(f, "POST"),
            HttpVerb::Delete => write!(f, "DELETE"),
        }
    }
}

/// 和swift命令行工具输出一致的编码
///
/// 在JS `encodeURI`的基础上（保留`;,/?:@&=+$-_.!~*'()#`和字母数字），额外编码`!'()*`。
/// 注意`%`本身也会被编码。
///
/// 转义一律大写hex，唯独`*`输出小写的`%2a`，与swift命令行工具的输出逐字节一致。
const SWIFT_CLI_URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'!')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*');

pub fn swift_cli_encode(s: &str) -> String {
    // 每个转义字节单独作为一段输出
    utf8_percent_encode(s, SWIFT_CLI_URI)
        .map(|chunk| if chunk == "%2A" { "%2a" } else { chunk })
        .collect()
}

/// 签名：`hex(hmac_sha1(key, "{verb}\n{expires}\n{path}"))`
pub fn signature(key: &str, verb: HttpVerb, expires: u64, path: &str) -> String {
    let str_to_sign = format!("{verb}\n{expires}\n{path}");
    sign_hmac_sha1_hex(key, &str_to_sign)
}

/// object名中可能带有"目录"，文件名取最后一段
fn filename(object_path: &str) -> &str {
    match object_path.rfind('/') {
        Some(i) => &object_path[i + 1..],
        None => object_path,
    }
}

/// 生成`GET`的temp url
///
/// - `endpoint_url`：认证得到的storage url，如`https://host/swift/v1/AUTH_xxx`
/// - `key`：account的`temp-url-key`
/// - `expires`：过期的Unix时间戳，单位秒
///
/// 返回：`{origin}{path}?temp_url_sig={sig}&temp_url_expires={expires}&filename={filename}`，
/// 整个url按[`swift_cli_encode`]编码
pub fn generate(
    endpoint_url: &str,
    key: &str,
    container: &str,
    object: &str,
    expires: u64,
) -> Result<String, Error> {
    ensure_name("container", container)?;
    ensure_name("object", object)?;

    let object_path = format!("{container}/{object}");
    let object_url = join_endpoint(endpoint_url, &encode_path(&object_path))?;
    let path = object_url.path();

    let sig = signature(key, HttpVerb::Get, expires, path);
    let temp_url = format!(
        "{}{}?temp_url_sig={}&temp_url_expires={}&filename={}",
        object_url.origin().ascii_serialization(),
        path,
        sig,
        expires,
        filename(&object_path)
    );

    Ok(swift_cli_encode(&temp_url))
}
