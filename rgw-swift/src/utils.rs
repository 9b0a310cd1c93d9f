use crate::Error;
use md5::{Digest, Md5};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::Path;
use tokio::io::AsyncReadExt;
use url::Url;

/// 资源名中会被url解析器当作path结束或转义的字符。`/`保留，作为"目录"分隔
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub(crate) fn encode_path(name: &str) -> String {
    utf8_percent_encode(name, PATH_SEGMENT).to_string()
}

/// `{endpoint}/{path}`，path需要已经编码过
pub(crate) fn join_endpoint(endpoint_url: &str, path: &str) -> Result<Url, Error> {
    let url = if path.is_empty() {
        Url::parse(endpoint_url)?
    } else {
        Url::parse(&format!("{endpoint_url}/{path}"))?
    };
    Ok(url)
}

pub(crate) fn ensure_name(what: &str, name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::MalformedResourceName(format!("{what} name cannot be empty")));
    }
    Ok(())
}

/// Swift的ETag为对象内容的md5 hex
pub(crate) fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

// 用 buffer 读文件并计算MD5
pub(crate) async fn md5_hex_from_file(path: &Path) -> Result<String, Error> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
