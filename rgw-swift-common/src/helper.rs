use crate::Error;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha1::Sha1;
use std::collections::HashMap;
use time::OffsetDateTime;

/// 当前Unix时间戳，单位秒
pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// header名和值都需要是合法的，否则返回`Error::Common`
pub fn into_header_map(map: HashMap<String, String>) -> Result<HeaderMap, Error> {
    let mut header_map = HeaderMap::with_capacity(map.len());
    for (k, v) in map {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| Error::Common(format!("invalid header name `{k}`: {e}")))?;
        let value = HeaderValue::from_str(&v)
            .map_err(|e| Error::Common(format!("invalid value for header `{k}`: {e}")))?;
        header_map.insert(name, value);
    }
    Ok(header_map)
}

pub fn sign_hmac_sha1(secret: &str, str_to_sign: &str) -> Vec<u8> {
    type HmacSha1 = Hmac<Sha1>;
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(str_to_sign.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// HMAC-SHA1，输出小写hex
pub fn sign_hmac_sha1_hex(secret: &str, str_to_sign: &str) -> String {
    hex::encode(sign_hmac_sha1(secret, str_to_sign))
}

pub fn header_str<'a>(header: &'a HeaderMap, name: &str) -> Option<&'a str> {
    header.get(name).and_then(|v| v.to_str().ok())
}

pub async fn into_request_failed_error(resp: reqwest::Response) -> Error {
    let status = resp.status();
    let body = resp.text().await;
    match body {
        Ok(text) => Error::RequestAPIFailed { status, text },
        Err(e) => Error::Reqwest(e),
    }
}

/// 状态码不是2xx的时候把响应转为`Error::RequestAPIFailed`
pub async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(into_request_failed_error(resp).await)
    }
}

pub async fn parse_json_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let resp = ensure_success(resp).await?;

    let bytes = resp.bytes().await?;
    let data = serde_json::from_slice(&bytes).map_err(|e| {
        Error::Common(format!(
            "parse response json error: {}, response text: {}",
            e,
            String::from_utf8_lossy(&bytes)
        ))
    })?;
    Ok(data)
}
