use crate::auth::AuthError;
use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error: {0}")]
    Common(String),
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),
    /// account元数据中没有`temp-url-key`
    #[error("account has no temp-url-key defined")]
    MissingTempUrlKey,
    #[error("metadata fetch failed: {0}")]
    MetadataFetch(#[source] rgw_swift_common::Error),
    #[error("metadata update failed: {0}")]
    MetadataUpdate(#[source] rgw_swift_common::Error),
    #[error("malformed resource name: {0}")]
    MalformedResourceName(String),
    #[error("request error: {0}")]
    Request(#[from] rgw_swift_common::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

impl Error {
    /// 上游返回的HTTP状态码（如果有）
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Auth(e) => e.status(),
            Error::MetadataFetch(e) | Error::MetadataUpdate(e) | Error::Request(e) => e.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(rgw_swift_common::Error::Reqwest(e))
    }
}
