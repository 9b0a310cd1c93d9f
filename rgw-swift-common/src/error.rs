use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error: {0}")]
    Common(String),
    #[error("request api failed: {status}, text: {text}")]
    RequestAPIFailed { status: StatusCode, text: String },
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// 上游返回的HTTP状态码（如果有）
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::RequestAPIFailed { status, .. } => Some(*status),
            Error::Reqwest(e) => e.status(),
            Error::Common(_) => None,
        }
    }
}
