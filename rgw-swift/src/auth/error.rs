use reqwest::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// 认证服务拒绝了凭证
    #[error("authentication rejected: {status}, text: {text}")]
    Rejected { status: StatusCode, text: String },
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),
    #[error("invalid auth session: {0}")]
    InvalidSession(String),
    #[error("invalid auth url: {0}")]
    Url(#[from] url::ParseError),
}

impl AuthError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            AuthError::Reqwest(e) => e.status(),
            _ => None,
        }
    }

    pub(crate) async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        match resp.text().await {
            Ok(text) => AuthError::Rejected { status, text },
            Err(e) => AuthError::Reqwest(e),
        }
    }
}
