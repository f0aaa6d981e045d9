use anyhow::{anyhow, Context};
use http::StatusCode;
use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    /// The backend refused the request and explained why
    #[error("{message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Comment content is empty")]
    EmptyContent,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::Rejected { .. } => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
        }
    }

    /// Body in the shape the backend uses for its own errors
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "code": null,
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "code": "42501",
            }),
            Error::Rejected { code, message } => json!({
                "message": message,
                "code": code,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "code": "22P05",
                "details": s,
            }),
            Error::EmptyContent => json!({
                "message": "comment content is empty",
                "code": "23514",
            }),
        })
        .expect("serializing error contents")
    }

    /// Parse a non-success response from the backend
    pub fn parse(status: StatusCode, body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let field = |name: &str| {
            data.get(name)
                .and_then(|v| v.as_str())
                .map(String::from)
        };
        // the auth service says `msg` or `error_description` where the table API says `message`
        let message = field("message")
            .or_else(|| field("msg"))
            .or_else(|| field("error_description"));
        let code = field("code").or_else(|| field("error"));
        Ok(match (status, message) {
            (_, Some(message)) => Error::Rejected { code, message },
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, None) => Error::PermissionDenied,
            (_, None) => return Err(anyhow!("error contents has no message")),
        })
    }

    /// Like `parse`, but never fails: unparseable bodies become `Unknown`
    pub fn from_response(status: StatusCode, body: &[u8]) -> Error {
        Error::parse(status, body).unwrap_or_else(|_| {
            Error::Unknown(format!("{status}: {}", String::from_utf8_lossy(body)))
        })
    }
}
