use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read pdf: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to sign token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("environment variable {name}: {source}")]
    Env {
        name: &'static str,
        source: dotenv::Error,
    },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("sheets api returned {status}: {body}")]
    Sheets {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("spreadsheet has no tab named {0:?}")]
    MissingTab(String),
}
