use thiserror::Error;

#[derive(Error, Debug)]
pub enum PiteasError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unit conversion error: {0}")]
    Conversion(String),

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("transaction {tx_hash} failed: {reason}")]
    TransactionFailed { tx_hash: String, reason: String },

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("request rejected by user: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, PiteasError>;
