use std::time::Duration;

use piteas::PiteasError;
use thiserror::Error;

/// Failures of the swap workflow. `Display` is the status line shown to the
/// user.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("rejected by user: {0}")]
    UserRejected(String),

    #[error("failed to load token list: {0}")]
    RegistryLoad(#[source] PiteasError),

    #[error(
        "please wait {:.1}s before fetching a new quote",
        .remaining.as_secs_f64()
    )]
    CooldownActive { remaining: Duration },

    #[error("quote request is already in progress")]
    RequestInProgress,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("failed to fetch quote: {0}")]
    QuoteFetch(#[source] PiteasError),

    #[error("failed to approve token: {0}")]
    Approval(#[source] PiteasError),

    #[error("failed to execute swap: {0}")]
    SwapExecution(#[source] PiteasError),

    #[error("not ready: {0}")]
    NotReady(&'static str),

    #[error("quote was computed for different parameters; request a new quote")]
    StaleQuote,

    #[error("insufficient {symbol} balance: have {available}, need {required}")]
    InsufficientBalance {
        symbol: String,
        available: String,
        required: String,
    },

    #[error("failed to read token: {0}")]
    TokenRead(#[source] PiteasError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SwapError {
    /// Map a signer failure: a declined prompt becomes `UserRejected`,
    /// anything else goes through `wrap`.
    pub fn from_signer(err: PiteasError, wrap: fn(PiteasError) -> SwapError) -> SwapError {
        match err {
            PiteasError::Rejected(reason) => SwapError::UserRejected(reason),
            other => wrap(other),
        }
    }
}
