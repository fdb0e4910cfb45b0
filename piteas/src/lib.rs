pub mod chain;
pub mod config;
pub mod error;
pub mod rest;
pub mod types;
pub mod utils;

// ---- Top-level re-exports for ergonomic usage ----

pub use config::PiteasConfig;
pub use error::{PiteasError, Result};

// REST client
pub use rest::PiteasHttpClient;

// Chain capabilities
pub use chain::{
    EvmChain, EvmSigner, RouterTransaction, TokenReader, TransactionSender, WalletProvider,
};

// Wire types
pub use types::{QuoteQuery, QuoteResponse, TokenAddress, TokenDescriptor, TokenList};

// Unit conversion
pub use utils::{format_amount, format_amount_padded, parse_amount};
