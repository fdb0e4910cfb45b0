use clap::{Args, Parser, Subcommand};
use ethers::types::Address;
use rust_decimal::Decimal;

/// piteas-swap - swap tokens on PulseChain through the Piteas router.
#[derive(Parser, Debug)]
#[command(name = "piteas-swap", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Output as JSON lines instead of TSV
    #[arg(long, global = true)]
    pub json: bool,

    /// Do not ask for confirmation before connecting or sending a swap
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// JSON-RPC endpoint
    #[arg(long, env = "PITEAS_RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Quote API base URL
    #[arg(long, env = "PITEAS_QUOTE_API_URL", global = true)]
    pub quote_api_url: Option<String>,

    /// Token list URL
    #[arg(long, env = "PITEAS_TOKEN_LIST_URL", global = true)]
    pub token_list_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tokens available for swapping
    Tokens,

    /// Show the wallet's balance of every listed token
    Balances,

    /// Read symbol, decimals and balance of a token contract
    Token(TokenArgs),

    /// Fetch a swap quote
    Quote(QuoteArgs),

    /// Fetch a quote and execute it
    Swap(QuoteArgs),
}

/// Arguments for the `token` subcommand.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Token contract address
    #[arg(value_parser = parse_address)]
    pub address: Address,
}

/// Arguments for the `quote` and `swap` subcommands.
#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Input token: PLS, a symbol from the list, or a contract address
    #[arg(long)]
    pub from: String,

    /// Output token: PLS, a symbol from the list, or a contract address
    #[arg(long)]
    pub to: String,

    /// Amount of the input token (e.g. 2.5)
    pub amount: String,

    /// Slippage tolerance in percent
    #[arg(long)]
    pub slippage: Option<Decimal>,

    /// Send the output to this address instead of the wallet
    #[arg(long, value_parser = parse_address)]
    pub receiver: Option<Address>,
}

fn parse_address(s: &str) -> Result<Address, String> {
    let s = s.trim();
    if !s.starts_with("0x") || s.len() != 42 {
        return Err(format!("expected a 0x-prefixed 20-byte address, got {s:?}"));
    }
    s.parse().map_err(|e| format!("invalid address {s:?}: {e:?}"))
}
