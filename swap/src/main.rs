mod approval;
mod balances;
mod cli;
mod config;
mod desk;
mod error;
mod executor;
mod output;
mod quoter;
mod registry;
mod session;
#[cfg(test)]
mod testing;
mod wallet;

use std::sync::Arc;

use clap::Parser;
use cli::{Command, QuoteArgs};
use piteas::{EvmChain, WalletProvider};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::SwapConfig;
use crate::desk::SwapDesk;
use crate::error::SwapError;
use crate::quoter::QuoteRequest;
use crate::wallet::{Confirm, KeyWallet};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv(); // load .env if present, before env-backed flags are read

    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cancel = setup_signal_handlers();

    let mut config = SwapConfig::default();
    if let Some(url) = cli.rpc_url {
        config.network.rpc_url = url;
    }
    if let Some(url) = cli.quote_api_url {
        config.network.quote_api_url = url;
    }
    if let Some(url) = cli.token_list_url {
        config.network.token_list_url = url;
    }
    let confirm = if cli.yes {
        Confirm::Always
    } else {
        Confirm::Prompt
    };

    let result = tokio::select! {
        r = run(cli.command, config, confirm, cli.json) => r,
        _ = cancel.cancelled() => {
            warn!("interrupted");
            std::process::exit(130);
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn run(
    command: Command,
    config: SwapConfig,
    confirm: Confirm,
    json: bool,
) -> Result<(), SwapError> {
    let reader = EvmChain::new(&config.network.rpc_url).map_err(|e| SwapError::Config(e.to_string()))?;
    let wallet = load_wallet(&config, confirm)?;
    let mut desk = SwapDesk::new(config, Arc::new(reader), wallet);
    let mut stdout = std::io::stdout();

    match command {
        Command::Tokens => {
            desk.load_tokens().await?;
            output::write_tokens(&mut stdout, desk.registry().tokens(), json)?;
        }

        Command::Balances => {
            desk.connect().await?;
            desk.load_tokens().await?;
            desk.refresh_balances().await?;
            output::write_balances(
                &mut stdout,
                desk.registry().tokens(),
                desk.balances(),
                json,
            )?;
        }

        Command::Token(args) => {
            if desk.has_wallet() {
                desk.connect().await?;
            }
            let info = desk.inspect_token(args.address).await?;
            output::write_token_info(&mut stdout, &info, json)?;
        }

        Command::Quote(args) => {
            prepare(&mut desk, false).await?;
            let request = build_request(&desk, &args)?;
            let quote = desk.request_quote(&request).await?;
            output::write_quote(&mut stdout, &quote, json)?;
        }

        Command::Swap(args) => {
            prepare(&mut desk, true).await?;
            let request = build_request(&desk, &args)?;
            if !request.token_in.is_native() {
                let balance = desk.refresh_balance(&request.token_in).await?;
                info!(balance = %balance.formatted(), "input token balance");
            }
            let quote = desk.request_quote(&request).await?;
            output::write_quote(&mut stdout, &quote, json)?;
            let receipt = desk.execute_swap(&request).await?;
            output::write_receipt(&mut stdout, &receipt, json)?;

            desk.refresh_native_balance().await;
            info!(
                balance = %desk.session().native_balance_formatted(),
                "native balance after swap"
            );
        }
    }

    desk.disconnect();
    Ok(())
}

/// Load the token list (best effort) and connect the wallet when one is
/// configured. `require_wallet` turns a missing wallet into an error.
async fn prepare(desk: &mut SwapDesk, require_wallet: bool) -> Result<(), SwapError> {
    if let Err(e) = desk.load_tokens().await {
        warn!(error = %e, "continuing without token list");
    }
    if require_wallet || desk.has_wallet() {
        desk.connect().await?;
    }
    Ok(())
}

fn build_request(desk: &SwapDesk, args: &QuoteArgs) -> Result<QuoteRequest, SwapError> {
    Ok(QuoteRequest {
        token_in: desk.resolve_token(&args.from)?,
        token_out: desk.resolve_token(&args.to)?,
        amount: args.amount.clone(),
        slippage: args.slippage.unwrap_or(desk.config().default_slippage),
        receiver: args.receiver,
    })
}

/// Wallet from `PRIVATE_KEY`, if set.
fn load_wallet(
    config: &SwapConfig,
    confirm: Confirm,
) -> Result<Option<Arc<dyn WalletProvider>>, SwapError> {
    let Ok(private_key) = std::env::var("PRIVATE_KEY") else {
        return Ok(None);
    };
    let wallet = KeyWallet::from_private_key(&config.network, &private_key, confirm)
        .map_err(|e| SwapError::Config(e.to_string()))?;
    Ok(Some(Arc::new(wallet)))
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            let mut sig = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
            sig.recv().await;
            info!("received SIGTERM, shutting down");
            cancel_clone.cancel();
        });
    }

    cancel
}
