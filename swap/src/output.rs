use std::io::Write;

use piteas::TokenDescriptor;
use serde_json::json;

use crate::balances::BalanceAggregator;
use crate::error::SwapError;
use crate::executor::SwapReceipt;
use crate::quoter::Quote;
use crate::registry::TokenInfo;

/// Token list: `symbol \t address \t decimals`.
pub fn write_tokens<W: Write>(
    writer: &mut W,
    tokens: &[TokenDescriptor],
    json_mode: bool,
) -> Result<(), SwapError> {
    for token in tokens {
        if json_mode {
            serde_json::to_writer(&mut *writer, token)?;
            writeln!(writer)?;
        } else {
            writeln!(writer, "{}\t{}\t{}", token.symbol, token.address, token.decimals)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Balances in registry order: `symbol \t balance`. Failed reads are marked.
pub fn write_balances<W: Write>(
    writer: &mut W,
    tokens: &[TokenDescriptor],
    balances: &BalanceAggregator,
    json_mode: bool,
) -> Result<(), SwapError> {
    for token in tokens {
        let Some(balance) = balances.get(&token.address) else {
            continue;
        };
        let formatted = balance.formatted();
        if json_mode {
            let line = json!({
                "symbol": token.symbol,
                "address": token.address,
                "balance": formatted,
                "failed": balance.failed,
            });
            writeln!(writer, "{line}")?;
        } else if balance.failed {
            writeln!(writer, "{}\t{}\t(failed)", token.symbol, formatted)?;
        } else {
            writeln!(writer, "{}\t{}", token.symbol, formatted)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_token_info<W: Write>(
    writer: &mut W,
    info: &TokenInfo,
    json_mode: bool,
) -> Result<(), SwapError> {
    if json_mode {
        serde_json::to_writer(&mut *writer, info)?;
        writeln!(writer)?;
    } else {
        match &info.balance {
            Some(balance) => writeln!(writer, "{} - {}", info.symbol, balance)?,
            None => writeln!(writer, "{}\t{} decimals", info.symbol, info.decimals)?,
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_quote<W: Write>(writer: &mut W, quote: &Quote, json_mode: bool) -> Result<(), SwapError> {
    if json_mode {
        let line = json!({
            "inputToken": quote.input_token,
            "outputToken": quote.output_token,
            "inputAmount": quote.input_amount,
            "estimatedOutput": quote.estimated_output,
            "gasFee": quote.gas_fee(),
            "calldata": quote.calldata,
            "fetchedAt": quote.fetched_at,
        });
        writeln!(writer, "{line}")?;
    } else {
        writeln!(writer, "input\t{} {}", quote.input_amount, quote.input_token)?;
        writeln!(
            writer,
            "output\t{} {}",
            quote.estimated_output, quote.output_token
        )?;
        writeln!(writer, "gas\t{}", quote.gas_fee())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_receipt<W: Write>(
    writer: &mut W,
    receipt: &SwapReceipt,
    json_mode: bool,
) -> Result<(), SwapError> {
    let tx_hash = format!("{:#x}", receipt.tx_hash);
    if json_mode {
        let line = json!({
            "txHash": tx_hash,
            "explorerUrl": receipt.explorer_url,
        });
        writeln!(writer, "{line}")?;
    } else {
        writeln!(writer, "tx\t{tx_hash}")?;
        writeln!(writer, "explorer\t{}", receipt.explorer_url)?;
    }
    writer.flush()?;
    Ok(())
}
