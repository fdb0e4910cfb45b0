use ethers::types::U256;

use crate::error::{PiteasError, Result};
use crate::types::{TokenAddress, TokenDescriptor};

/// `10^decimals`, or `None` when it does not fit in a `U256`.
fn ten_pow(decimals: u8) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(decimals))
}

/// Parse a human decimal string (`"2.5"`) into smallest units.
///
/// # Errors
///
/// Returns `PiteasError::Conversion` for malformed input, more fractional
/// digits than `decimals`, or a result that overflows `U256`.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    let invalid = || PiteasError::Conversion(format!("invalid amount: {amount:?}"));

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }
    if frac_part.len() > decimals as usize {
        return Err(PiteasError::Conversion(format!(
            "{amount} has more than {decimals} fractional digits"
        )));
    }

    let overflow = || PiteasError::Conversion(format!("amount overflows: {amount} * 10^{decimals}"));

    let int_value = if int_part.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(int_part).map_err(|_| overflow())?
    };
    let frac_value = if frac_part.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{frac_part:0<width$}", width = decimals as usize);
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    // Past 77 decimals `10^decimals` leaves U256, so only a zero integer part fits.
    let scaled = if int_value.is_zero() {
        U256::zero()
    } else {
        ten_pow(decimals)
            .and_then(|scale| int_value.checked_mul(scale))
            .ok_or_else(overflow)?
    };
    scaled.checked_add(frac_value).ok_or_else(overflow)
}

/// Format smallest units as the shortest decimal string (`"1.5"`, `"0"`).
///
/// Inverse of [`parse_amount`] for every value it produces.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    format_amount_padded(amount, decimals, 0)
}

/// Format smallest units keeping at least `min_fraction_digits` digits after
/// the point (`format_amount_padded(10^18, 18, 6) == "1.000000"`).
pub fn format_amount_padded(amount: U256, decimals: u8, min_fraction_digits: usize) -> String {
    let decimals = decimals as usize;
    let digits = format!("{:0>width$}", amount.to_string(), width = decimals + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - decimals);

    let mut frac = frac_part.to_string();
    while frac.len() > min_fraction_digits && frac.ends_with('0') {
        frac.pop();
    }
    while frac.len() < min_fraction_digits {
        frac.push('0');
    }

    if frac.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac}")
    }
}

/// Find a token descriptor by address.
pub fn find_token<'a>(tokens: &'a [TokenDescriptor], address: &TokenAddress) -> Option<&'a TokenDescriptor> {
    tokens.iter().find(|t| &t.address == address)
}
