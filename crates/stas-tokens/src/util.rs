//! Amount conversions.

use crate::config::SATS_PER_BITCOIN;
use crate::error::TokenError;

/// Convert a coin amount to satoshis, rounding to the nearest satoshi.
pub fn bitcoin_to_satoshis(amount: f64) -> Result<u64, TokenError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(TokenError::InvalidAmount(format!(
            "{} is not a valid coin amount",
            amount
        )));
    }
    let satoshis = (amount * SATS_PER_BITCOIN as f64).round();
    if satoshis >= u64::MAX as f64 {
        return Err(TokenError::InvalidAmount(format!(
            "{} coins overflows satoshis",
            amount
        )));
    }
    Ok(satoshis as u64)
}

/// Number of whole token units carried by `satoshis`.
///
/// Fails if the rate is zero or the value is not a whole number of units.
pub fn satoshis_to_tokens(satoshis: u64, satoshis_per_token: u64) -> Result<u64, TokenError> {
    if satoshis_per_token == 0 {
        return Err(TokenError::InvalidAmount(
            "satoshis per token must be at least 1".into(),
        ));
    }
    if satoshis % satoshis_per_token != 0 {
        return Err(TokenError::InvalidAmount(format!(
            "{} satoshis is not a multiple of {} satoshis per token",
            satoshis, satoshis_per_token
        )));
    }
    Ok(satoshis / satoshis_per_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_amounts() {
        assert_eq!(bitcoin_to_satoshis(0.00005).unwrap(), 5000);
        assert_eq!(bitcoin_to_satoshis(0.000015).unwrap(), 1500);
        assert_eq!(bitcoin_to_satoshis(1.0).unwrap(), SATS_PER_BITCOIN);
        assert_eq!(bitcoin_to_satoshis(0.0).unwrap(), 0);
        // 0.1 + 0.2 style float noise rounds away
        assert_eq!(bitcoin_to_satoshis(0.1 + 0.2).unwrap(), 30_000_000);
    }

    #[test]
    fn coin_amount_rejects_negative_and_nan() {
        assert!(matches!(bitcoin_to_satoshis(-1.0), Err(TokenError::InvalidAmount(_))));
        assert!(matches!(bitcoin_to_satoshis(f64::NAN), Err(TokenError::InvalidAmount(_))));
        assert!(matches!(bitcoin_to_satoshis(f64::INFINITY), Err(TokenError::InvalidAmount(_))));
        assert!(matches!(bitcoin_to_satoshis(1e12), Err(TokenError::InvalidAmount(_))));
    }

    #[test]
    fn token_units() {
        assert_eq!(satoshis_to_tokens(7500, 1).unwrap(), 7500);
        assert_eq!(satoshis_to_tokens(10_000, 100).unwrap(), 100);
        assert!(satoshis_to_tokens(10_050, 100).is_err());
        assert!(satoshis_to_tokens(100, 0).is_err());
    }
}
