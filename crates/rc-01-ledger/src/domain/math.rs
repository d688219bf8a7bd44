//! Proportional share arithmetic.
//!
//! `value * numerator / denominator` is evaluated in 256 bits so the product
//! of two 128-bit amounts never overflows; only the quotient must fit back
//! into an [`Amount`].

use super::errors::LedgerError;
use primitive_types::U256;
use shared_types::Amount;

/// Rounding direction of a proportional split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero.
    Floor,
    /// Away from zero.
    Ceil,
}

/// Computes `value * numerator / denominator` with the given rounding.
///
/// # Errors
///
/// - `LedgerError::Overflow` if `denominator == 0` or the quotient exceeds 128 bits
pub fn mul_div(
    value: Amount,
    numerator: Amount,
    denominator: Amount,
    rounding: Rounding,
) -> Result<Amount, LedgerError> {
    if denominator == 0 {
        return Err(LedgerError::Overflow {
            context: "proportional split by zero",
        });
    }

    let product = U256::from(value) * U256::from(numerator);
    let (mut quotient, remainder) = product.div_mod(U256::from(denominator));
    if rounding == Rounding::Ceil && !remainder.is_zero() {
        quotient += U256::one();
    }

    if quotient.bits() > 128 {
        return Err(LedgerError::Overflow {
            context: "proportional split",
        });
    }
    Ok(quotient.low_u128())
}

/// Share of `backing` attributable to `amount` out of `balance`.
///
/// Moving the whole balance short-circuits to the whole backing so no dust is
/// left behind, whatever the rounding.
///
/// Callers check `amount <= balance` first.
///
/// # Errors
///
/// - `LedgerError::Overflow` if `balance == 0` while `amount != 0`
pub fn proportional_backing(
    backing: Amount,
    amount: Amount,
    balance: Amount,
    rounding: Rounding,
) -> Result<Amount, LedgerError> {
    if amount == balance {
        return Ok(backing);
    }
    mul_div(backing, amount, balance, rounding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_division() {
        assert_eq!(mul_div(1000, 250, 1000, Rounding::Floor).unwrap(), 250);
        assert_eq!(mul_div(1000, 250, 1000, Rounding::Ceil).unwrap(), 250);
    }

    #[test]
    fn test_rounding_directions() {
        // 10 * 1 / 3 = 3.33..
        assert_eq!(mul_div(10, 1, 3, Rounding::Floor).unwrap(), 3);
        assert_eq!(mul_div(10, 1, 3, Rounding::Ceil).unwrap(), 4);
    }

    #[test]
    fn test_no_intermediate_overflow() {
        let big = u128::MAX;
        assert_eq!(mul_div(big, big, big, Rounding::Floor).unwrap(), big);
    }

    #[test]
    fn test_quotient_overflow() {
        let result = mul_div(u128::MAX, 2, 1, Rounding::Floor);
        assert!(matches!(result, Err(LedgerError::Overflow { .. })));
    }

    #[test]
    fn test_zero_denominator() {
        assert!(mul_div(1, 1, 0, Rounding::Floor).is_err());
    }

    #[test]
    fn test_full_balance_short_circuit() {
        // 7 backing on 3 units: a full move takes all 7, never 6 or 8.
        assert_eq!(proportional_backing(7, 3, 3, Rounding::Floor).unwrap(), 7);
        assert_eq!(proportional_backing(7, 3, 3, Rounding::Ceil).unwrap(), 7);
        assert_eq!(proportional_backing(7, 1, 3, Rounding::Floor).unwrap(), 2);
        assert_eq!(proportional_backing(7, 1, 3, Rounding::Ceil).unwrap(), 3);
    }
}
