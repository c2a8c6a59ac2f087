//! Binary rendering of bitmask values for diagnostics.

use crate::error::{EcsError, EcsResult};

/// Largest integer exactly representable in an IEEE-754 double.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Renders `value` as a binary string of at least four digits.
///
/// Negative values are shown in 53-bit two's complement.
///
/// # Errors
///
/// Returns [`EcsError::UnsafeInteger`] if `value` lies outside
/// `±MAX_SAFE_INTEGER`.
pub fn bin(value: i64) -> EcsResult<String> {
    if !(-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
        return Err(EcsError::UnsafeInteger(value));
    }
    let twos_complement = if value < 0 {
        MAX_SAFE_INTEGER + value + 1
    } else {
        value
    };
    Ok(format!("{twos_complement:04b}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_small_values() {
        assert_eq!(bin(0).unwrap(), "0000");
        assert_eq!(bin(5).unwrap(), "0101");
        assert_eq!(bin(1 << 30).unwrap().len(), 31);
    }

    #[test]
    fn test_negative_is_twos_complement() {
        let rendered = bin(-1).unwrap();
        assert_eq!(rendered.len(), 53);
        assert!(rendered.chars().all(|c| c == '1'));
    }

    #[test]
    fn test_rejects_unsafe_integers() {
        assert!(matches!(bin(1 << 53), Err(EcsError::UnsafeInteger(_))));
        assert!(matches!(bin(i64::MIN), Err(EcsError::UnsafeInteger(_))));
        assert!(bin(MAX_SAFE_INTEGER).is_ok());
    }
}
