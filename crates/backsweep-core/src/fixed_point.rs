//! Fixed-point price/quantity codec.
//!
//! Every tick field that crosses an engine boundary travels as a scaled
//! `i64` with an implicit scale of [`SCALE`] (10^8), so a multi-million-row
//! backtest never accumulates floating-point drift in its ledger.

use std::fmt;
use std::str::FromStr;

/// Scale factor: 1 real unit = `SCALE` fixed-point units.
pub const SCALE: i64 = 100_000_000;
const SCALE_F: f64 = SCALE as f64;

/// Scale a real value into its fixed-point representation.
///
/// Rounds half-to-even (banker's rounding) at the `SCALE`-th decimal digit,
/// per the wire invariant: two independent encoders of the same input must
/// agree bit-for-bit, which round-half-away-from-zero does not guarantee
/// near exact `.5` boundaries.
pub fn to_fixed(x: f64) -> i64 {
    round_half_to_even(x * SCALE_F) as i64
}

/// Unscale a fixed-point value back to its real representation.
pub fn to_real(v: i64) -> f64 {
    v as f64 / SCALE_F
}

fn round_half_to_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

/// A fixed-point scalar, wire-compatible with the `i64` columns of a
/// [`crate::batch::TickBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedPoint(pub i64);

impl FixedPoint {
    pub fn from_real(x: f64) -> Self {
        FixedPoint(to_fixed(x))
    }

    pub fn to_real(self) -> f64 {
        to_real(self.0)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8}", self.to_real())
    }
}

/// Error returned when a string cannot be parsed as a decimal literal.
#[derive(Debug, thiserror::Error)]
#[error("invalid fixed-point literal: {0:?}")]
pub struct ParseFixedPointError(String);

impl FromStr for FixedPoint {
    type Err = ParseFixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .map(FixedPoint::from_real)
            .map_err(|_| ParseFixedPointError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_epsilon() {
        for x in [0.0_f64, 1.0, 50_000.12345678, 1e10, 99_999_999_999.0] {
            let fixed = to_fixed(x);
            let back = to_real(fixed);
            assert!((back - x).abs() < 1e-7, "x={x} back={back}");
        }
    }

    #[test]
    fn round_half_to_even_boundary() {
        // 2.5 -> 2 (even), 3.5 -> 4 (even)
        assert_eq!(round_half_to_even(2.5), 2.0);
        assert_eq!(round_half_to_even(3.5), 4.0);
        assert_eq!(round_half_to_even(-2.5), -2.0);
    }

    #[test]
    fn display_has_eight_decimals() {
        let fp = FixedPoint::from_str("123.456").unwrap();
        assert_eq!(fp.to_string(), "123.45600000");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(FixedPoint::from_str("not-a-number").is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_round_trip(x in 0.0_f64..1e11) {
            let back = to_real(to_fixed(x));
            proptest::prop_assert!((back - x).abs() < 1e-7);
        }
    }
}
