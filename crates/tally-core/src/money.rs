//! Fixed-point currency amounts
//!
//! An amount is a signed number of cents in an `i64`. The textual form is
//! `D.CC` with the cent part always two digits and the sign written once,
//! so `-0.50` and `1234.05` both round-trip exactly. Floating point never
//! enters the representation.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A currency amount with cent precision
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

/// Raised when a token is not a valid `D.CC` amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{0}\" is not a valid amount")]
pub struct ParseMoneyError(pub String);

impl Money {
    /// The zero amount
    pub const ZERO: Money = Money { cents: 0 };

    /// Build an amount from a total number of cents
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Build an amount from a dollar part and a cent part (0..100)
    ///
    /// The sign is taken from `dollars`; `cents` is the unsigned fractional
    /// part, so `from_parts(-12, 50)` is `-12.50`.
    pub const fn from_parts(dollars: i64, cents: i64) -> Self {
        if dollars < 0 {
            Self {
                cents: dollars * 100 - cents,
            }
        } else {
            Self {
                cents: dollars * 100 + cents,
            }
        }
    }

    /// Total number of cents, sign included
    pub const fn total_cents(self) -> i64 {
        self.cents
    }

    /// Whole dollar part, truncated toward zero
    pub const fn dollars(self) -> i64 {
        self.cents / 100
    }

    /// Fractional cent part, always in 0..100
    pub const fn cents(self) -> i64 {
        (self.cents % 100).abs()
    }

    pub const fn is_zero(self) -> bool {
        self.cents == 0
    }

    pub const fn is_negative(self) -> bool {
        self.cents < 0
    }

    /// Absolute value
    pub const fn abs(self) -> Self {
        Self {
            cents: self.cents.abs(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Accepts `D`, `D.C` and `D.CC`, with an optional leading `-`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoneyError(s.to_string());

        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (dollar_part, cent_part) = match rest.split_once('.') {
            Some((dollars, cents)) => (dollars, Some(cents)),
            None => (rest, None),
        };

        if dollar_part.is_empty() || !dollar_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let dollars: i64 = dollar_part.parse().map_err(|_| err())?;

        let cents: i64 = match cent_part {
            None => 0,
            Some(part) if !part.bytes().all(|b| b.is_ascii_digit()) => return Err(err()),
            Some(part) => match part.len() {
                1 => part.parse::<i64>().map_err(|_| err())? * 10,
                2 => part.parse().map_err(|_| err())?,
                _ => return Err(err()),
            },
        };

        let total = dollars * 100 + cents;
        Ok(Money {
            cents: if negative { -total } else { total },
        })
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.cents += rhs.cents;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.cents -= rhs.cents;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money { cents: -self.cents }
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money {
            cents: self.cents * rhs,
        }
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_parts(1234, 5).to_string(), "1234.05");
        assert_eq!(Money::from_parts(0, 0).to_string(), "0.00");
        assert_eq!(Money::from_parts(-12, 50).to_string(), "-12.50");
        assert_eq!(Money::from_cents(-50).to_string(), "-0.50");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
    }

    #[test]
    fn test_parse() {
        assert_eq!("123.45".parse::<Money>().unwrap(), Money::from_parts(123, 45));
        assert_eq!("123".parse::<Money>().unwrap(), Money::from_parts(123, 0));
        assert_eq!("123.5".parse::<Money>().unwrap(), Money::from_parts(123, 50));
        assert_eq!("-12.03".parse::<Money>().unwrap(), Money::from_parts(-12, 3));
        assert_eq!("-0.50".parse::<Money>().unwrap(), Money::from_cents(-50));
        assert_eq!("0.00".parse::<Money>().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for token in ["", "-", ".", "12.", ".50", "12.345", "12,34", "a.bc", "1 2", "--3", "+4"] {
            assert!(token.parse::<Money>().is_err(), "accepted {:?}", token);
        }
    }

    #[test]
    fn test_round_trip() {
        for amount in [
            Money::ZERO,
            Money::from_parts(1, 0),
            Money::from_parts(0, 99),
            Money::from_parts(-1234, 56),
            Money::from_cents(-1),
        ] {
            assert_eq!(amount.to_string().parse::<Money>().unwrap(), amount);
        }
    }

    #[test]
    fn test_parts() {
        let amount = Money::from_parts(-12, 34);
        assert_eq!(amount.dollars(), -12);
        assert_eq!(amount.cents(), 34);
        assert_eq!(amount.total_cents(), -1234);
        assert!(amount.is_negative());
        assert!(!amount.is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_parts(10, 50);
        let b = Money::from_parts(2, 75);

        assert_eq!(a + b, Money::from_parts(13, 25));
        assert_eq!(a - b, Money::from_parts(7, 75));
        assert_eq!(-a, Money::from_parts(-10, 50));
        assert_eq!(b * 4, Money::from_parts(11, 0));

        let mut total = Money::ZERO;
        total += a;
        total -= b;
        assert_eq!(total, Money::from_parts(7, 75));

        let sum: Money = [a, b, b].into_iter().sum();
        assert_eq!(sum, Money::from_parts(16, 0));
    }

    #[test]
    fn test_ordering() {
        assert!(Money::from_parts(-1, 0) < Money::ZERO);
        assert!(Money::from_parts(2, 0) > Money::from_parts(1, 99));
    }
}
