use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const FRACTION_DIGITS: usize = 8;

/// An exact currency amount, counted in indivisible units.
///
/// Amounts are signed so that a malformed output carrying a negative value can be represented
/// and rejected by validation instead of failing to parse.
#[derive(
    Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct Coin(i64);

impl Coin {
    /// Number of units in one whole coin.
    pub const COIN: i64 = 100_000_000;

    pub const fn from_units(units: i64) -> Self {
        Coin(units)
    }

    /// Amount of whole coins, for literal amounts.
    ///
    /// Panics if `coins` does not fit in the unit range; parse untrusted amounts with
    /// `FromStr` instead.
    pub const fn from_coins(coins: i64) -> Self {
        match coins.checked_mul(Self::COIN) {
            Some(units) => Coin(units),
            None => panic!("Coin amount out of range"),
        }
    }

    pub const fn zero() -> Self {
        Self::from_units(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Coin)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Coin(self.0.saturating_add(rhs.0))
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Coin)
    }

    /// Sums the amounts, returning `None` if the total does not fit.
    pub fn checked_sum<I: IntoIterator<Item = Coin>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |sum, amount| sum.checked_add(amount))
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let coin = Self::COIN as u64;
        write!(
            f,
            "{}{}.{:0width$} SCR",
            sign,
            abs / coin,
            abs % coin,
            width = FRACTION_DIGITS
        )
    }
}

/// Parses a decimal amount of whole coins, e.g. `10`, `0.5` or `-1`.
/// An optional ` SCR` suffix is accepted so displayed amounts parse back.
impl FromStr for Coin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches("SCR").trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(format!("Invalid amount: {}", s));
        }
        if fraction.len() > FRACTION_DIGITS {
            return Err(format!(
                "Amount: {} has more than {} fractional digits",
                s, FRACTION_DIGITS
            ));
        }

        let overflow = || format!("Amount out of range: {}", s);
        let whole_units = whole
            .parse::<i64>()
            .map_err(|_| overflow())?
            .checked_mul(Self::COIN)
            .ok_or_else(overflow)?;
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = FRACTION_DIGITS);
            padded.parse::<i64>().map_err(|_| overflow())?
        };
        let units = whole_units
            .checked_add(fraction_units)
            .ok_or_else(overflow)?;
        Ok(Coin(if negative { -units } else { units }))
    }
}

#[cfg(test)]
mod tests {
    use crate::Coin;

    #[test]
    fn parse_test() {
        assert_eq!("10".parse::<Coin>(), Ok(Coin::from_coins(10)));
        assert_eq!("0.5".parse::<Coin>(), Ok(Coin::from_units(50_000_000)));
        assert_eq!("-1".parse::<Coin>(), Ok(Coin::from_coins(-1)));
        assert_eq!("0.00000001".parse::<Coin>(), Ok(Coin::from_units(1)));
        assert!("0.000000001".parse::<Coin>().is_err());
        assert!("1.2.3".parse::<Coin>().is_err());
        assert!("".parse::<Coin>().is_err());
        assert!("99999999999999999999".parse::<Coin>().is_err());
    }

    #[test]
    fn display_test() {
        assert_eq!(Coin::from_coins(7).to_string(), "7.00000000 SCR");
        assert_eq!(Coin::from_units(-150_000_000).to_string(), "-1.50000000 SCR");
        assert_eq!(
            Coin::from_units(-150_000_000).to_string().parse::<Coin>(),
            Ok(Coin::from_units(-150_000_000))
        );
    }

    #[test]
    fn checked_sum_test() {
        let amounts = vec![Coin::from_coins(1), Coin::from_coins(2), Coin::from_units(3)];
        assert_eq!(
            Coin::checked_sum(amounts),
            Some(Coin::from_units(300_000_003))
        );
        assert_eq!(
            Coin::checked_sum(vec![Coin::from_units(i64::MAX), Coin::from_units(1)]),
            None
        );
        assert_eq!(Coin::checked_sum(Vec::new()), Some(Coin::zero()));
    }

    #[test]
    #[should_panic(expected = "Coin amount out of range")]
    fn from_coins_out_of_range_test() {
        Coin::from_coins(i64::MAX / Coin::COIN + 1);
    }
}
