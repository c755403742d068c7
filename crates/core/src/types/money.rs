//! Currency amounts and locale-aware display formatting.
//!
//! Amounts coming from the backend are decimal values in the store currency.
//! Display always uses two fraction digits and groups the integer part by
//! thousands using the separators of the configured [`NumberLocale`].

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency symbol prefixed to every formatted amount.
const CURRENCY_SYMBOL: &str = "$";

/// A monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero, used as the fallback for every missing amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Format as currency, e.g. `$1,234.56` in `en-US`.
    ///
    /// Rounds half away from zero to two places. Negative amounts render
    /// with a leading minus (`-$12.00`); amounts that round to zero never
    /// carry a sign.
    ///
    /// ```
    /// use erp_shell_core::{Money, NumberLocale};
    /// use rust_decimal::Decimal;
    ///
    /// let money = Money::new(Decimal::new(123_456_789, 2));
    /// assert_eq!(money.format(NumberLocale::EnUs), "$1,234,567.89");
    /// assert_eq!(money.format(NumberLocale::DeDe), "$1.234.567,89");
    /// ```
    #[must_use]
    pub fn format(self, locale: NumberLocale) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        format!(
            "{sign}{CURRENCY_SYMBOL}{}{}{fraction}",
            group_thousands(whole, locale.group_separator()),
            locale.decimal_separator()
        )
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Insert `separator` between each group of three digits, counting from the right.
fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

/// Error returned when parsing an unsupported locale tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

/// Numeric grouping conventions supported by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberLocale {
    /// `1,234.56`
    #[default]
    EnUs,
    /// `1,234.56`
    EnGb,
    /// `1.234,56`
    DeDe,
    /// `1 234,56` (narrow no-break space)
    FrFr,
}

impl NumberLocale {
    /// Separator placed between groups of three integer digits.
    #[must_use]
    pub const fn group_separator(self) -> &'static str {
        match self {
            Self::EnUs | Self::EnGb => ",",
            Self::DeDe => ".",
            Self::FrFr => "\u{202f}",
        }
    }

    /// Separator between the integer and fraction digits.
    #[must_use]
    pub const fn decimal_separator(self) -> &'static str {
        match self {
            Self::EnUs | Self::EnGb => ".",
            Self::DeDe | Self::FrFr => ",",
        }
    }

    /// BCP 47 tag for this locale.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::EnGb => "en-GB",
            Self::DeDe => "de-DE",
            Self::FrFr => "fr-FR",
        }
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NumberLocale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept POSIX-style tags too (en_US, de_DE.UTF-8)
        let normalized = s.split('.').next().unwrap_or(s).replace('_', "-");
        [Self::EnUs, Self::EnGb, Self::DeDe, Self::FrFr]
            .into_iter()
            .find(|locale| locale.tag().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownLocale(s.to_string()))
    }
}
