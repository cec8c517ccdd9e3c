use std::borrow::Cow;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use typed_builder::TypedBuilder;

use super::currency::quote_currency;
use super::Currency;

/// A signed number of units of a certain commodity, as it appears in a posting.
///
/// The displayed sign is the exclusive-or of the number's sign and `reverse`, so the same value
/// renders both a posting and its contra-posting:
///
/// ```text
/// Assets:Checking                        $100.00
/// Expenses:Misc                         -$100.00
/// ```
///
/// Single-character commodities are printed before the number (`$100.00`), longer ones after it
/// separated by a space (`100.00 EUR`).
#[derive(Clone, Debug, Eq, PartialEq, TypedBuilder)]
pub struct Amount<'a> {
    /// The value of the amount.
    pub num: Decimal,

    /// The commodity of the amount.
    pub currency: Currency<'a>,

    /// Flip the displayed sign.
    #[builder(default)]
    pub reverse: bool,

    /// Print the number at full precision instead of rounding to two places.
    #[builder(default)]
    pub unlimited: bool,
}

impl<'a> Amount<'a> {
    pub fn new<C: Into<Currency<'a>>>(num: Decimal, currency: C) -> Self {
        Amount {
            num,
            currency: currency.into(),
            reverse: false,
            unlimited: false,
        }
    }

    /// Same value and commodity, with the displayed sign flipped.
    pub fn reversed(self) -> Self {
        Amount {
            reverse: !self.reverse,
            ..self
        }
    }

    /// Same value and commodity, printed at full precision.
    pub fn unlimited(self) -> Self {
        Amount {
            unlimited: true,
            ..self
        }
    }

    /// The value as it is displayed, with `reverse` applied.
    pub fn signed(&self) -> Decimal {
        if self.reverse {
            -self.num
        } else {
            self.num
        }
    }

    pub fn format(&self) -> String {
        self.to_string()
    }

    fn number(&self) -> String {
        let abs = self.num.abs();
        if self.unlimited {
            abs.to_string()
        } else {
            let mut rounded = abs.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
            rounded.rescale(2);
            rounded.to_string()
        }
    }
}

impl fmt::Display for Amount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let currency: Cow<'_, str> = quote_currency(&self.currency);
        let prefix = if self.num.is_sign_negative() != self.reverse {
            "-"
        } else {
            ""
        };
        if currency.chars().count() == 1 {
            write!(f, "{}{}{}", prefix, currency, self.number())
        } else {
            write!(f, "{}{} {}", prefix, self.number(), currency)
        }
    }
}
