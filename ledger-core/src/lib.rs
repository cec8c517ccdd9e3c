use std::borrow::Cow;

pub use amount::Amount;
pub use currency::{normalize_currency, quote_currency};
pub use posting::Posting;

pub mod amount;
pub mod currency;
pub mod posting;

/// Commodity label attached to an amount, e.g. `$`, `EUR` or a security ticker.
pub type Currency<'a> = Cow<'a, str>;

/// Account name, a colon-separated list of components.
///
/// Some example accounts:
///
/// ```text
/// Assets:Checking
/// Liabilities:CreditCard
/// Expenses:Misc
/// ```
pub type AccountName<'a> = Cow<'a, str>;
