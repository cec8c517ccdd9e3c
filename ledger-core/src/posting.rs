use std::fmt;

use typed_builder::TypedBuilder;

use super::amount::Amount;
use super::AccountName;

/// Column at which amounts are right-aligned, including the indentation.
pub const AMOUNT_COLUMN: usize = 52;

/// Smallest gap between an account name and its amount.
pub const MIN_GAP: usize = 2;

/// Represents a transaction posting.  Postings represent a single amount being deposited to or
/// withdrawn from an account.
///
/// A posting may carry a balance assertion after `=`, or a per-unit price after `@`:
///
/// ```text
/// 2011/03/31 * --Autosync Balance Assertion
///     Assets:Checking                         $0.00 = $1234.56
///
/// 2011/03/31 Buy fund
///     Assets:Brokerage                 12.3 FUND @ $8.12
///     Assets:Unknown                        -$99.88
/// ```
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Posting<'a> {
    /// Account being posted to.
    pub account: AccountName<'a>,

    /// The amount being posted.
    pub amount: Amount<'a>,

    #[builder(default = 4)]
    pub indent: usize,

    /// Expected running balance of the account after this posting.
    #[builder(default)]
    pub asserted: Option<Amount<'a>>,

    /// Price of a single unit of `amount`.
    #[builder(default)]
    pub unit_price: Option<Amount<'a>>,
}

impl<'a> Posting<'a> {
    pub fn new<A: Into<AccountName<'a>>>(account: A, amount: Amount<'a>) -> Self {
        Posting {
            account: account.into(),
            amount,
            indent: 4,
            asserted: None,
            unit_price: None,
        }
    }

    /// Renders the posting line, newline included, indented by `indent` spaces.
    pub fn format(&self, indent: usize) -> String {
        let amount = self.amount.format();
        let used = indent + self.account.chars().count() + amount.chars().count();
        let gap = AMOUNT_COLUMN.saturating_sub(used).max(MIN_GAP);

        let mut line = format!(
            "{}{}{}{}",
            " ".repeat(indent),
            self.account,
            " ".repeat(gap),
            amount
        );
        if let Some(asserted) = &self.asserted {
            line = format!("{} = {}", line, asserted);
        }
        if let Some(unit_price) = &self.unit_price {
            line = format!("{} @ {}", line, unit_price);
        }
        line.push('\n');
        line
    }
}

impl fmt::Display for Posting<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(self.indent))
    }
}
