use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use ledger_core::{Amount, Posting};

use crate::converter::{Converter, ConverterConfig, LedgerLookup, Renderer};
use crate::error::{ConvertError, Result};
use crate::records::{
    CashTransaction, InvestmentKind, InvestmentTransaction, OfxAccount, Position, Statement,
    Transaction,
};

/// Transaction id of the synthetic opening balance of an account.
pub const AUTOSYNC_INITIAL: &str = "autosync_initial";

/// Marker a synchronizer may record to skip opening balances for every account.
pub const ALL_AUTOSYNC_INITIAL: &str = "all.autosync_initial";

/// Counterpart of the opening balance.
pub const EQUITY_ACCOUNT: &str = "Assets:Equity";

/// Contra-account for buys and sells when no unknown account is configured.
pub const UNKNOWN_INVESTMENT_ACCOUNT: &str = "Assets:Unknown";

/// Contra-account for reinvested income.
pub const REINVEST_ACCOUNT: &str = "Income:Interest";

/// Comment key the dedup id of OFX transactions is stored under.
pub const OFXID_KEY: &str = "ofxid";

/// Converts the transactions of one OFX account into ledger text.
#[derive(Debug)]
pub struct OfxConverter<'a> {
    base: Converter<'a>,
    acctid: String,
    fid: String,
    name: String,
}

impl<'a> OfxConverter<'a> {
    /// Creates a converter posting to the ledger account `name`.
    ///
    /// The statement currency replaces the currency of `config`. `fid` overrides the institution
    /// id of the account, and is required when the OFX carries no institution.
    pub fn new<N: Into<String>>(
        account: &OfxAccount,
        name: N,
        fid: Option<String>,
        config: ConverterConfig,
        ledger: Option<&'a dyn LedgerLookup>,
    ) -> Result<Self> {
        let fid = match (fid, &account.institution) {
            (Some(fid), _) => fid,
            (None, Some(institution)) => institution.fid.clone(),
            (None, None) => {
                return Err(ConvertError::Configuration {
                    account_id: account.account_id.clone(),
                })
            }
        };
        let config = ConverterConfig {
            currency: account.statement.currency.clone(),
            ..config
        };
        Ok(OfxConverter {
            base: Converter::new(config, ledger),
            acctid: account.account_id.clone(),
            fid,
            name: name.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn converter(&self) -> &Converter<'a> {
        &self.base
    }

    /// Dedup id of a transaction, `<fid>.<acctid>.<txnid>` made comment-safe.
    pub fn mk_ofxid(&self, txnid: &str) -> String {
        Converter::clean_id(&format!("{}.{}.{}", self.fid, self.acctid, txnid))
    }

    /// Merges payee and memo, dropping whichever one repeats the other.
    pub fn format_payee(&self, txn: &Transaction) -> String {
        merge_payee(txn.payee(), txn.memo())
    }

    /// Balance assertion at the statement's balance date, or empty when it cannot be placed.
    pub fn format_balance(&self, statement: &Statement) -> Result<String> {
        let mut out = String::new();
        self.write_balance(statement, &mut out)?;
        Ok(out)
    }

    /// Synthetic opening balance reconciling the statement's transactions with its balance.
    pub fn format_initial_balance(&self, statement: &Statement) -> Result<String> {
        let mut out = String::new();
        self.write_initial_balance(statement, &mut out)?;
        Ok(out)
    }

    pub fn format_txn<T: Into<Transaction>>(&self, txn: T) -> Result<String> {
        let txn: Transaction = txn.into();
        let mut out = String::new();
        self.render(&txn, &mut out)?;
        Ok(out)
    }

    /// Every transaction of the statement, one block each, separated by blank lines.
    pub fn format_txns(&self, statement: &Statement) -> Result<String> {
        let mut out = String::new();
        for (i, txn) in statement.transactions.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.render(txn, &mut out)?;
        }
        Ok(out)
    }

    /// Price database line for a position, or empty when date, security or price is missing.
    pub fn format_position(&self, pos: &Position) -> Result<String> {
        let mut out = String::new();
        self.render(pos, &mut out)?;
        Ok(out)
    }

    fn posting_line<W: fmt::Write>(&self, w: &mut W, posting: Posting<'_>) -> fmt::Result {
        w.write_str(&posting.format(self.base.indent()))
    }

    fn write_balance<W: fmt::Write>(&self, statement: &Statement, w: &mut W) -> fmt::Result {
        let date = match statement.balance_date.or(statement.end_date) {
            Some(date) => date,
            None => {
                debug!(account = %self.name, "statement has no balance date, skipping assertion");
                return Ok(());
            }
        };
        let balance = match statement.balance {
            Some(balance) => balance,
            None => return Ok(()),
        };
        writeln!(
            w,
            "{} * --Autosync Balance Assertion",
            Converter::format_date(&date)
        )?;
        let currency = self.base.currency();
        self.posting_line(
            w,
            Posting::builder()
                .account(self.name.as_str().into())
                .amount(Amount::new(Decimal::ZERO, currency))
                .asserted(Some(Amount::new(balance, currency)))
                .build(),
        )
    }

    fn write_initial_balance<W: fmt::Write>(&self, statement: &Statement, w: &mut W) -> Result<()> {
        let (balance, start) = match (statement.balance, statement.start_date) {
            (Some(balance), Some(start)) => (balance, start),
            _ => {
                debug!(account = %self.name, "statement lacks balance or start date, skipping initial balance");
                return Ok(());
            }
        };
        let initial = statement
            .transactions
            .iter()
            .try_fold(balance, |acc, txn| acc.checked_sub(txn.amount))
            .ok_or_else(|| ConvertError::Overflow {
                operation: "initial balance",
                id: self.mk_ofxid(AUTOSYNC_INITIAL),
            })?;

        writeln!(
            w,
            "{} * --Autosync Initial Balance",
            Converter::format_date(&start)
        )?;
        self.base
            .write_id_line(w, OFXID_KEY, &self.mk_ofxid(AUTOSYNC_INITIAL))?;
        let amount = Amount::new(initial, self.base.currency());
        self.posting_line(w, Posting::new(self.name.as_str(), amount.clone()))?;
        self.posting_line(w, Posting::new(EQUITY_ACCOUNT, amount.reversed()))?;
        Ok(())
    }

    fn investment_contra_account(&self, kind: InvestmentKind) -> &str {
        match kind {
            InvestmentKind::Buy | InvestmentKind::Sell => self
                .base
                .unknown_account()
                .unwrap_or(UNKNOWN_INVESTMENT_ACCOUNT),
            InvestmentKind::Reinvest => REINVEST_ACCOUNT,
            InvestmentKind::Transfer => &self.name,
            InvestmentKind::Other => {
                warn!(account = %self.name, "unrecognized investment transaction type, posting to same account");
                &self.name
            }
        }
    }
}

fn merge_payee(payee: Option<&str>, memo: Option<&str>) -> String {
    let payee = payee.unwrap_or("");
    let memo = memo.unwrap_or("");
    if payee.is_empty() && memo.is_empty() {
        "UNKNOWN".to_string()
    } else if payee.is_empty() || memo.starts_with(payee) {
        memo.to_string()
    } else if memo.is_empty() || payee.starts_with(memo) {
        payee.to_string()
    } else {
        format!("{} {}", payee, memo)
    }
}

fn format_trade_date(trade: &NaiveDate, settle: Option<&NaiveDate>) -> String {
    match settle {
        Some(settle) if settle != trade => format!(
            "{}={}",
            Converter::format_date(trade),
            Converter::format_date(settle)
        ),
        _ => Converter::format_date(trade),
    }
}

impl<'t, W: fmt::Write> Renderer<&'t Transaction, W> for OfxConverter<'_> {
    type Error = ConvertError;
    fn render(&self, txn: &'t Transaction, w: &mut W) -> Result<()> {
        match txn {
            Transaction::Cash(cash) => self.render(cash, w),
            Transaction::Investment(investment) => self.render(investment, w),
        }
    }
}

impl<'t, W: fmt::Write> Renderer<&'t CashTransaction, W> for OfxConverter<'_> {
    type Error = ConvertError;
    fn render(&self, txn: &'t CashTransaction, w: &mut W) -> Result<()> {
        let payee = merge_payee(txn.payee.as_deref(), txn.memo.as_deref());
        writeln!(w, "{} {}", Converter::format_date(&txn.date), payee)?;
        self.base
            .write_id_line(w, OFXID_KEY, &self.mk_ofxid(&txn.id))?;

        let amount = Amount::new(txn.amount, self.base.currency());
        self.posting_line(w, Posting::new(self.name.as_str(), amount.clone()))?;
        let contra = self.base.mk_dynamic_account(&payee, &self.name);
        self.posting_line(w, Posting::new(contra, amount.reversed()))?;
        Ok(())
    }
}

impl<'t, W: fmt::Write> Renderer<&'t InvestmentTransaction, W> for OfxConverter<'_> {
    type Error = ConvertError;
    fn render(&self, txn: &'t InvestmentTransaction, w: &mut W) -> Result<()> {
        let contra = self.investment_contra_account(txn.kind);
        let value = txn
            .units
            .checked_mul(txn.unit_price)
            .ok_or_else(|| ConvertError::Overflow {
                operation: "units * unit price",
                id: self.mk_ofxid(&txn.id),
            })?;
        writeln!(
            w,
            "{} {}",
            format_trade_date(&txn.trade_date, txn.settle_date.as_ref()),
            merge_payee(txn.payee.as_deref(), txn.memo.as_deref())
        )?;
        self.base
            .write_id_line(w, OFXID_KEY, &self.mk_ofxid(&txn.id))?;

        let currency = self.base.currency();
        self.posting_line(
            w,
            Posting::builder()
                .account(self.name.as_str().into())
                .amount(Amount::new(txn.units, txn.security.as_str()).unlimited())
                .unit_price(Some(Amount::new(txn.unit_price, currency).unlimited()))
                .build(),
        )?;
        self.posting_line(
            w,
            Posting::new(contra, Amount::new(value, currency).reversed()),
        )?;
        Ok(())
    }
}

impl<'t, W: fmt::Write> Renderer<&'t Position, W> for OfxConverter<'_> {
    type Error = ConvertError;
    fn render(&self, pos: &'t Position, w: &mut W) -> Result<()> {
        if let (Some(date), Some(security), Some(unit_price)) =
            (&pos.date, &pos.security, &pos.unit_price)
        {
            writeln!(
                w,
                "P {} {} {}",
                date.format("%Y/%m/%d %H:%M:%S"),
                security,
                unit_price
            )?;
        }
        Ok(())
    }
}
