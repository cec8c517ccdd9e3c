//! Records handed over by an external OFX or CSV parser.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

/// Financial institution that issued a statement.
#[derive(Clone, Debug, Eq, PartialEq, TypedBuilder)]
pub struct Institution {
    #[builder(default)]
    pub organization: Option<String>,

    /// Financial institution id, the first component of every ofxid.
    pub fid: String,
}

#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Statement {
    /// Currency code the statement amounts are expressed in, e.g. `USD`.
    pub currency: String,

    /// Ledger balance at `balance_date` (or `end_date` when the former is missing).
    #[builder(default)]
    pub balance: Option<Decimal>,

    #[builder(default)]
    pub balance_date: Option<NaiveDate>,

    #[builder(default)]
    pub start_date: Option<NaiveDate>,

    #[builder(default)]
    pub end_date: Option<NaiveDate>,

    #[builder(default)]
    pub transactions: Vec<CashTransaction>,
}

#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct OfxAccount {
    pub account_id: String,

    #[builder(default)]
    pub institution: Option<Institution>,

    pub statement: Statement,
}

/// A bank or credit card transaction moving money in or out of the account.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct CashTransaction {
    pub id: String,
    pub date: NaiveDate,
    #[builder(default)]
    pub payee: Option<String>,
    #[builder(default)]
    pub memo: Option<String>,
    pub amount: Decimal,
}

/// A trade or transfer of securities within an investment account.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct InvestmentTransaction {
    pub id: String,
    pub trade_date: NaiveDate,
    #[builder(default)]
    pub settle_date: Option<NaiveDate>,
    pub kind: InvestmentKind,
    pub units: Decimal,
    pub unit_price: Decimal,
    pub security: String,
    #[builder(default)]
    pub payee: Option<String>,
    #[builder(default)]
    pub memo: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Transaction {
    Cash(CashTransaction),
    Investment(InvestmentTransaction),
}

impl Transaction {
    pub fn payee(&self) -> Option<&str> {
        match self {
            Transaction::Cash(txn) => txn.payee.as_deref(),
            Transaction::Investment(txn) => txn.payee.as_deref(),
        }
    }

    pub fn memo(&self) -> Option<&str> {
        match self {
            Transaction::Cash(txn) => txn.memo.as_deref(),
            Transaction::Investment(txn) => txn.memo.as_deref(),
        }
    }
}

impl From<CashTransaction> for Transaction {
    fn from(txn: CashTransaction) -> Self {
        Transaction::Cash(txn)
    }
}

impl From<InvestmentTransaction> for Transaction {
    fn from(txn: InvestmentTransaction) -> Self {
        Transaction::Investment(txn)
    }
}

/// Investment transaction type, normalized from either code scheme.
///
/// Current OFX parsers report textual codes (`buymf`, `sellstock`, `reinvest`, ...), older ones
/// report integers:
///
/// | code | textual            | legacy     |
/// |------|--------------------|------------|
/// | buy  | `buy*`             | 0, 3       |
/// | sell | `sell*`            | 1, 4       |
/// | transfer | `transfer`, `jrnlsec` | |
/// | reinvest | `reinvest`     | 2          |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InvestmentKind {
    Buy,
    Sell,
    Transfer,
    Reinvest,
    Other,
}

impl InvestmentKind {
    pub fn from_code(code: &str) -> Self {
        if code.starts_with("buy") {
            InvestmentKind::Buy
        } else if code.starts_with("sell") {
            InvestmentKind::Sell
        } else {
            match code {
                "transfer" | "jrnlsec" => InvestmentKind::Transfer,
                "reinvest" => InvestmentKind::Reinvest,
                _ => InvestmentKind::Other,
            }
        }
    }

    pub fn from_legacy(code: i64) -> Self {
        match code {
            // buymf, buystock
            0 | 3 => InvestmentKind::Buy,
            // sellmf, sellstock
            1 | 4 => InvestmentKind::Sell,
            2 => InvestmentKind::Reinvest,
            _ => InvestmentKind::Other,
        }
    }
}

impl From<&str> for InvestmentKind {
    fn from(code: &str) -> Self {
        InvestmentKind::from_code(code)
    }
}

impl From<i64> for InvestmentKind {
    fn from(code: i64) -> Self {
        InvestmentKind::from_legacy(code)
    }
}

/// A security holding reported by an investment statement.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Position {
    #[builder(default)]
    pub date: Option<NaiveDateTime>,
    #[builder(default)]
    pub security: Option<String>,
    #[builder(default)]
    pub unit_price: Option<Decimal>,
}

/// One CSV row, keyed by column header.
pub type CsvRow = HashMap<String, String>;
