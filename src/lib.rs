//! Converts parsed bank records into ledger-format double-entry transactions.
//!
//! An external parser turns OFX statements and CSV exports into the [`records`] types; an
//! [`OfxConverter`] or [`CsvConverter`] renders each of them as a ledger transaction block:
//!
//! ```text
//! 2011/03/31 DIVIDEND EARNED FOR PERIOD 03/01
//!     ; ofxid: 1101.1452687~7.0000486
//!     Assets:Foo                                 $0.01
//!     Expenses:Misc                             -$0.01
//! ```
//!
//! The `ofxid`/`csvid` comment is a stable dedup key, letting a synchronizer recognize
//! transactions it has already written.

pub mod converter;
pub mod csv;
pub mod error;
pub mod ofx;
pub mod records;

pub use converter::{Converter, ConverterConfig, LedgerLookup, Renderer};
pub use csv::{CsvConverter, CsvSchema};
pub use error::{ConvertError, Result};
pub use ledger_core::{Amount, Posting};
pub use ofx::{OfxConverter, ALL_AUTOSYNC_INITIAL, AUTOSYNC_INITIAL};
pub use records::{
    CashTransaction, CsvRow, Institution, InvestmentKind, InvestmentTransaction, OfxAccount,
    Position, Statement, Transaction,
};
