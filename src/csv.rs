use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use ledger_core::{Amount, Posting};

use crate::converter::{Converter, ConverterConfig, LedgerLookup, Renderer};
use crate::error::{ConvertError, Result};
use crate::records::CsvRow;

/// Comment key the dedup id of CSV rows is stored under.
pub const CSVID_KEY: &str = "csvid";

/// Counterpart of money moved into PayPal from a bank account or debit card.
pub const PAYPAL_TRANSFER_ACCOUNT: &str = "Transfer:Paypal";

/// Counterpart of every other PayPal payment.
pub const PAYPAL_EXPENSE_ACCOUNT: &str = "Expenses:Misc";

/// Columns of a PayPal activity export, including the empty trailing column.
pub const PAYPAL_FIELDS: &[&str] = &[
    "Date",
    "Time",
    "Time Zone",
    "Name",
    "Type",
    "Status",
    "Currency",
    "Gross",
    "Fee",
    "Net",
    "From Email Address",
    "To Email Address",
    "Transaction ID",
    "Counterparty Status",
    "Shipping Address",
    "Address Status",
    "Item Title",
    "Item ID",
    "Shipping and Handling Amount",
    "Insurance Amount",
    "Sales Tax",
    "Option 1 Name",
    "Option 1 Value",
    "Option 2 Name",
    "Option 2 Value",
    "Auction Site",
    "Buyer ID",
    "Item URL",
    "Closing Date",
    "Escrow Id",
    "Invoice Id",
    "Reference Txn ID",
    "Invoice Number",
    "Custom Number",
    "Receipt ID",
    "Balance",
    "Contact Phone Number",
    "",
];

const SETTLED_STATUSES: &[&str] = &["Completed", "Refunded", "Reversed"];
const FUNDING_TYPES: &[&str] = &["Add Funds from a Bank Account", "Charge From Debit Card"];
const CART_ITEM_TYPE: &str = "Shopping Cart Item";

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Known CSV export formats, identified by their exact header set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CsvSchema {
    Paypal,
}

impl CsvSchema {
    const ALL: &'static [CsvSchema] = &[CsvSchema::Paypal];

    /// The schema whose columns are exactly `headers`, in any order.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Option<CsvSchema> {
        let mut headers: Vec<&str> = headers.iter().map(|h| h.as_ref()).collect();
        headers.sort_unstable();
        CsvSchema::ALL.iter().copied().find(|schema| {
            let mut fields = schema.fields().to_vec();
            fields.sort_unstable();
            fields == headers
        })
    }

    /// Prefix of the dedup ids of this schema.
    pub fn id(self) -> &'static str {
        match self {
            CsvSchema::Paypal => "paypal",
        }
    }

    pub fn fields(self) -> &'static [&'static str] {
        match self {
            CsvSchema::Paypal => PAYPAL_FIELDS,
        }
    }
}

/// Converts the rows of one CSV export into ledger text.
#[derive(Debug)]
pub struct CsvConverter<'a> {
    base: Converter<'a>,
    name: String,
    schema: CsvSchema,
}

impl<'a> CsvConverter<'a> {
    /// Creates a converter posting to the ledger account `name`, failing unless `headers` match a
    /// known schema.
    pub fn new<N: Into<String>, S: AsRef<str>>(
        name: N,
        headers: &[S],
        config: ConverterConfig,
        ledger: Option<&'a dyn LedgerLookup>,
    ) -> Result<Self> {
        let schema =
            CsvSchema::detect(headers).ok_or_else(|| ConvertError::UnsupportedFormat {
                headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            })?;
        Ok(CsvConverter {
            base: Converter::new(config, ledger),
            name: name.into(),
            schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> CsvSchema {
        self.schema
    }

    pub fn converter(&self) -> &Converter<'a> {
        &self.base
    }

    /// Dedup id of a row, `<schema>.<txn_id>` made comment-safe.
    pub fn mk_csvid(&self, txn_id: &str) -> String {
        format!("{}.{}", self.schema.id(), Converter::clean_id(txn_id))
    }

    /// Ledger text for one row, or empty for rows that do not move settled money.
    pub fn format_txn(&self, row: &CsvRow) -> Result<String> {
        let mut out = String::new();
        self.render(row, &mut out)?;
        Ok(out)
    }

    fn render_paypal<W: fmt::Write>(&self, row: &CsvRow, w: &mut W) -> Result<()> {
        let status = field(row, "Status");
        let ty = field(row, "Type");
        let txn_id = field(row, "Transaction ID");
        if !SETTLED_STATUSES.contains(&status) || ty == CART_ITEM_TYPE {
            debug!(txn_id, status, ty, "skipping unsettled CSV row");
            return Ok(());
        }

        let date = parse_date(row, "Date", "%m/%d/%Y")?;
        let payee = format!(
            "{} {} {} ID: {}, {}",
            field(row, "Name"),
            field(row, "To Email Address"),
            field(row, "Item Title"),
            txn_id,
            ty
        );
        let currency = field(row, "Currency");

        writeln!(
            w,
            "{} {}",
            Converter::format_date(&date),
            WHITESPACE.replace_all(&payee, " ")
        )?;
        self.base
            .write_id_line(w, CSVID_KEY, &self.mk_csvid(txn_id))?;

        let (column, contra) = if FUNDING_TYPES.contains(&ty) {
            ("Net", PAYPAL_TRANSFER_ACCOUNT)
        } else {
            ("Gross", PAYPAL_EXPENSE_ACCOUNT)
        };
        let amount = Amount::new(parse_amount(row, column)?, currency);
        let indent = self.base.indent();
        w.write_str(&Posting::new(self.name.as_str(), amount.clone()).format(indent))?;
        w.write_str(&Posting::new(contra, amount.reversed()).format(indent))?;
        Ok(())
    }
}

impl<'r, W: fmt::Write> Renderer<&'r CsvRow, W> for CsvConverter<'_> {
    type Error = ConvertError;
    fn render(&self, row: &'r CsvRow, w: &mut W) -> Result<()> {
        match self.schema {
            CsvSchema::Paypal => self.render_paypal(row, w),
        }
    }
}

fn field<'r>(row: &'r CsvRow, column: &str) -> &'r str {
    row.get(column).map(String::as_str).unwrap_or("")
}

fn parse_date(row: &CsvRow, column: &'static str, format: &str) -> Result<NaiveDate> {
    let value = field(row, column);
    NaiveDate::parse_from_str(value, format).map_err(|source| ConvertError::InvalidDate {
        column,
        value: value.to_string(),
        source,
    })
}

fn parse_amount(row: &CsvRow, column: &'static str) -> Result<Decimal> {
    let value = field(row, column);
    Decimal::from_str(value.trim()).map_err(|source| ConvertError::InvalidAmount {
        column,
        value: value.to_string(),
        source,
    })
}
