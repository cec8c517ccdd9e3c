use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// The dedup id cannot be built without an institution id.
    #[error("institution provided by OFX is empty and no fid supplied for account {account_id}")]
    Configuration { account_id: String },
    #[error("cannot determine CSV type from headers {headers:?}")]
    UnsupportedFormat { headers: Vec<String> },
    #[error("invalid date {value:?} in column {column}")]
    InvalidDate {
        column: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid amount {value:?} in column {column}")]
    InvalidAmount {
        column: &'static str,
        value: String,
        #[source]
        source: rust_decimal::Error,
    },
    #[error("decimal overflow computing {operation} of {id}")]
    Overflow { operation: &'static str, id: String },
    #[error("a formatting error occurred")]
    Fmt(#[from] fmt::Error),
}
