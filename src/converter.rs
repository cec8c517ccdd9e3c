use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use typed_builder::TypedBuilder;

use ledger_core::normalize_currency;

/// Account used for the contra-posting when nothing better is known.
pub const DEFAULT_UNKNOWN_ACCOUNT: &str = "Expenses:Misc";

/// Renders a record into ledger text.
pub trait Renderer<T, W: fmt::Write> {
    type Error;
    fn render(&self, renderable: T, write: &mut W) -> Result<(), Self::Error>;
}

/// Read-only access to the payee history of an existing ledger.
///
/// Converters may be shared between threads, so lookups must be `Sync`.
pub trait LedgerLookup: Sync {
    /// Best account previously used with `payee`, never `exclude`.
    fn lookup(&self, payee: &str, exclude: &str) -> Option<String>;
}

impl<F> LedgerLookup for F
where
    F: Fn(&str, &str) -> Option<String> + Sync,
{
    fn lookup(&self, payee: &str, exclude: &str) -> Option<String> {
        self(payee, exclude)
    }
}

impl LedgerLookup for HashMap<String, String> {
    fn lookup(&self, payee: &str, exclude: &str) -> Option<String> {
        self.get(payee).filter(|account| *account != exclude).cloned()
    }
}

/// Settings shared by every converter, fixed at construction.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, TypedBuilder)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConverterConfig {
    /// Contra-account used when the ledger has no better suggestion.
    #[builder(default)]
    pub unknown_account: Option<String>,

    #[builder(default = "$".to_string())]
    pub currency: String,

    /// Number of spaces before each posting.
    #[builder(default = 4)]
    pub indent: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig::builder().build()
    }
}

/// State and helpers shared by the OFX and CSV converters.
#[derive(Clone)]
pub struct Converter<'a> {
    config: ConverterConfig,
    ledger: Option<&'a dyn LedgerLookup>,
}

impl fmt::Debug for Converter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("ledger", &self.ledger.is_some())
            .finish()
    }
}

impl<'a> Converter<'a> {
    pub fn new(config: ConverterConfig, ledger: Option<&'a dyn LedgerLookup>) -> Self {
        let currency = normalize_currency(&config.currency);
        Converter {
            config: ConverterConfig { currency, ..config },
            ledger,
        }
    }

    /// Makes a free-form id safe to embed as a comment token.
    pub fn clean_id(id: &str) -> String {
        id.replace(['/', '$', ' ', '@'], "_")
    }

    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y/%m/%d").to_string()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    pub fn indent(&self) -> usize {
        self.config.indent
    }

    pub fn unknown_account(&self) -> Option<&str> {
        self.config.unknown_account.as_deref()
    }

    /// Guesses the contra-account for `payee` from the ledger, never choosing `exclude`.
    pub fn mk_dynamic_account(&self, payee: &str, exclude: &str) -> String {
        let fallback = || {
            self.unknown_account()
                .unwrap_or(DEFAULT_UNKNOWN_ACCOUNT)
                .to_string()
        };
        match self.ledger {
            None => fallback(),
            Some(ledger) => ledger.lookup(payee, exclude).unwrap_or_else(|| {
                debug!(payee, "no account learned for payee, using fallback");
                fallback()
            }),
        }
    }

    /// Writes an indented `; <key>: <id>` comment line.
    pub(crate) fn write_id_line<W: fmt::Write>(
        &self,
        w: &mut W,
        key: &str,
        id: &str,
    ) -> fmt::Result {
        writeln!(w, "{}; {}: {}", " ".repeat(self.indent()), key, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_id_replaces_unsafe_characters() {
        assert_eq!(Converter::clean_id("a/b$c d@e"), "a_b_c_d_e");
        assert_eq!(Converter::clean_id("1101.1452687~7.0000486"), "1101.1452687~7.0000486");
    }

    proptest! {
        #[test]
        fn clean_id_is_idempotent(id in ".*") {
            let once = Converter::clean_id(&id);
            prop_assert_eq!(Converter::clean_id(&once), once.clone());
            prop_assert!(!once.contains(['/', '$', ' ', '@']));
        }
    }

    #[test]
    fn formats_dates_with_slashes() {
        let date = NaiveDate::from_ymd_opt(2011, 3, 31).unwrap();
        assert_eq!(Converter::format_date(&date), "2011/03/31");
    }

    #[test]
    fn normalizes_currency_at_construction() {
        let config = ConverterConfig::builder().currency("usd".to_string()).build();
        assert_eq!(Converter::new(config, None).currency(), "$");
        let config = ConverterConfig::builder().currency("cad".to_string()).build();
        assert_eq!(Converter::new(config, None).currency(), "CAD");
    }

    #[test]
    fn dynamic_account_without_ledger() {
        let converter = Converter::new(ConverterConfig::default(), None);
        assert_eq!(converter.mk_dynamic_account("Shop", "Assets:Foo"), "Expenses:Misc");

        let config = ConverterConfig::builder()
            .unknown_account(Some("Expenses:Unknown".to_string()))
            .build();
        let converter = Converter::new(config, None);
        assert_eq!(converter.mk_dynamic_account("Shop", "Assets:Foo"), "Expenses:Unknown");
    }

    #[test]
    fn dynamic_account_with_ledger() {
        let ledger: HashMap<String, String> = [
            ("Grocer".to_string(), "Expenses:Food".to_string()),
            ("Myself".to_string(), "Assets:Foo".to_string()),
        ]
        .into_iter()
        .collect();
        let converter = Converter::new(ConverterConfig::default(), Some(&ledger));
        assert_eq!(converter.mk_dynamic_account("Grocer", "Assets:Foo"), "Expenses:Food");
        assert_eq!(converter.mk_dynamic_account("Myself", "Assets:Foo"), "Expenses:Misc");
        assert_eq!(converter.mk_dynamic_account("Nobody", "Assets:Foo"), "Expenses:Misc");
    }

    #[test]
    fn closure_lookup_sees_exclusion() {
        let lookup = |payee: &str, exclude: &str| Some(format!("{}|{}", payee, exclude));
        let converter = Converter::new(ConverterConfig::default(), Some(&lookup));
        assert_eq!(converter.mk_dynamic_account("P", "X"), "P|X");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ConverterConfig =
            serde_json::from_str(r#"{"unknown-account": "Expenses:Unknown"}"#).unwrap();
        assert_eq!(config.unknown_account.as_deref(), Some("Expenses:Unknown"));
        assert_eq!(config.currency, "$");
        assert_eq!(config.indent, 4);
    }
}
