use std::borrow::Cow;

/// Quotes a commodity label when ledger would otherwise misread it.
///
/// Commodities containing whitespace or numerals must be quoted, so `10X` renders as `"10X"`.
pub fn quote_currency(label: &str) -> Cow<'_, str> {
    if label
        .chars()
        .any(|c| c.is_whitespace() || c.is_ascii_digit())
    {
        Cow::Owned(format!("\"{}\"", label))
    } else {
        Cow::Borrowed(label)
    }
}

/// Upper-cases a currency code, using the `$` symbol in place of `USD`.
pub fn normalize_currency(code: &str) -> String {
    let code = code.to_uppercase();
    if code == "USD" {
        "$".to_string()
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_digits_and_whitespace() {
        assert_eq!(quote_currency("10X"), "\"10X\"");
        assert_eq!(quote_currency("MY FUND"), "\"MY FUND\"");
        assert_eq!(quote_currency("EUR"), "EUR");
        assert_eq!(quote_currency("$"), "$");
    }

    #[test]
    fn normalizes_codes() {
        assert_eq!(normalize_currency("usd"), "$");
        assert_eq!(normalize_currency("USD"), "$");
        assert_eq!(normalize_currency("cad"), "CAD");
        assert_eq!(normalize_currency("$"), "$");
    }
}
