//! Currency codes, tagged amounts and the display format used for earnings.
//!
//! Amounts are rendered with the en-US currency convention: the symbol goes
//! first, thousands are grouped with commas and there are always two fraction
//! digits, e.g. "R$1,234.50". The same strings are found in older history
//! records, so [parse_formatted_amount] can read them back.

use std::{fmt::Display, str::FromStr, sync::OnceLock};

use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};

/// The currencies a salary can be entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Brazilian real.
    #[default]
    BRL,
    /// United States dollar.
    USD,
    /// Euro.
    EUR,
}

impl Currency {
    /// All supported currencies, in the order they are offered to the user.
    pub const ALL: [Currency; 3] = [Currency::BRL, Currency::USD, Currency::EUR];

    /// The ISO 4217 code, e.g. "BRL".
    pub fn code(self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// The symbol that prefixes formatted amounts.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD => "$",
            Currency::EUR => "€",
        }
    }

    /// Detect the currency of a formatted amount from its leading symbol.
    ///
    /// "R$" must be checked before "$" since both start with a dollar sign.
    pub fn from_prefix(text: &str) -> Option<Self> {
        if text.starts_with("R$") {
            Some(Currency::BRL)
        } else if text.starts_with('$') {
            Some(Currency::USD)
        } else if text.starts_with('€') {
            Some(Currency::EUR)
        } else {
            None
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = crate::Error;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Currency::BRL),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            _ => Err(crate::Error::UnknownCurrency(code.to_owned())),
        }
    }
}

/// An amount of money tagged with its currency.
///
/// This is how earnings are persisted, formatting is only applied for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Money {
    /// The amount, rounded to cents when created with [Money::new].
    pub amount: f64,
    /// The currency of `amount`.
    pub currency: Currency,
}

impl Money {
    /// Create a new amount, rounded to two decimal places.
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: round_to_cents(amount),
            currency,
        }
    }

    /// The amount formatted for display, e.g. "R$25.00".
    pub fn formatted(&self) -> String {
        format_currency(self.amount, self.currency)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// Round `amount` to two decimal places.
///
/// Halves are rounded away from zero on the binary value, so 1.005 (stored as
/// 1.00499...) rounds down to 1.00 like the browser's `toFixed(2)`.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn formatter(prefix: &'static str) -> Formatter {
    Formatter::currency(prefix)
        .expect("currency prefixes are short enough for numfmt")
        .precision(Precision::Decimals(2))
}

/// Format `amount` in `currency`, rounded to two decimal places.
///
/// Non-finite amounts cannot be displayed as money and are rendered as "-".
pub fn format_currency(amount: f64, currency: Currency) -> String {
    static FORMATTERS: OnceLock<[(Formatter, Formatter); 3]> = OnceLock::new();

    if !amount.is_finite() {
        return "-".to_owned();
    }

    let formatters = FORMATTERS.get_or_init(|| {
        [
            (formatter("R$"), formatter("-R$")),
            (formatter("$"), formatter("-$")),
            (formatter("€"), formatter("-€")),
        ]
    });
    let (positive_fmt, negative_fmt) = match currency {
        Currency::BRL => &formatters[0],
        Currency::USD => &formatters[1],
        Currency::EUR => &formatters[2],
    };

    let amount = round_to_cents(amount);

    let formatted_string = if amount < 0.0 {
        negative_fmt.fmt_string(amount.abs())
    } else if amount > 0.0 {
        positive_fmt.fmt_string(amount)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return format!("{}0.00", currency.symbol());
    };

    pad_fraction_digits(formatted_string)
}

/// numfmt drops trailing zeros from the fraction, e.g. "12.30" comes out as
/// "12.3" and "25.00" as "25".
fn pad_fraction_digits(mut formatted_string: String) -> String {
    match formatted_string.rfind('.') {
        Some(dot) => {
            let fraction_digits = formatted_string.len() - dot - 1;
            for _ in fraction_digits..2 {
                formatted_string.push('0');
            }
        }
        None => formatted_string.push_str(".00"),
    }

    formatted_string
}

/// Read a formatted amount back into its currency and magnitude.
///
/// Every character except digits, '.' and '-' is removed and the leading
/// number is parsed, so "R$1,234.50" yields 1234.5. The currency comes from
/// the literal prefix of `text`.
///
/// Returns `None` when no number can be read, when the number is not finite,
/// or when the prefix is not a known currency symbol. Amounts with an unknown
/// prefix are left out of every total rather than guessed.
pub fn parse_formatted_amount(text: &str) -> Option<Money> {
    let currency = Currency::from_prefix(text)?;
    let amount = parse_amount(text)?;

    Some(Money { amount, currency })
}

/// Parse the magnitude of a formatted amount, ignoring its currency.
pub fn parse_amount(text: &str) -> Option<f64> {
    let numeric: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    parse_leading_float(&numeric).filter(|amount| amount.is_finite())
}

/// Parse the longest prefix of `text` that looks like `-?digits(.digits)?`.
///
/// Trailing garbage is ignored, so "12.5.3" reads as 12.5 and "5-3" as 5.
fn parse_leading_float(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;

    if bytes.first() == Some(&b'-') {
        end += 1;
    }

    let integer_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > integer_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }

        if fraction_end > fraction_start {
            has_digits = true;
            end = fraction_end;
        } else if has_digits {
            end = fraction_start;
        }
    }

    if !has_digits {
        return None;
    }

    text[..end].trim_end_matches('.').parse().ok()
}
