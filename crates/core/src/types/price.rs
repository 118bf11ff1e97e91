//! Type-safe price representation using decimal arithmetic.
//!
//! Prices come out of the spreadsheet as pt-BR formatted text ("10,50",
//! "1.234,56") and are rendered back in the same locale ("R$ 1.234,56").

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Leading amount of a normalized cell; trailing text such as "un" is ignored.
static LEADING_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?").expect("Invalid regex"));

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }

    /// Format for display, e.g. `R$ 1.234,56`.
    #[must_use]
    pub fn display(&self) -> String {
        let fixed = format!("{:.2}", self.amount.round_dp(2));
        let (sign, digits) = fixed
            .strip_prefix('-')
            .map_or(("", fixed.as_str()), |rest| ("-", rest));
        let (whole, cents) = digits.split_once('.').unwrap_or((digits, "00"));

        let (group, decimal) = self.currency_code.separators();
        format!(
            "{sign}{} {}{decimal}{cents}",
            self.currency_code.symbol(),
            group_thousands(whole, group)
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes the storefront can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// Thousands and decimal separators, in that order.
    const fn separators(self) -> (char, char) {
        match self {
            Self::BRL | Self::EUR => ('.', ','),
            Self::USD => (',', '.'),
        }
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Parse a locale-formatted price cell.
///
/// A comma is treated as the decimal separator; when one is present, dots
/// are thousands separators. A leading `R$` and any whitespace are ignored.
/// The longest leading number is used, so `"12,50 un"` is 12.50. A cell
/// that does not start with a digit (including negative amounts) yields
/// zero.
#[must_use]
pub fn parse_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    LEADING_AMOUNT
        .find(&normalized)
        .and_then(|amount| Decimal::from_str(amount.as_str()).ok())
        .unwrap_or(Decimal::ZERO)
}
