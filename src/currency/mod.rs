use serde::{Deserialize, Serialize};

/// Money in the smallest indivisible unit of the profile currency (whole pesos for COP).
///
/// Configured amounts are never negative. Running cash inside a period is signed
/// because fixed expenses are deducted unconditionally.
pub type Amount = i64;

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("COP")
    }
}

/// Locale-aware formatting preferences for amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub grouping_separator: char,
    pub currency: CurrencyCode,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::for_tag("es-CO", CurrencyCode::default())
    }
}

impl LocaleConfig {
    /// Builds a locale from a BCP 47 tag; unknown tags group with commas.
    pub fn for_tag(tag: &str, currency: CurrencyCode) -> Self {
        let grouping_separator = match tag {
            "es-CO" | "es-ES" | "es-AR" | "de-DE" | "pt-BR" => '.',
            _ => ',',
        };
        Self {
            language_tag: tag.into(),
            grouping_separator,
            currency,
        }
    }
}

pub fn symbol_for(code: &str) -> &str {
    match code {
        "COP" | "USD" | "MXN" | "ARS" => "$",
        "EUR" => "€",
        "GBP" => "£",
        _ => code,
    }
}

/// Renders a whole-unit amount, e.g. `$ 1.400.000` under `es-CO`.
pub fn format_amount(amount: Amount, locale: &LocaleConfig) -> String {
    let digits = group_digits(&amount.unsigned_abs().to_string(), locale.grouping_separator);
    let symbol = symbol_for(locale.currency.as_str());
    if amount < 0 {
        format!("-{} {}", symbol, digits)
    } else {
        format!("{} {}", symbol, digits)
    }
}

/// Compact millions label used on chart axes, e.g. `$5.4M`.
pub fn format_millions(amount: Amount) -> String {
    let millions = amount as f64 / 1_000_000.0;
    let rendered = format!("{:.1}", millions);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("${}M", trimmed)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Splits a monthly amount across the two pay periods of a month.
///
/// The first share is `amount / 2`; the second takes the remainder so both
/// shares always add back up to `amount`.
pub fn split_half(amount: Amount) -> (Amount, Amount) {
    let first = amount / 2;
    (first, amount - first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_colombian_grouping() {
        let locale = LocaleConfig::default();
        assert_eq!(format_amount(1_400_000, &locale), "$ 1.400.000");
        assert_eq!(format_amount(110_000, &locale), "$ 110.000");
        assert_eq!(format_amount(0, &locale), "$ 0");
        assert_eq!(format_amount(-2_500, &locale), "-$ 2.500");
    }

    #[test]
    fn unknown_locale_groups_with_commas() {
        let locale = LocaleConfig::for_tag("en-US", CurrencyCode::new("usd"));
        assert_eq!(format_amount(1_234_567, &locale), "$ 1,234,567");
        assert_eq!(locale.currency.as_str(), "USD");
    }

    #[test]
    fn millions_label_drops_trailing_zeroes() {
        assert_eq!(format_millions(5_400_000), "$5.4M");
        assert_eq!(format_millions(3_000_000), "$3M");
        assert_eq!(format_millions(0), "$0M");
    }

    #[test]
    fn split_half_keeps_the_total() {
        assert_eq!(split_half(5_400_000), (2_700_000, 2_700_000));
        assert_eq!(split_half(300_001), (150_000, 150_001));
        assert_eq!(split_half(0), (0, 0));
    }
}
