//! Amount formatting with a caller-owned cache.
//!
//! Presentation code keeps a [`FormatterCache`] next to its locale state and
//! passes it into formatting calls. Changing the locale drops every prepared
//! formatter; nothing is cached process-wide.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::CurrencyCode;

/// Locale-aware number formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NegativeStyle {
    #[default]
    Sign,
    Parentheses,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CurrencyDisplay {
    #[default]
    Symbol,
    Code,
    SymbolAndCode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FormatOptions {
    pub currency_display: CurrencyDisplay,
    pub negative_style: NegativeStyle,
}

#[derive(Debug, Clone)]
struct CurrencyFormatter {
    code: CurrencyCode,
    symbol: String,
    precision: u8,
}

impl CurrencyFormatter {
    fn prepare(code: CurrencyCode) -> Self {
        let symbol = symbol_for(code.as_str());
        let precision = minor_units_for(code.as_str());
        Self {
            code,
            symbol,
            precision,
        }
    }

    fn render(&self, amount: f64, locale: &LocaleConfig, options: &FormatOptions) -> String {
        let body = format_number(locale, amount.abs(), self.precision);
        let body = if amount < 0.0 {
            match options.negative_style {
                NegativeStyle::Sign => format!("-{}", body),
                NegativeStyle::Parentheses => format!("({})", body),
            }
        } else {
            body
        };
        let spaced = if body.starts_with('(') {
            format!(" {}", body)
        } else {
            body.clone()
        };
        match options.currency_display {
            CurrencyDisplay::Symbol => format!("{}{}", self.symbol, spaced),
            CurrencyDisplay::Code => format!("{} {}", self.code, body),
            CurrencyDisplay::SymbolAndCode => {
                format!("{} {} ({})", self.symbol, spaced.trim_start(), self.code)
            }
        }
    }
}

/// Prepared formatters keyed by locale tag and currency.
#[derive(Debug, Default)]
pub struct FormatterCache {
    locale: LocaleConfig,
    options: FormatOptions,
    entries: HashMap<(String, CurrencyCode), CurrencyFormatter>,
}

impl FormatterCache {
    pub fn new(locale: LocaleConfig, options: FormatOptions) -> Self {
        Self {
            locale,
            options,
            entries: HashMap::new(),
        }
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.locale
    }

    /// Switches locale, discarding every formatter prepared for the previous one.
    pub fn set_locale(&mut self, locale: LocaleConfig) {
        if locale != self.locale {
            self.entries.clear();
            self.locale = locale;
        }
    }

    pub fn set_options(&mut self, options: FormatOptions) {
        self.options = options;
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn format(&mut self, amount: f64, code: &str) -> String {
        let code = CurrencyCode::new(code);
        let key = (self.locale.language_tag.clone(), code.clone());
        let formatter = self
            .entries
            .entry(key)
            .or_insert_with(|| CurrencyFormatter::prepare(code));
        formatter.render(amount, &self.locale, &self.options)
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "AUD" => "A$".into(),
        "INR" => "₹".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" | "KRW" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let raw = format!("{:.*}", precision as usize, value);
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, fraction) = match digits.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (digits, None),
    };
    let grouped = group_digits(int_part, locale.grouping_separator);
    match fraction {
        Some(fraction) => format!("{}{}{}{}", sign, grouped, locale.decimal_separator, fraction),
        None => format!("{}{}", sign, grouped),
    }
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
