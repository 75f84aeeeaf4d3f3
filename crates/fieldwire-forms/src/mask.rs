//! Number masks for currency-style inputs.
//!
//! A mask turns raw keystrokes or a number into display text such as
//! `$1,234.5`, and turns that text back into a number.

/// Formatting rules for a masked numeric input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberMask {
    /// Text placed before the number.
    pub prefix: String,
    /// Text placed after the number.
    pub suffix: String,
    /// Grouping separator for thousands, if any.
    pub thousands_separator: Option<char>,
    /// Decimal point symbol.
    pub decimal_symbol: char,
    /// Whether a fractional part is accepted.
    pub allow_decimal: bool,
    /// Maximum number of fractional digits.
    pub decimal_limit: usize,
    /// Whether a leading minus sign is kept.
    pub allow_negative: bool,
    /// Maximum number of integer digits.
    pub integer_limit: Option<usize>,
}

impl Default for NumberMask {
    fn default() -> Self {
        Self {
            prefix: "$".to_string(),
            suffix: String::new(),
            thousands_separator: Some(','),
            decimal_symbol: '.',
            allow_decimal: false,
            decimal_limit: 2,
            allow_negative: false,
            integer_limit: None,
        }
    }
}

impl NumberMask {
    /// Creates the default whole-dollar mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dollar mask that accepts cents.
    pub fn dollars() -> Self {
        Self {
            allow_decimal: true,
            ..Self::default()
        }
    }

    /// Sets the prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Allows negative amounts.
    #[must_use]
    pub const fn allow_negative(mut self) -> Self {
        self.allow_negative = true;
        self
    }

    /// Caps the number of integer digits.
    #[must_use]
    pub const fn integer_limit(mut self, limit: usize) -> Self {
        self.integer_limit = Some(limit);
        self
    }

    /// Conforms raw input to the mask.
    ///
    /// Input without any digit conforms to the empty string.
    pub fn conform(&self, raw: &str) -> String {
        let negative = self.allow_negative
            && raw.chars().find(|c| c.is_ascii_digit() || *c == '-') == Some('-');

        let (int_raw, frac_raw) = match raw.find(self.decimal_symbol) {
            Some(pos) if self.allow_decimal => (
                &raw[..pos],
                Some(&raw[pos + self.decimal_symbol.len_utf8()..]),
            ),
            Some(pos) => (&raw[..pos], None),
            None => (raw, None),
        };

        let int_digits: String = int_raw.chars().filter(char::is_ascii_digit).collect();
        let frac_digits: Option<String> = frac_raw.map(|frac| {
            frac.chars()
                .filter(char::is_ascii_digit)
                .take(self.decimal_limit)
                .collect()
        });

        let has_digits =
            !int_digits.is_empty() || frac_digits.as_ref().is_some_and(|f| !f.is_empty());
        if !has_digits {
            return String::new();
        }

        let mut integer = int_digits.trim_start_matches('0').to_string();
        if integer.is_empty() {
            integer.push('0');
        }
        if let Some(limit) = self.integer_limit {
            integer.truncate(limit.max(1));
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&self.group(&integer));
        if let Some(frac) = frac_digits {
            out.push(self.decimal_symbol);
            out.push_str(&frac);
        }
        out.push_str(&self.suffix);
        out
    }

    /// Parses masked text back into a number.
    pub fn unmask(&self, masked: &str) -> Option<f64> {
        let mut body = masked.trim().trim_start_matches('-');
        if let Some(rest) = body.strip_prefix(self.prefix.as_str()) {
            body = rest;
        }
        if let Some(rest) = body.strip_suffix(self.suffix.as_str()) {
            body = rest;
        }
        let negative = self.allow_negative && masked.trim_start().starts_with('-');

        let mut plain = String::new();
        let mut seen_decimal = false;
        for c in body.chars() {
            if c.is_ascii_digit() {
                plain.push(c);
            } else if c == self.decimal_symbol && self.allow_decimal && !seen_decimal {
                seen_decimal = true;
                plain.push('.');
            } else if Some(c) == self.thousands_separator || c.is_whitespace() {
                continue;
            } else {
                return None;
            }
        }

        if !plain.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let value: f64 = plain.parse().ok()?;
        Some(if negative { -value } else { value })
    }

    fn group(&self, integer: &str) -> String {
        let Some(separator) = self.thousands_separator else {
            return integer.to_string();
        };
        let len = integer.len();
        let mut out = String::with_capacity(len + len / 3);
        for (i, c) in integer.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(separator);
            }
            out.push(c);
        }
        out
    }
}

/// Formats an amount as dollars, e.g. `6000.0` as `$6,000`.
///
/// Non-finite amounts format as the empty string.
pub fn format_dollars(amount: f64) -> String {
    NumberMask::dollars().conform(&amount.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(6000.0), "$6,000");
        assert_eq!(format_dollars(1234.5), "$1,234.5");
        assert_eq!(format_dollars(0.0), "$0");
        assert_eq!(format_dollars(1_000_000.0), "$1,000,000");
        assert_eq!(format_dollars(999.0), "$999");
        assert_eq!(format_dollars(f64::NAN), "");
    }

    #[test]
    fn test_conform_strips_noise() {
        let mask = NumberMask::new();
        assert_eq!(mask.conform("12a34"), "$1,234");
        assert_eq!(mask.conform("$ 0012"), "$12");
        assert_eq!(mask.conform("abc"), "");
        assert_eq!(mask.conform(""), "");
    }

    #[test]
    fn test_conform_decimals() {
        let mask = NumberMask::dollars();
        assert_eq!(mask.conform("1500.999"), "$1,500.99");
        assert_eq!(mask.conform("12."), "$12.");
        assert_eq!(mask.conform(".5"), "$0.5");

        let whole = NumberMask::new();
        assert_eq!(whole.conform("1500.99"), "$1,500");
    }

    #[test]
    fn test_conform_negative_and_limits() {
        assert_eq!(NumberMask::new().conform("-50"), "$50");
        assert_eq!(NumberMask::new().allow_negative().conform("-50"), "-$50");
        assert_eq!(NumberMask::new().integer_limit(3).conform("123456"), "$123");
        assert_eq!(
            NumberMask::new().prefix("").suffix(" USD").conform("2500"),
            "2,500 USD"
        );
    }

    #[test]
    fn test_unmask() {
        let mask = NumberMask::dollars();
        assert_eq!(mask.unmask("$1,500.25"), Some(1500.25));
        assert_eq!(mask.unmask("1500"), Some(1500.0));
        assert_eq!(mask.unmask("$"), None);
        assert_eq!(mask.unmask("12x"), None);
        assert_eq!(NumberMask::new().allow_negative().unmask("-$40"), Some(-40.0));
        assert_eq!(NumberMask::new().unmask("-$40"), Some(40.0));
    }
}
