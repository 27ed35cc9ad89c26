//! Number formatting for areas, dimensions and money.
//!
//! Displayed numbers use fixed-point rounding with ties going away from
//! zero, so `0.125` shows as `0.13` and `2.5` cm as `3`.

/// Default currency symbol (Brazilian real).
pub const DEFAULT_CURRENCY_SYMBOL: &str = "R$";

/// Extra digits examined past the rounding position.
const GUARD_DIGITS: usize = 30;

/// Format `value` with exactly `digits` fractional digits.
///
/// Rounds on the exact decimal value of the float, halves away from zero.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let exact = format!("{:.*}", digits + GUARD_DIGITS, value.abs());
    let (kept, rest) = exact.split_at(exact.len() - GUARD_DIGITS);
    let mut out: Vec<char> = kept.trim_end_matches('.').chars().collect();

    if rest.as_bytes().first().is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for c in out.iter_mut().rev() {
            match *c {
                '.' => continue,
                '9' => *c = '0',
                d => {
                    *c = char::from(d as u8 + 1);
                    carry = false;
                    break;
                }
            }
        }
        if carry {
            out.insert(0, '1');
        }
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, out.into_iter().collect::<String>())
}

/// Area in square meters with two decimals: `0.38 m²`.
pub fn format_area(square_meters: f64) -> String {
    format!("{} m²", to_fixed(square_meters, 2))
}

/// Width and height (meters) as whole centimeters: `125 × 15 cm`.
pub fn format_dimensions_cm(width: f64, height: f64) -> String {
    format!(
        "{} × {} cm",
        to_fixed(width * 100.0, 0),
        to_fixed(height * 100.0, 0)
    )
}

/// Brazilian-style money formatting: `R$ 1.234,56`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Thousands separated by `.`, two decimals after `,`.
    pub fn format(&self, value: f64) -> String {
        let fixed = to_fixed(value.abs(), 2);
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            "-"
        } else {
            ""
        };
        format!("{}{} {},{}", sign, self.symbol, grouped, frac_part)
    }
}

/// Format with the default `R$` symbol.
pub fn format_currency(value: f64) -> String {
    CurrencyFormat::default().format(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fixed_rounding() {
        assert_eq!(to_fixed(0.375, 2), "0.38");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(1.005, 2), "1.00"); // 1.005 is stored slightly below
        assert_eq!(to_fixed(9.995, 2), "9.99");
        assert_eq!(to_fixed(9.999, 2), "10.00");
        assert_eq!(to_fixed(99.6, 0), "100");
        assert_eq!(to_fixed(0.0, 2), "0.00");
    }

    #[test]
    fn test_to_fixed_float_noise() {
        // 0.15 * 100 is 15.000000000000002
        assert_eq!(to_fixed(0.15 * 100.0, 0), "15");
        assert_eq!(to_fixed(1.25 * 100.0, 0), "125");
    }

    #[test]
    fn test_to_fixed_negative() {
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(-1.234, 2), "-1.23");
    }

    #[test]
    fn test_format_area_and_dimensions() {
        assert_eq!(format_area(0.375), "0.38 m²");
        assert_eq!(format_dimensions_cm(1.25, 0.15), "125 × 15 cm");
    }

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(200.0), "R$ 200,00");
        assert_eq!(format_currency(1234.56), "R$ 1.234,56");
        assert_eq!(format_currency(1_234_567.0), "R$ 1.234.567,00");
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(999.999), "R$ 1.000,00");
        assert_eq!(format_currency(-5.5), "-R$ 5,50");
    }

    #[test]
    fn test_custom_symbol() {
        let usd = CurrencyFormat::new("US$");
        assert_eq!(usd.format(10.0), "US$ 10,00");
    }
}
