//! Numeric cell parsing for table rows.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};

use super::patterns::{COMMA_GROUPED, DECIMAL_COMMA, DOT_GROUPED, NUMBER_DECORATION, PLAIN_NUMBER};

/// A numeric table cell: a number when the token is purely numeric,
/// otherwise the original token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Number(Decimal),
    Text(String),
}

impl CellValue {
    /// Classify a token that already passed the row's numeric check.
    pub fn from_token(token: &str) -> Self {
        match parse_bare_number(token) {
            Some(value) => CellValue::Number(value),
            None => CellValue::Text(token.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n.normalize()),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(n) => {
                let n = n.normalize();
                if n.fract().is_zero() {
                    if let Some(i) = n.to_i64() {
                        return serializer.serialize_i64(i);
                    }
                }
                match n.to_f64() {
                    Some(f) => serializer.serialize_f64(f),
                    None => serializer.serialize_str(&n.to_string()),
                }
            }
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Rewrite a token consisting only of digits, grouping and decimal
/// punctuation into plain `1234.56` form.
///
/// Understands `1234.56`, `1,234.56`, `1.234,56` and `12,50`.
fn canonical_number(token: &str) -> Option<String> {
    let token = token.trim();
    if PLAIN_NUMBER.is_match(token) {
        Some(token.to_string())
    } else if COMMA_GROUPED.is_match(token) {
        Some(token.replace(',', ""))
    } else if DOT_GROUPED.is_match(token) {
        Some(token.replace('.', "").replace(',', "."))
    } else if DECIMAL_COMMA.is_match(token) {
        Some(token.replace(',', "."))
    } else {
        None
    }
}

/// `None` for tokens that are not number-shaped or exceed `Decimal` range.
fn parse_bare_number(token: &str) -> Option<Decimal> {
    Decimal::from_str(&canonical_number(token)?).ok()
}

/// Strip currency and unit decoration, returning the inner token when
/// something was actually removed.
fn undecorated(token: &str) -> Option<&str> {
    let token = token.trim();
    let caps = NUMBER_DECORATION.captures(token)?;
    let inner = caps.get(1)?.as_str();
    (!inner.is_empty() && inner != token).then_some(inner)
}

/// Whether a token has the shape of an amount, bare or decorated. Unlike
/// [`parse_amount`] this accepts numbers too large for `Decimal`.
pub fn is_amount(token: &str) -> bool {
    canonical_number(token).is_some() || undecorated(token).is_some_and(|t| canonical_number(t).is_some())
}

/// Parse an amount cell, tolerating currency symbols, currency codes and a
/// trailing percent sign around the number.
pub fn parse_amount(token: &str) -> Option<Decimal> {
    if let Some(value) = parse_bare_number(token) {
        return Some(value);
    }
    parse_bare_number(undecorated(token)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_grouping_styles() {
        assert_eq!(parse_amount("40"), Some(dec("40")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("12,50"), Some(dec("12.50")));
        assert_eq!(parse_amount("1,200"), Some(dec("1200")));
    }

    #[test]
    fn test_parse_decorated_amounts() {
        assert_eq!(parse_amount("$40.00"), Some(dec("40.00")));
        assert_eq!(parse_amount("40.00 EUR"), Some(dec("40.00")));
        assert_eq!(parse_amount("18%"), Some(dec("18")));
    }

    #[test]
    fn test_reject_non_numbers() {
        assert_eq!(parse_amount("Widget"), None);
        assert_eq!(parse_amount("4pcs"), None);
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_cell_value_keeps_decorated_token() {
        assert_eq!(CellValue::from_token("1,200.50"), CellValue::Number(dec("1200.50")));
        assert_eq!(CellValue::from_token("$40.00"), CellValue::Text("$40.00".to_string()));
    }

    #[test]
    fn test_oversized_number_keeps_original_token() {
        let huge = "9".repeat(32);
        assert_eq!(parse_amount(&huge), None);
        assert!(is_amount(&huge));
        assert!(is_amount(&format!("${huge}")));
        assert!(!is_amount("Widget"));
        assert_eq!(CellValue::from_token(&huge), CellValue::Text(huge.clone()));
    }

    #[test]
    fn test_cell_value_serializes_integers_without_fraction() {
        let values = vec![
            CellValue::Number(dec("4")),
            CellValue::Number(dec("10.00")),
            CellValue::Number(dec("12.5")),
            CellValue::Text("$3".to_string()),
        ];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[4,10,12.5,"$3"]"#);
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(dec("1200.50")).to_string(), "1200.5");
        assert_eq!(CellValue::Text("$40.00".to_string()).to_string(), "$40.00");
    }
}
