//! Common regex patterns for invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Separator between a label and its value. Never crosses a line break.
    pub static ref LABEL_SEPARATOR: Regex = Regex::new(
        r"^[ \t]*(?:[:#.\-–][ \t]*)*"
    ).unwrap();

    // Field value shapes, anchored at the end of the separator.
    pub static ref FREE_TEXT_VALUE: Regex = Regex::new(
        r"^([^\n]+)"
    ).unwrap();

    pub static ref DATE_VALUE: Regex = Regex::new(
        r"^(\d{1,4}[/.\-]\d{1,2}[/.\-]\d{1,4})\b"
    ).unwrap();

    pub static ref IDENTIFIER_VALUE: Regex = Regex::new(
        r"^([A-Za-z0-9][A-Za-z0-9,./\-]*)"
    ).unwrap();

    // Date token components.
    pub static ref DATE_PARTS: Regex = Regex::new(
        r"^(\d{1,4})[/.\-](\d{1,2})[/.\-](\d{1,4})$"
    ).unwrap();

    // Number shapes (1234, 1234.56, 1,234.56, 1.234,56, 12,50).
    pub static ref PLAIN_NUMBER: Regex = Regex::new(
        r"^-?\d+(?:\.\d+)?$"
    ).unwrap();

    pub static ref COMMA_GROUPED: Regex = Regex::new(
        r"^-?\d{1,3}(?:,\d{3})+(?:\.\d+)?$"
    ).unwrap();

    pub static ref DOT_GROUPED: Regex = Regex::new(
        r"^-?\d{1,3}(?:\.\d{3})+(?:,\d+)?$"
    ).unwrap();

    pub static ref DECIMAL_COMMA: Regex = Regex::new(
        r"^-?\d+,\d{1,2}$"
    ).unwrap();

    // Currency and unit decoration tolerated around a numeric cell.
    pub static ref NUMBER_DECORATION: Regex = Regex::new(
        r"^(?:[$€£¥₹]|USD|EUR|GBP|INR|PLN|Rs\.?)?\s*(.*?)\s*(?:[$€£¥₹%]|USD|EUR|GBP|INR|PLN|zł)?$"
    ).unwrap();

    // Whitespace handling for normalization.
    pub static ref COLUMN_GAP: Regex = Regex::new(
        r"[ \t\u{00a0}]*\t[ \t\u{00a0}]*|[ \u{00a0}]{2,}"
    ).unwrap();

    pub static ref INLINE_WHITESPACE: Regex = Regex::new(
        r"[ \u{00a0}\x0B\x0C]+"
    ).unwrap();

    pub static ref ANY_WHITESPACE: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}
