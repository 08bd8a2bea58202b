//! Whitespace and line-ending normalization.

use crate::invoice::rules::patterns::{ANY_WHITESPACE, COLUMN_GAP, INLINE_WHITESPACE};

/// Separator that stands for a column gap in normalized lines.
pub const COLUMN_SEPARATOR: char = '\t';

/// The two normalized forms of acquired text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Line-preserving form used for field and table parsing.
    pub lines: String,
    /// Single-line form, only echoed back as `raw_text`.
    pub flat: String,
}

impl NormalizedText {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.split('\n')
    }
}

/// Normalize raw multi-line text.
///
/// Line endings become `\n` and every line is trimmed. Inside a line, a
/// whitespace run that contains a tab or at least two spaces is a column gap
/// and becomes a single tab; any other run becomes a single space. Blank lines
/// are kept blank.
pub fn normalize(raw: &str) -> NormalizedText {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let lines = unified
        .split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n");

    let flat = ANY_WHITESPACE.replace_all(unified.trim(), " ").into_owned();

    NormalizedText { lines, flat }
}

fn normalize_line(line: &str) -> String {
    let line = line.trim_matches(|c: char| c.is_whitespace());
    let gapped = COLUMN_GAP.replace_all(line, "\t");
    INLINE_WHITESPACE.replace_all(&gapped, " ").into_owned()
}

/// Collapse every whitespace run, column gaps included, to one space.
pub fn collapse_spaces(value: &str) -> String {
    ANY_WHITESPACE.replace_all(value.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_endings_and_trimming() {
        let text = normalize("  Name:   Acme Corp \r\nBill No: 1\rDate: 01/02/2024  ");
        assert_eq!(text.lines, "Name:\tAcme Corp\nBill No: 1\nDate: 01/02/2024");
    }

    #[test]
    fn test_column_gaps_become_tabs() {
        let text = normalize("Widget   4 \t 10    40");
        assert_eq!(text.lines, "Widget\t4\t10\t40");
    }

    #[test]
    fn test_single_spaces_are_kept() {
        let text = normalize("Blue widget 4 10 40");
        assert_eq!(text.lines, "Blue widget 4 10 40");
    }

    #[test]
    fn test_blank_lines_survive() {
        let text = normalize("a\n   \n\nb");
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["a", "", "", "b"]);
    }

    #[test]
    fn test_flat_form_collapses_everything() {
        let text = normalize("Name: Acme\n\n  Item  Qty\r\n");
        assert_eq!(text.flat, "Name: Acme Item Qty");
    }

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(collapse_spaces(" Acme\tCorp  Ltd "), "Acme Corp Ltd");
    }
}
