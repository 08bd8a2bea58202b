//! Line-oriented table extraction.

use std::ops::Range;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::normalize::COLUMN_SEPARATOR;

use super::fields::label_pattern;
use super::rules::{is_amount, CellValue, TableKind, TableSpec};

/// A row accepted under a table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub kind: TableKind,
    /// Leading text cell (item name or expense account).
    pub label: Option<String>,
    /// Extra text cells between the label and the numbers.
    pub description: Option<String>,
    /// Trailing numeric cells, one per numeric column.
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    Scanning,
    InTable(usize),
}

#[derive(Debug)]
enum RowOutcome {
    Row(TableRow),
    Rejected,
    EndOfTable,
}

struct ColumnMatcher {
    pattern: Regex,
    required: bool,
}

struct CompiledTable {
    spec: TableSpec,
    columns: Vec<ColumnMatcher>,
}

impl CompiledTable {
    fn is_header(&self, line: &str) -> bool {
        self.columns
            .iter()
            .filter(|c| c.required)
            .all(|c| c.pattern.is_match(line))
    }
}

/// Finds tables by header signature and parses the rows beneath them.
///
/// Scanning starts outside any table. A line carrying every required column
/// label of a signature opens that table. Inside a table each line is split
/// into cells; rows whose trailing cells are not numeric are skipped, and a
/// blank line or a line too short to hold a row closes the table.
pub struct TableExtractor {
    tables: Vec<CompiledTable>,
}

impl TableExtractor {
    pub fn new(specs: Vec<TableSpec>) -> Result<Self, ExtractionError> {
        let tables = specs
            .into_iter()
            .map(compile_table)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tables })
    }

    pub fn specs(&self) -> impl Iterator<Item = &TableSpec> {
        self.tables.iter().map(|t| &t.spec)
    }

    /// Signature for a table kind, if one is configured.
    pub fn spec(&self, kind: TableKind) -> Option<&TableSpec> {
        self.specs().find(|s| s.kind == kind)
    }

    /// Parse every table in the text, returning rows in document order.
    pub fn extract(&self, text: &str) -> Vec<TableRow> {
        let mut rows = Vec::new();
        let mut rejected = 0usize;
        let mut state = TableState::Scanning;

        for (line_no, line) in text.split('\n').enumerate() {
            if let Some(index) = self.header_index(line) {
                trace!("Line {}: {:?} table header", line_no + 1, self.tables[index].spec.kind);
                state = TableState::InTable(index);
                continue;
            }

            let TableState::InTable(index) = state else {
                continue;
            };

            if line.trim().is_empty() {
                state = TableState::Scanning;
                continue;
            }

            match parse_row(&self.tables[index].spec, line) {
                RowOutcome::Row(row) => rows.push(row),
                RowOutcome::Rejected => {
                    trace!("Line {}: skipped non-numeric row", line_no + 1);
                    rejected += 1;
                }
                RowOutcome::EndOfTable => {
                    trace!("Line {}: too few columns, leaving table", line_no + 1);
                    state = TableState::Scanning;
                }
            }
        }

        debug!("Extracted {} table rows ({} skipped)", rows.len(), rejected);
        rows
    }

    /// Byte ranges of the lines that carry a table header signature.
    pub fn header_lines(&self, text: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for line in text.split('\n') {
            if self.header_index(line).is_some() {
                ranges.push(start..start + line.len());
            }
            start += line.len() + 1;
        }
        ranges
    }

    fn header_index(&self, line: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.is_header(line))
    }
}

fn compile_table(spec: TableSpec) -> Result<CompiledTable, ExtractionError> {
    let invalid = |reason: String| ExtractionError::InvalidSignature {
        table: format!("{:?}", spec.kind).to_lowercase(),
        reason,
    };

    if spec.numeric_columns == 0 {
        return Err(invalid("at least one numeric column is required".to_string()));
    }
    if !spec.columns.iter().any(|c| c.required) {
        return Err(invalid("at least one required column is needed".to_string()));
    }

    let columns = spec
        .columns
        .iter()
        .map(|column| {
            let alternatives = column
                .aliases
                .iter()
                .map(|alias| label_pattern(alias))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|reason| invalid(format!("column {}: {}", column.key, reason)))?;
            let pattern = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
                .map_err(|e| invalid(e.to_string()))?;
            Ok(ColumnMatcher {
                pattern,
                required: column.required,
            })
        })
        .collect::<Result<Vec<_>, ExtractionError>>()?;

    Ok(CompiledTable { spec, columns })
}

fn parse_row(spec: &TableSpec, line: &str) -> RowOutcome {
    let numeric = spec.numeric_columns;

    // Column gaps (and ruled `|` separators) first.
    let cells: Vec<&str> = line
        .split(|c| c == COLUMN_SEPARATOR || c == '|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if cells.len() > numeric {
        let (head, tail) = cells.split_at(cells.len() - numeric);
        if !is_numeric_tail(tail) {
            return RowOutcome::Rejected;
        }
        let description = head[1..].join(" ");
        return RowOutcome::Row(TableRow {
            kind: spec.kind,
            label: Some(head[0].to_string()),
            description: (!description.is_empty()).then_some(description),
            values: tail.iter().map(|t| CellValue::from_token(t)).collect(),
        });
    }

    // Single whitespace: trailing tokens are the numbers, the rest the label.
    let tokens: Vec<&str> = line.split_whitespace().filter(|t| *t != "|").collect();
    if tokens.len() < spec.min_columns.max(numeric) {
        return RowOutcome::EndOfTable;
    }

    let (head, tail) = tokens.split_at(tokens.len() - numeric);
    if !is_numeric_tail(tail) {
        return RowOutcome::Rejected;
    }
    let label = head.join(" ");
    RowOutcome::Row(TableRow {
        kind: spec.kind,
        label: (!label.is_empty()).then_some(label),
        description: None,
        values: tail.iter().map(|t| CellValue::from_token(t)).collect(),
    })
}

fn is_numeric_tail(tokens: &[&str]) -> bool {
    tokens.iter().all(|t| is_amount(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::default_table_specs;
    use crate::normalize::normalize;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn extract(text: &str) -> Vec<TableRow> {
        let extractor = TableExtractor::new(default_table_specs()).unwrap();
        extractor.extract(&normalize(text).lines)
    }

    fn num(n: i64) -> CellValue {
        CellValue::Number(Decimal::from(n))
    }

    #[test]
    fn test_single_space_row() {
        let rows = extract("Item Quantity Rate amount\nWidget 4 10 40\n");
        assert_eq!(
            rows,
            vec![TableRow {
                kind: TableKind::Items,
                label: Some("Widget".to_string()),
                description: None,
                values: vec![num(4), num(10), num(40)],
            }]
        );
    }

    #[test]
    fn test_header_is_never_a_row() {
        let rows = extract("Item Qty Rate Amount\nItem Qty Rate Amount\n1 2 3 4");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label.as_deref(), Some("1"));
    }

    #[test]
    fn test_header_columns_in_any_order() {
        let rows = extract("Amount | Rate | Qty | Product\nBolt 100 0.25 25");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label.as_deref(), Some("Bolt"));
    }

    #[test]
    fn test_pipe_separated_row() {
        let rows = extract("Item | Qty | Rate | Amount\nHex bolt M8 | 100 | 0.25 | 25");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label.as_deref(), Some("Hex bolt M8"));
        assert_eq!(rows[0].values[2], num(25));
    }

    #[test]
    fn test_multi_word_name_with_column_gaps() {
        let rows = extract("Description    Qty    Unit Price    Total\nBlue widget, large    2    1,250.00    2,500.00");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label.as_deref(), Some("Blue widget, large"));
        assert_eq!(
            rows[0].values,
            vec![
                num(2),
                CellValue::Number(Decimal::new(125000, 2)),
                CellValue::Number(Decimal::new(250000, 2)),
            ]
        );
    }

    #[test]
    fn test_extra_gap_cell_becomes_description() {
        let rows = extract("Item    Description    Qty    Rate    Amount\nWDG-1    Blue widget    4    10    40");
        assert_eq!(rows[0].label.as_deref(), Some("WDG-1"));
        assert_eq!(rows[0].description.as_deref(), Some("Blue widget"));
    }

    #[test]
    fn test_two_token_line_ends_table() {
        let rows = extract("Item Quantity Rate Amount\nWidget 4\nGadget 1 5 5");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_blank_line_ends_table() {
        let rows = extract("Item Quantity Rate Amount\nWidget 4 10 40\n\nGadget 1 5 5");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_non_numeric_row_is_skipped() {
        let rows = extract("Item Quantity Rate Amount\nWidget 4 10 40\nsee attached sheet for details\nGadget 1 5 5");
        let labels: Vec<_> = rows.iter().map(|r| r.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["Widget", "Gadget"]);
    }

    #[test]
    fn test_decorated_numbers_keep_original_token() {
        let rows = extract("Item Qty Price Total\nWidget 4 $10.00 $40.00");
        assert_eq!(
            rows[0].values,
            vec![
                num(4),
                CellValue::Text("$10.00".to_string()),
                CellValue::Text("$40.00".to_string()),
            ]
        );
    }

    #[test]
    fn test_number_beyond_decimal_range_kept_as_text() {
        let huge = "9".repeat(32);
        let rows = extract(&format!("Item Qty Rate Amount\nWidget 1 2 {huge}"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values, vec![num(1), num(2), CellValue::Text(huge)]);
    }

    #[test]
    fn test_three_numeric_tokens_without_name() {
        let rows = extract("Item Qty Rate Amount\n4 10 40");
        assert_eq!(rows[0].label, None);
        assert_eq!(rows[0].values, vec![num(4), num(10), num(40)]);
    }

    #[test]
    fn test_rows_before_header_are_ignored() {
        let rows = extract("Widget 4 10 40\nItem Qty Rate Amount\nGadget 1 5 5");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label.as_deref(), Some("Gadget"));
    }

    #[test]
    fn test_items_then_expenses() {
        let text = "Item Qty Rate Amount\nWidget 4 10 40\nAccount Amount\nOffice Supplies 120.50\nTravel 80\n";
        let rows = extract(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kind, TableKind::Items);
        assert_eq!(rows[1].kind, TableKind::Expenses);
        assert_eq!(rows[1].label.as_deref(), Some("Office Supplies"));
        assert_eq!(rows[1].values, vec![CellValue::Number(Decimal::new(12050, 2))]);
        assert_eq!(rows[2].label.as_deref(), Some("Travel"));
    }

    #[test]
    fn test_expense_single_token_ends_table() {
        let rows = extract("Expense Account Total\nRent\nFuel 30");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_invalid_spec_rejected() {
        let mut specs = default_table_specs();
        specs[0].numeric_columns = 0;
        assert!(TableExtractor::new(specs).is_err());
    }

    #[test]
    fn test_header_lines() {
        let extractor = TableExtractor::new(default_table_specs()).unwrap();
        let text = "Bill No: 5\nItem Name\tQty\tRate\tAmount\nWidget 1 2 2\nAccount Amount";
        let spans: Vec<&str> = extractor
            .header_lines(text)
            .into_iter()
            .map(|r| &text[r])
            .collect();
        assert_eq!(spans, vec!["Item Name\tQty\tRate\tAmount", "Account Amount"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "Item Qty Rate Amount\nWidget 4 10 40\nGadget 1 5 5";
        assert_eq!(extract(text), extract(text));
    }
}
