//! Rule tables driving field and table extraction.
//!
//! Field definitions and table signatures are plain data: adding a canonical
//! field or a new alias is a configuration change, not a code change.

pub mod dates;
pub mod numbers;
pub mod patterns;

pub use dates::{is_calendar_date, parse_date_token};
pub use numbers::{is_amount, parse_amount, CellValue};

use serde::{Deserialize, Serialize};

/// Canonical key of the vendor name field.
pub const VENDOR_NAME: &str = "vendor_name";
/// Canonical key of the bill/reference number field.
pub const BILL_NUMBER: &str = "bill_number";
/// Canonical key of the created date field.
pub const CREATED_DATE: &str = "created_date";
/// Canonical key of the due date field.
pub const DUE_DATE: &str = "due_date";

/// Shape a field value must have to be captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePattern {
    /// Rest of the line after the label.
    FreeText,
    /// Three groups of digits separated by `/`, `-` or `.`.
    Date,
    /// A token of letters, digits and grouping punctuation with at least one digit.
    Identifier,
}

/// A labeled field rule: canonical name, ordered aliases and value shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub aliases: Vec<String>,
    pub pattern: ValuePattern,
}

impl FieldRule {
    pub fn new<S: Into<String>>(name: &str, aliases: impl IntoIterator<Item = S>, pattern: ValuePattern) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.into_iter().map(Into::into).collect(),
            pattern,
        }
    }
}

/// What a table's rows turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Items,
    Expenses,
}

/// One column of a table signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Output key of the column (e.g. `quantity`).
    pub key: String,
    /// Header spellings accepted for this column.
    pub aliases: Vec<String>,
    /// Whether the column must appear on a line for it to count as a header.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ColumnSpec {
    fn required(key: &str, aliases: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            required: true,
        }
    }

    fn optional(key: &str, aliases: &[&str]) -> Self {
        Self {
            required: false,
            ..Self::required(key, aliases)
        }
    }
}

/// Header signature and row layout of one kind of table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub kind: TableKind,
    /// Columns in output order.
    pub columns: Vec<ColumnSpec>,
    /// How many trailing cells of a row must be numeric.
    pub numeric_columns: usize,
    /// Fewest whitespace tokens a row may have before it ends the table.
    pub min_columns: usize,
}

impl TableSpec {
    /// Aliases of the column with the given key, empty when absent.
    pub fn aliases_for(&self, key: &str) -> Vec<String> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.aliases.clone())
            .unwrap_or_default()
    }
}

/// Default scalar field rules.
pub fn default_field_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(
            VENDOR_NAME,
            [
                "Vendor Name",
                "Vendor",
                "Supplier Name",
                "Supplier",
                "Seller",
                "Company Name",
                "Billed From",
                "From",
                "Name",
            ],
            ValuePattern::FreeText,
        ),
        FieldRule::new(
            BILL_NUMBER,
            [
                "Bill Number",
                "Bill No",
                "Bill #",
                "Invoice Number",
                "Invoice No",
                "Invoice #",
                "Reference Number",
                "Reference No",
                "Ref No",
            ],
            ValuePattern::Identifier,
        ),
        FieldRule::new(
            CREATED_DATE,
            [
                "Invoice Date",
                "Bill Date",
                "Issue Date",
                "Date of Issue",
                "Created Date",
                "Created On",
                "Date",
            ],
            ValuePattern::Date,
        ),
        FieldRule::new(
            DUE_DATE,
            ["Due Date", "Payment Due", "Due By", "Due On", "Pay By"],
            ValuePattern::Date,
        ),
    ]
}

/// Default table signatures: line items first, then expenses.
pub fn default_table_specs() -> Vec<TableSpec> {
    vec![
        TableSpec {
            kind: TableKind::Items,
            columns: vec![
                ColumnSpec::required(
                    "item_name",
                    &["item", "item name", "items", "product", "particulars", "service", "description"],
                ),
                ColumnSpec::optional("description", &["description", "details", "item description"]),
                ColumnSpec::required("quantity", &["quantity", "qty", "units", "hours"]),
                ColumnSpec::required("rate", &["rate", "price", "unit price", "unit cost"]),
                ColumnSpec::required("amount", &["amount", "total", "line total"]),
            ],
            numeric_columns: 3,
            min_columns: 3,
        },
        TableSpec {
            kind: TableKind::Expenses,
            columns: vec![
                ColumnSpec::required("account", &["account", "expense account", "category", "ledger"]),
                ColumnSpec::required("amount", &["amount", "total"]),
            ],
            numeric_columns: 1,
            min_columns: 2,
        },
    ]
}
