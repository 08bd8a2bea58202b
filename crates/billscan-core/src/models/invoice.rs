//! Structured invoice output.
//!
//! Every value-bearing node carries the alias vocabulary that was used to
//! find it, whether or not a value was found, so the serialized shape is the
//! same for every document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::invoice::rules::CellValue;

/// Top-level response: the echoed text plus the structured record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocument {
    /// Acquired text with all whitespace collapsed.
    pub raw_text: String,
    pub structured_data: StructuredInvoice,
}

/// The structured record assembled from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredInvoice {
    pub vendor_info: VendorInfo,
    pub bill_info: BillInfo,
    pub dates: Dates,
    pub items: Vec<LineItem>,
    pub expenses: Vec<ExpenseEntry>,
    /// Values of configured rules beyond the canonical four.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    pub name: Option<String>,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillInfo {
    pub bill_number: Option<String>,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dates {
    pub created_date: Option<String>,
    pub due_date: Option<String>,
    pub aliases: DateAliases,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAliases {
    pub created_date: Vec<String>,
    pub due_date: Vec<String>,
}

/// A value found by a non-canonical rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Option<String>,
    pub aliases: Vec<String>,
}

/// One row of the line-item table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<CellValue>,
    pub rate: Option<CellValue>,
    pub amount: Option<CellValue>,
    pub aliases: LineItemAliases,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemAliases {
    pub item_name: Vec<String>,
    pub description: Vec<String>,
    pub quantity: Vec<String>,
    pub rate: Vec<String>,
    pub amount: Vec<String>,
}

/// One row of the expense table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseEntry {
    pub account: Option<String>,
    pub amount: Option<CellValue>,
    pub aliases: ExpenseAliases,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseAliases {
    pub account: Vec<String>,
    pub amount: Vec<String>,
}

impl StructuredInvoice {
    /// Number of canonical scalar fields that carry a value.
    pub fn found_field_count(&self) -> usize {
        [
            &self.vendor_info.name,
            &self.bill_info.bill_number,
            &self.dates.created_date,
            &self.dates.due_date,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}
