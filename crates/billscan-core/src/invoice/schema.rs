//! Assembly of the final structured record.

use std::collections::{BTreeMap, HashMap};

use crate::models::invoice::*;
use crate::normalize::NormalizedText;

use super::fields::ExtractedField;
use super::rules::{
    default_field_rules, CellValue, TableKind, TableSpec, BILL_NUMBER, CREATED_DATE, DUE_DATE, VENDOR_NAME,
};
use super::table::TableRow;

/// Column keys of the trailing numeric cells, in row order.
#[derive(Debug, Clone, Default)]
struct NumericLayout {
    keys: Vec<String>,
}

impl NumericLayout {
    fn from_spec(spec: &TableSpec) -> Self {
        let skip = spec.columns.len().saturating_sub(spec.numeric_columns);
        Self {
            keys: spec.columns.iter().skip(skip).map(|c| c.key.clone()).collect(),
        }
    }

    /// Pick the cell for `key`, aligning keys and values from the right.
    fn cell(&self, values: &[CellValue], key: &str) -> Option<CellValue> {
        let position = self.keys.iter().position(|k| k == key)?;
        let offset = self.keys.len() - position;
        values
            .len()
            .checked_sub(offset)
            .and_then(|i| values.get(i))
            .cloned()
    }
}

/// Builds `InvoiceDocument`s with a stable shape.
///
/// Canonical fields missing from the configured rules still appear, null,
/// with their default aliases.
pub struct SchemaBuilder {
    item_aliases: LineItemAliases,
    expense_aliases: ExpenseAliases,
    item_layout: NumericLayout,
    expense_layout: NumericLayout,
    default_aliases: HashMap<String, Vec<String>>,
}

impl SchemaBuilder {
    pub fn new<'a>(specs: impl IntoIterator<Item = &'a TableSpec>) -> Self {
        let specs: Vec<&TableSpec> = specs.into_iter().collect();
        let find = |kind: TableKind| specs.iter().copied().find(|s| s.kind == kind);

        let (item_aliases, item_layout) = match find(TableKind::Items) {
            Some(spec) => (
                LineItemAliases {
                    item_name: spec.aliases_for("item_name"),
                    description: spec.aliases_for("description"),
                    quantity: spec.aliases_for("quantity"),
                    rate: spec.aliases_for("rate"),
                    amount: spec.aliases_for("amount"),
                },
                NumericLayout::from_spec(spec),
            ),
            None => (
                LineItemAliases {
                    item_name: Vec::new(),
                    description: Vec::new(),
                    quantity: Vec::new(),
                    rate: Vec::new(),
                    amount: Vec::new(),
                },
                NumericLayout::default(),
            ),
        };

        let (expense_aliases, expense_layout) = match find(TableKind::Expenses) {
            Some(spec) => (
                ExpenseAliases {
                    account: spec.aliases_for("account"),
                    amount: spec.aliases_for("amount"),
                },
                NumericLayout::from_spec(spec),
            ),
            None => (
                ExpenseAliases {
                    account: Vec::new(),
                    amount: Vec::new(),
                },
                NumericLayout::default(),
            ),
        };

        let default_aliases = default_field_rules()
            .into_iter()
            .map(|rule| (rule.name, rule.aliases))
            .collect();

        Self {
            item_aliases,
            expense_aliases,
            item_layout,
            expense_layout,
            default_aliases,
        }
    }

    /// Assemble the record from extraction results.
    pub fn build(&self, fields: Vec<ExtractedField>, rows: Vec<TableRow>, text: &NormalizedText) -> InvoiceDocument {
        let mut by_name: BTreeMap<String, ExtractedField> =
            fields.into_iter().map(|f| (f.name.clone(), f)).collect();

        let mut take = |name: &str| -> (Option<String>, Vec<String>) {
            match by_name.remove(name) {
                Some(field) => (field.value, field.aliases),
                None => (None, self.default_aliases.get(name).cloned().unwrap_or_default()),
            }
        };

        let (vendor_name, vendor_aliases) = take(VENDOR_NAME);
        let (bill_number, bill_aliases) = take(BILL_NUMBER);
        let (created_date, created_aliases) = take(CREATED_DATE);
        let (due_date, due_aliases) = take(DUE_DATE);

        let additional_fields = by_name
            .into_values()
            .map(|f| {
                (
                    f.name,
                    FieldValue {
                        value: f.value,
                        aliases: f.aliases,
                    },
                )
            })
            .collect();

        let mut items = Vec::new();
        let mut expenses = Vec::new();
        for row in rows {
            match row.kind {
                TableKind::Items => items.push(self.line_item(row)),
                TableKind::Expenses => expenses.push(self.expense(row)),
            }
        }

        InvoiceDocument {
            raw_text: text.flat.clone(),
            structured_data: StructuredInvoice {
                vendor_info: VendorInfo {
                    name: vendor_name,
                    aliases: vendor_aliases,
                },
                bill_info: BillInfo {
                    bill_number,
                    aliases: bill_aliases,
                },
                dates: Dates {
                    created_date,
                    due_date,
                    aliases: DateAliases {
                        created_date: created_aliases,
                        due_date: due_aliases,
                    },
                },
                items,
                expenses,
                additional_fields,
            },
        }
    }

    fn line_item(&self, row: TableRow) -> LineItem {
        LineItem {
            quantity: self.item_layout.cell(&row.values, "quantity"),
            rate: self.item_layout.cell(&row.values, "rate"),
            amount: self.item_layout.cell(&row.values, "amount"),
            item_name: row.label,
            description: row.description,
            aliases: self.item_aliases.clone(),
        }
    }

    fn expense(&self, row: TableRow) -> ExpenseEntry {
        let account = match (row.label, row.description) {
            (Some(label), Some(description)) => Some(format!("{label} {description}")),
            (label, None) => label,
            (None, description) => description,
        };
        ExpenseEntry {
            amount: self.expense_layout.cell(&row.values, "amount"),
            account,
            aliases: self.expense_aliases.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::{default_table_specs, ColumnSpec};
    use crate::normalize::normalize;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn builder() -> SchemaBuilder {
        SchemaBuilder::new(&default_table_specs())
    }

    #[test]
    fn test_missing_fields_keep_default_aliases() {
        let doc = builder().build(Vec::new(), Vec::new(), &normalize("nothing here"));
        let data = &doc.structured_data;

        assert_eq!(data.vendor_info.name, None);
        assert!(data.vendor_info.aliases.contains(&"Vendor".to_string()));
        assert!(data.bill_info.aliases.contains(&"Bill No".to_string()));
        assert!(!data.dates.aliases.created_date.is_empty());
        assert!(!data.dates.aliases.due_date.is_empty());
        assert!(data.items.is_empty());
        assert!(data.expenses.is_empty());
        assert_eq!(doc.raw_text, "nothing here");
    }

    #[test]
    fn test_rows_are_mapped_by_kind() {
        let rows = vec![
            TableRow {
                kind: TableKind::Items,
                label: Some("Widget".to_string()),
                description: None,
                values: vec![
                    CellValue::Number(Decimal::from(4)),
                    CellValue::Number(Decimal::from(10)),
                    CellValue::Number(Decimal::from(40)),
                ],
            },
            TableRow {
                kind: TableKind::Expenses,
                label: Some("Travel".to_string()),
                description: None,
                values: vec![CellValue::Text("$80".to_string())],
            },
        ];

        let doc = builder().build(Vec::new(), rows, &normalize(""));
        let data = doc.structured_data;

        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].item_name.as_deref(), Some("Widget"));
        assert_eq!(data.items[0].quantity, Some(CellValue::Number(Decimal::from(4))));
        assert_eq!(data.items[0].amount, Some(CellValue::Number(Decimal::from(40))));
        assert!(data.items[0].aliases.quantity.contains(&"qty".to_string()));

        assert_eq!(data.expenses.len(), 1);
        assert_eq!(data.expenses[0].account.as_deref(), Some("Travel"));
        assert_eq!(data.expenses[0].amount, Some(CellValue::Text("$80".to_string())));
        assert!(data.expenses[0].aliases.account.contains(&"account".to_string()));
    }

    #[test]
    fn test_extra_rules_go_to_additional_fields() {
        let fields = vec![ExtractedField {
            name: "po_number".to_string(),
            value: Some("5512".to_string()),
            aliases: vec!["PO".to_string()],
        }];
        let doc = builder().build(fields, Vec::new(), &normalize(""));
        let extra = &doc.structured_data.additional_fields["po_number"];
        assert_eq!(extra.value.as_deref(), Some("5512"));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["structured_data"]["additional_fields"]["po_number"]["aliases"][0], "PO");
    }

    #[test]
    fn test_additional_fields_omitted_when_empty() {
        let doc = builder().build(Vec::new(), Vec::new(), &normalize(""));
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["structured_data"].get("additional_fields").is_none());
    }

    #[test]
    fn test_narrower_numeric_layout() {
        let mut specs = default_table_specs();
        specs[0] = TableSpec {
            kind: TableKind::Items,
            columns: vec![
                ColumnSpec {
                    key: "item_name".to_string(),
                    aliases: vec!["item".to_string()],
                    required: true,
                },
                ColumnSpec {
                    key: "amount".to_string(),
                    aliases: vec!["amount".to_string()],
                    required: true,
                },
            ],
            numeric_columns: 1,
            min_columns: 2,
        };
        let row = TableRow {
            kind: TableKind::Items,
            label: Some("Fee".to_string()),
            description: None,
            values: vec![CellValue::Number(Decimal::from(15))],
        };

        let doc = SchemaBuilder::new(&specs).build(Vec::new(), vec![row], &normalize(""));
        let item = &doc.structured_data.items[0];
        assert_eq!(item.quantity, None);
        assert_eq!(item.rate, None);
        assert_eq!(item.amount, Some(CellValue::Number(Decimal::from(15))));
        assert!(item.aliases.quantity.is_empty());
    }
}
