//! Rendering structured invoices as JSON, CSV or a text summary.

use std::fmt::Write as _;

use billscan_core::invoice::rules::CellValue;
use billscan_core::InvoiceDocument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per header, item and expense
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn render(document: &InvoiceDocument, format: OutputFormat, pretty: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Json => Ok(serde_json::to_string(document)?),
        OutputFormat::Csv => format_csv(document),
        OutputFormat::Text => Ok(format_text(document)),
    }
}

fn cell(value: &Option<CellValue>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn format_csv(document: &InvoiceDocument) -> anyhow::Result<String> {
    let data = &document.structured_data;
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "section",
        "vendor_name",
        "bill_number",
        "created_date",
        "due_date",
        "name",
        "description",
        "quantity",
        "rate",
        "amount",
    ])?;

    wtr.write_record([
        "header",
        data.vendor_info.name.as_deref().unwrap_or_default(),
        data.bill_info.bill_number.as_deref().unwrap_or_default(),
        data.dates.created_date.as_deref().unwrap_or_default(),
        data.dates.due_date.as_deref().unwrap_or_default(),
        "",
        "",
        "",
        "",
        "",
    ])?;

    for item in &data.items {
        wtr.write_record([
            "item",
            "",
            "",
            "",
            "",
            item.item_name.as_deref().unwrap_or_default(),
            item.description.as_deref().unwrap_or_default(),
            &cell(&item.quantity),
            &cell(&item.rate),
            &cell(&item.amount),
        ])?;
    }

    for expense in &data.expenses {
        wtr.write_record([
            "expense",
            "",
            "",
            "",
            "",
            expense.account.as_deref().unwrap_or_default(),
            "",
            "",
            "",
            &cell(&expense.amount),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(document: &InvoiceDocument) -> String {
    let data = &document.structured_data;
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let mut output = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(output, "Vendor:    {}", or_dash(&data.vendor_info.name));
    let _ = writeln!(output, "Bill No:   {}", or_dash(&data.bill_info.bill_number));
    let _ = writeln!(output, "Created:   {}", or_dash(&data.dates.created_date));
    let _ = writeln!(output, "Due:       {}", or_dash(&data.dates.due_date));

    if !data.items.is_empty() {
        output.push_str("\nItems:\n");
        for item in &data.items {
            let _ = write!(output, "  {}", or_dash(&item.item_name));
            if let Some(description) = &item.description {
                let _ = write!(output, " ({})", description);
            }
            let _ = writeln!(
                output,
                "  qty {}  rate {}  amount {}",
                cell(&item.quantity),
                cell(&item.rate),
                cell(&item.amount)
            );
        }
    }

    if !data.expenses.is_empty() {
        output.push_str("\nExpenses:\n");
        for expense in &data.expenses {
            let _ = writeln!(output, "  {}  {}", or_dash(&expense.account), cell(&expense.amount));
        }
    }

    for (name, field) in &data.additional_fields {
        let _ = writeln!(output, "{}: {}", name, or_dash(&field.value));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscan_core::{BillscanConfig, TextStructurer};

    fn acme() -> InvoiceDocument {
        let structurer = TextStructurer::new(&BillscanConfig::default().extraction).unwrap();
        structurer.structure("Name: Acme Corp\nBill No: 1029\nItem Qty Rate Amount\nWidget 4 10 40\n")
    }

    #[test]
    fn test_csv_has_header_and_item_rows() {
        let csv = render(&acme(), OutputFormat::Csv, false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "header,Acme Corp,1029,,,,,,,");
        assert_eq!(lines[2], "item,,,,,Widget,,4,10,40");
    }

    #[test]
    fn test_text_summary() {
        let text = render(&acme(), OutputFormat::Text, false).unwrap();
        assert!(text.contains("Vendor:    Acme Corp"));
        assert!(text.contains("Due:       -"));
        assert!(text.contains("Widget  qty 4  rate 10  amount 40"));
    }

    #[test]
    fn test_pretty_json_is_multiline() {
        let compact = render(&acme(), OutputFormat::Json, false).unwrap();
        let pretty = render(&acme(), OutputFormat::Json, true).unwrap();
        assert_eq!(compact.lines().count(), 1);
        assert!(pretty.lines().count() > 1);
    }
}
