//! Preview command - the invoice table with CGST/SGST split and totals

use crate::cmd::{load_invoice, TaxArgs};
use crate::invoice::{
    compute_totals, format_fixed, format_money, format_plain, InvoiceDocument, InvoiceTotals,
    Ledger, Party, RowTax,
};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct PreviewCommand {
    /// JSON invoice file ("-" for stdin); starts from the sample items when omitted
    #[arg(short, long)]
    invoice: Option<PathBuf>,

    #[command(flatten)]
    tax: TaxArgs,

    /// Output rows as CSV instead of a formatted table
    #[arg(long, conflicts_with = "json")]
    csv: bool,

    /// Output the whole preview as JSON
    #[arg(long)]
    json: bool,
}

impl PreviewCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (document, ledger) = load_invoice(self.invoice.as_deref(), &self.tax)?;
        let totals = compute_totals(ledger.items(), &document.tax)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();

        if self.csv {
            write_csv(&totals, &mut out)
        } else if self.json {
            let data = PreviewData::new(&document, &ledger, &totals);
            writeln!(out, "{}", serde_json::to_string_pretty(&data)?)?;
            Ok(())
        } else {
            write_preview(&mut out, &document, &totals)?;
            Ok(())
        }
    }
}

/// Row for the preview table output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PreviewRow {
    #[tabled(rename = "#")]
    pub row_num: usize,

    #[tabled(rename = "Description")]
    pub description: String,

    #[tabled(rename = "GST %")]
    pub gst_rate: String,

    #[tabled(rename = "Qty")]
    pub quantity: String,

    #[tabled(rename = "Rate")]
    pub rate: String,

    #[tabled(rename = "Amount")]
    pub amount: String,

    #[tabled(rename = "CGST")]
    pub cgst: String,

    #[tabled(rename = "SGST")]
    pub sgst: String,

    #[tabled(rename = "Total")]
    pub total: String,
}

impl From<&RowTax> for PreviewRow {
    fn from(row: &RowTax) -> Self {
        PreviewRow {
            row_num: row.row_num,
            description: row.description.clone(),
            gst_rate: format_fixed(row.gst_rate),
            quantity: format_plain(row.quantity),
            rate: format_fixed(row.rate),
            amount: format_fixed(row.amount),
            cgst: format_fixed(row.cgst),
            sgst: format_fixed(row.sgst),
            total: format_fixed(row.row_total),
        }
    }
}

/// Preview data for JSON output
#[derive(Debug, Serialize)]
struct PreviewData {
    invoice_no: String,
    date: String,
    from: Party,
    bill_to: Party,
    gst_mode: String,
    item_count: usize,
    rows: Vec<PreviewRow>,
    subtotal: String,
    discount: String,
    tax: String,
    grand_total: String,
    bank_details: String,
    notes: String,
}

impl PreviewData {
    fn new(document: &InvoiceDocument, ledger: &Ledger, totals: &InvoiceTotals) -> Self {
        PreviewData {
            invoice_no: document.invoice_no.clone(),
            date: document.date.clone(),
            from: document.from.clone(),
            bill_to: document.bill_to.clone(),
            gst_mode: document.tax.mode.to_string(),
            item_count: ledger.len(),
            rows: totals.rows.iter().map(PreviewRow::from).collect(),
            subtotal: format_fixed(totals.subtotal),
            discount: format_fixed(totals.discount),
            tax: format_fixed(totals.total_tax),
            grand_total: format_fixed(totals.grand_total),
            bank_details: document.bank_details.clone(),
            notes: document.notes.clone(),
        }
    }
}

/// Render the rows as a table, or a placeholder when there are none
pub fn rows_table(totals: &InvoiceTotals) -> String {
    if totals.rows.is_empty() {
        return "No items".to_string();
    }
    let rows: Vec<PreviewRow> = totals.rows.iter().map(PreviewRow::from).collect();
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string()
}

/// Subtotal, discount, tax and grand total on one line
pub fn totals_line(totals: &InvoiceTotals) -> String {
    format!(
        "Subtotal: {} | Discount: {} | GST: {} | Grand Total: {}",
        format_money(totals.subtotal),
        format_money(totals.discount),
        format_money(totals.total_tax),
        format_money(totals.grand_total),
    )
}

/// Write the full text preview: header, parties, rows, totals and footer
pub fn write_preview<W: Write>(
    out: &mut W,
    document: &InvoiceDocument,
    totals: &InvoiceTotals,
) -> io::Result<()> {
    let title = if document.invoice_no.is_empty() {
        "INVOICE".to_string()
    } else {
        format!("INVOICE {}", document.invoice_no)
    };
    writeln!(out)?;
    writeln!(out, "{}  ({})", title, document.date)?;
    writeln!(out, "GST mode: {}", document.tax.mode)?;
    writeln!(out)?;
    write_party(out, "FROM", &document.from)?;
    write_party(out, "BILL TO", &document.bill_to)?;

    writeln!(out, "{}", rows_table(totals))?;
    writeln!(out)?;
    writeln!(out, "  Subtotal:    {:>14}", format_money(totals.subtotal))?;
    writeln!(out, "  Discount:    {:>14}", format_money(totals.discount))?;
    writeln!(out, "  GST:         {:>14}", format_money(totals.total_tax))?;
    writeln!(out, "  Grand Total: {:>14}", format_money(totals.grand_total))?;

    write_block(out, "BANK DETAILS", &document.bank_details)?;
    write_block(out, "NOTES", &document.notes)
}

fn write_party<W: Write>(out: &mut W, heading: &str, party: &Party) -> io::Result<()> {
    if party.name.is_empty() && party.details.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", heading)?;
    if !party.name.is_empty() {
        writeln!(out, "  {}", party.name)?;
    }
    for line in party.details.lines() {
        writeln!(out, "  {}", line)?;
    }
    writeln!(out)
}

fn write_block<W: Write>(out: &mut W, heading: &str, text: &str) -> io::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", heading)?;
    for line in text.lines() {
        writeln!(out, "  {}", line)?;
    }
    Ok(())
}

fn write_csv<W: Write>(totals: &InvoiceTotals, out: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in &totals.rows {
        wtr.serialize(PreviewRow::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{GstMode, TaxSettings};
    use rust_decimal_macros::dec;

    fn sample() -> (InvoiceDocument, InvoiceTotals) {
        let document = InvoiceDocument {
            invoice_no: "INV-1".to_string(),
            date: "01-04-2025".to_string(),
            from: Party {
                name: "Acme Components".to_string(),
                details: "12 MG Road\nBengaluru".to_string(),
            },
            notes: "Thanks!".to_string(),
            ..InvoiceDocument::default()
        };
        let totals = compute_totals(Ledger::seeded().items(), &document.tax).unwrap();
        (document, totals)
    }

    #[test]
    fn preview_row_formats_figures() {
        let (_, totals) = sample();
        let row = PreviewRow::from(&totals.rows[0]);
        assert_eq!(row.row_num, 1);
        assert_eq!(row.gst_rate, "18.00");
        assert_eq!(row.quantity, "10");
        assert_eq!(row.rate, "7.63");
        assert_eq!(row.amount, "76.30");
        assert_eq!(row.cgst, "6.87");
        assert_eq!(row.sgst, "6.87");
        assert_eq!(row.total, "90.03");
    }

    #[test]
    fn text_preview_contains_sections() {
        let (document, totals) = sample();
        let mut out = Vec::new();
        write_preview(&mut out, &document, &totals).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("INVOICE INV-1  (01-04-2025)"));
        assert!(text.contains("FROM"));
        assert!(text.contains("  Bengaluru"));
        assert!(!text.contains("BILL TO"));
        assert!(text.contains("10k Ohm Potentiometer"));
        assert!(text.contains("\u{20B9}1029.70"));
        assert!(text.contains("\u{20B9}1157.84"));
        assert!(text.contains("NOTES"));
        assert!(!text.contains("BANK DETAILS"));
    }

    #[test]
    fn empty_ledger_shows_placeholder() {
        let totals = compute_totals(&[], &TaxSettings::default()).unwrap();
        assert_eq!(rows_table(&totals), "No items");
    }

    #[test]
    fn totals_line_in_global_mode() {
        let settings = TaxSettings {
            mode: GstMode::Global,
            global_gst_rate: dec!(0),
            discount: dec!(29.7),
        };
        let totals = compute_totals(Ledger::seeded().items(), &settings).unwrap();
        assert_eq!(
            totals_line(&totals),
            "Subtotal: \u{20B9}1029.70 | Discount: \u{20B9}29.70 | GST: \u{20B9}0.00 | Grand Total: \u{20B9}1000.00"
        );
    }

    #[test]
    fn csv_has_header_and_rows() {
        let (_, totals) = sample();
        let mut out = Vec::new();
        write_csv(&totals, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("row_num,description,gst_rate,quantity,rate,amount,cgst,sgst,total")
        );
        assert_eq!(
            lines.next(),
            Some("1,10k Ohm Potentiometer,18.00,10,7.63,76.30,6.87,6.87,90.03")
        );
        assert_eq!(lines.count(), 1);
    }
}
