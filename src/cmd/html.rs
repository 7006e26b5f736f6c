//! Printable HTML invoice
//!
//! Generates a self-contained HTML page with embedded print CSS. Printing it
//! from the browser produces the PDF.

use crate::cmd::{load_invoice, TaxArgs};
use crate::invoice::{
    compute_totals, format_fixed, format_money, format_plain, InvoiceDocument, InvoiceTotals,
};
use clap::Args;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct HtmlCommand {
    /// JSON invoice file ("-" for stdin); starts from the sample items when omitted
    #[arg(short, long)]
    invoice: Option<PathBuf>,

    #[command(flatten)]
    tax: TaxArgs,

    /// Output file path, or "-" for stdout (default: opens in browser)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl HtmlCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (document, ledger) = load_invoice(self.invoice.as_deref(), &self.tax)?;
        let totals = compute_totals(ledger.items(), &document.tax)?;
        let html = generate(&document, &totals);

        match self.output {
            Some(ref path) if path.as_os_str() == "-" => {
                io::stdout().lock().write_all(html.as_bytes())?;
            }
            Some(ref path) => {
                std::fs::write(path, &html)?;
                println!("HTML invoice written to: {}", path.display());
            }
            None => {
                // Write to temp file and open in browser
                let temp_path = std::env::temp_dir().join(file_name(&document.invoice_no));
                std::fs::write(&temp_path, &html)?;
                opener::open(&temp_path)?;
                println!("Opened HTML invoice in browser: {}", temp_path.display());
            }
        }

        Ok(())
    }
}

/// `<invoice_no>.html`, or `invoice.html` without a number. Characters that
/// are unsafe in file names become `_`.
pub fn file_name(invoice_no: &str) -> PathBuf {
    let stem: String = invoice_no
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        PathBuf::from("invoice.html")
    } else {
        PathBuf::from(format!("{}.html", stem))
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape multi-line text, turning newlines into `<br>`
pub fn escape_multiline(s: &str) -> String {
    escape_html(s).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Generate the HTML invoice
pub fn generate(document: &InvoiceDocument, totals: &InvoiceTotals) -> String {
    let title = if document.invoice_no.is_empty() {
        "Invoice".to_string()
    } else {
        format!("Invoice {}", escape_html(&document.invoice_no))
    };

    let bill_to = if document.bill_to.details.is_empty() {
        escape_html(&document.bill_to.name)
    } else {
        format!(
            "{}<br>{}",
            escape_html(&document.bill_to.name),
            escape_multiline(&document.bill_to.details)
        )
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
<div class="invoice">
    <header>
        <div class="brand">
            <h1 id="brandName">{brand_name}</h1>
            <div id="brandDetails" class="muted">{brand_details}</div>
        </div>
        <div class="meta">
            <h2>TAX INVOICE</h2>
            <div>Invoice No: <strong id="metaInvoiceNo">{invoice_no}</strong></div>
            <div>Date: <strong id="metaDate">{date}</strong></div>
        </div>
    </header>
    <section class="bill-to">
        <h3>Bill To</h3>
        <div id="billTo">{bill_to}</div>
    </section>
    <table>
        <thead>
            <tr>
                <th>#</th><th>Description</th><th>GST %</th><th>Qty</th>
                <th class="num">Rate</th><th class="num">Amount</th>
                <th class="num">CGST</th><th class="num">SGST</th><th class="num">Total</th>
            </tr>
        </thead>
        <tbody id="itemsTableBody">
{rows}        </tbody>
    </table>
    <section class="totals">
        <div><span>Subtotal</span><span id="subtotal">{subtotal}</span></div>
        <div><span>Discount</span><span id="discountVal">{discount}</span></div>
        <div><span>GST</span><span id="taxVal">{tax}</span></div>
        <div class="grand"><span>Grand Total</span><span id="grandTotal">{grand_total}</span></div>
    </section>
    <footer>
        <div><h3>Bank Details</h3><div id="bankPreview">{bank}</div></div>
        <div><h3>Notes</h3><div id="notesPreview">{notes}</div></div>
    </footer>
</div>
</body>
</html>
"##,
        title = title,
        css = CSS,
        brand_name = escape_html(&document.from.name),
        brand_details = escape_multiline(&document.from.details),
        invoice_no = escape_html(&document.invoice_no),
        date = escape_html(&document.date),
        bill_to = bill_to,
        rows = table_rows(totals),
        subtotal = format_money(totals.subtotal),
        discount = format_money(totals.discount),
        tax = format_money(totals.total_tax),
        grand_total = format_money(totals.grand_total),
        bank = escape_multiline(&document.bank_details),
        notes = escape_multiline(&document.notes),
    )
}

fn table_rows(totals: &InvoiceTotals) -> String {
    if totals.rows.is_empty() {
        return "            <tr><td colspan=\"9\" class=\"muted\">No items</td></tr>\n".to_string();
    }
    let mut html = String::new();
    for row in &totals.rows {
        // Writing to a String cannot fail
        let _ = writeln!(
            html,
            "            <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td class=\"num\">{}</td><td class=\"num\">{}</td>\
             <td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            row.row_num,
            escape_html(&row.description),
            format_fixed(row.gst_rate),
            format_plain(row.quantity),
            format_fixed(row.rate),
            format_fixed(row.amount),
            format_fixed(row.cgst),
            format_fixed(row.sgst),
            format_fixed(row.row_total),
        );
    }
    html
}

const CSS: &str = r#"
        * { box-sizing: border-box; }
        body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; color: #222; margin: 0; background: #f4f4f4; }
        .invoice { max-width: 210mm; margin: 20px auto; padding: 16mm; background: #fff; }
        header { display: flex; justify-content: space-between; gap: 24px; border-bottom: 2px solid #222; padding-bottom: 12px; }
        h1 { margin: 0 0 6px; font-size: 22px; }
        h2 { margin: 0 0 6px; font-size: 18px; letter-spacing: 1px; }
        h3 { margin: 16px 0 6px; font-size: 13px; text-transform: uppercase; color: #555; }
        .meta { text-align: right; }
        .muted { color: #666; }
        table { width: 100%; border-collapse: collapse; margin-top: 16px; font-size: 13px; }
        th, td { border: 1px solid #ccc; padding: 6px 8px; text-align: left; }
        th { background: #f0f0f0; }
        .num { text-align: right; font-variant-numeric: tabular-nums; }
        .totals { margin: 16px 0 0 auto; width: 280px; }
        .totals div { display: flex; justify-content: space-between; padding: 4px 0; }
        .totals .grand { border-top: 2px solid #222; font-weight: bold; font-size: 16px; }
        footer { display: flex; gap: 24px; margin-top: 24px; font-size: 13px; }
        footer > div { flex: 1; }
        @media print {
            body { background: #fff; }
            .invoice { margin: 0; padding: 0; max-width: none; }
            @page { size: A4 portrait; margin: 10mm; }
        }
"#;
