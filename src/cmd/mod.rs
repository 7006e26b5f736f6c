pub mod edit;
pub mod html;
pub mod preview;
pub mod schema;

use crate::invoice::{self, parse_numeric_or_zero, GstMode, InvoiceDocument, Ledger, TaxSettings};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GstModeArg {
    /// Each item uses its own GST rate
    Individual,
    /// One GST rate for every item
    Global,
}

impl From<GstModeArg> for GstMode {
    fn from(arg: GstModeArg) -> Self {
        match arg {
            GstModeArg::Individual => GstMode::Individual,
            GstModeArg::Global => GstMode::Global,
        }
    }
}

/// Tax flags shared by every command; they override the invoice file
#[derive(Args, Debug, Clone, Default)]
pub struct TaxArgs {
    /// GST mode
    #[arg(short, long, value_enum)]
    mode: Option<GstModeArg>,

    /// Global GST rate in percent (unreadable values count as 0)
    #[arg(short, long, allow_hyphen_values = true)]
    gst: Option<String>,

    /// Flat discount off the grand total (unreadable values count as 0)
    #[arg(short, long, allow_hyphen_values = true)]
    discount: Option<String>,
}

impl TaxArgs {
    pub fn apply(&self, settings: &mut TaxSettings) {
        if let Some(mode) = self.mode {
            settings.mode = mode.into();
        }
        if let Some(ref gst) = self.gst {
            settings.global_gst_rate = parse_numeric_or_zero(gst);
        }
        if let Some(ref discount) = self.discount {
            settings.discount = parse_numeric_or_zero(discount);
        }
    }
}

/// Load the invoice to work on: the given JSON file (or stdin with "-"), or
/// a blank form with the startup items when no file is given.
pub fn load_invoice(path: Option<&Path>, tax: &TaxArgs) -> anyhow::Result<(InvoiceDocument, Ledger)> {
    let (mut document, ledger) = match path {
        Some(path) => {
            let document = read_invoice(path)?;
            let ledger = document.to_ledger()?;
            (document, ledger)
        }
        None => (InvoiceDocument::default(), Ledger::seeded()),
    };
    tax.apply(&mut document.tax);
    Ok((document, ledger))
}

/// Read an invoice document (JSON) from a file, or stdin with "-"
pub fn read_invoice(path: &Path) -> anyhow::Result<InvoiceDocument> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path)?;
        invoice::read_invoice_json(BufReader::new(file))
    }
}

fn read_from_stdin() -> anyhow::Result<InvoiceDocument> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide an invoice file or pipe JSON to stdin.");
    }

    invoice::read_invoice_json(io::Cursor::new(buffer))
}
