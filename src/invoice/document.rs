use super::item::{ItemEdit, DEFAULT_DESCRIPTION};
use super::ledger::{Ledger, LedgerError};
use super::tax::TaxSettings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Sender or client block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Party {
    #[serde(default)]
    pub name: String,
    /// Address, tax ids and contact lines (newline separated)
    #[serde(default)]
    pub details: String,
}

/// Input line item.
///
/// Either `rate` (before tax) or `total` (including tax) prices the item; the
/// other is derived. When both are present `rate` wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItemInput {
    #[serde(default = "default_description")]
    pub description: String,
    /// GST percentage
    #[serde(default = "default_gst_rate")]
    #[schemars(with = "f64")]
    pub gst_rate: Decimal,
    #[serde(default = "default_quantity")]
    #[schemars(with = "f64")]
    pub quantity: Decimal,
    /// Unit price before tax
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub rate: Option<Decimal>,
    /// Row total including tax
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub total: Option<Decimal>,
}

/// Everything on the invoice form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InvoiceDocument {
    #[serde(default)]
    pub invoice_no: String,
    /// Invoice date as printed (defaults to today, DD-MM-YYYY)
    #[serde(default = "default_invoice_date")]
    pub date: String,
    #[serde(default)]
    pub from: Party,
    #[serde(default)]
    pub bill_to: Party,
    #[serde(default)]
    pub bank_details: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tax: TaxSettings,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

impl Default for InvoiceDocument {
    fn default() -> Self {
        InvoiceDocument {
            invoice_no: String::new(),
            date: default_invoice_date(),
            from: Party::default(),
            bill_to: Party::default(),
            bank_details: String::new(),
            notes: String::new(),
            tax: TaxSettings::default(),
            items: Vec::new(),
        }
    }
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_gst_rate() -> Decimal {
    dec!(18)
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

/// Today's date as the form pre-fills it
pub fn default_invoice_date() -> String {
    chrono::Local::now().format("%d-%m-%Y").to_string()
}

impl InvoiceDocument {
    /// Build the ledger by replaying each input item through the editor's
    /// edit path, then reconcile for display.
    pub fn to_ledger(&self) -> Result<Ledger, LedgerError> {
        let mut ledger = Ledger::new();
        for input in &self.items {
            let index = ledger.add_item();
            ledger.apply_edit(index, &ItemEdit::Description(input.description.clone()))?;
            ledger.apply_edit(index, &ItemEdit::GstRate(input.gst_rate))?;
            ledger.apply_edit(index, &ItemEdit::Quantity(input.quantity))?;
            match (input.rate, input.total) {
                (Some(rate), total) => {
                    if total.is_some() {
                        log::warn!(
                            "Item {} has both rate and total, using rate",
                            input.description
                        );
                    }
                    ledger.apply_edit(index, &ItemEdit::Rate(rate))?;
                }
                (None, Some(total)) => ledger.apply_edit(index, &ItemEdit::Total(total))?,
                (None, None) => {}
            }
        }
        ledger.reconcile_for_display();
        log::info!("Loaded {} items", ledger.len());
        Ok(ledger)
    }
}

pub fn read_invoice_json<R: Read>(reader: R) -> anyhow::Result<InvoiceDocument> {
    let document: InvoiceDocument = serde_json::from_reader(reader)?;
    Ok(document)
}
