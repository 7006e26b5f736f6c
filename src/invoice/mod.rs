pub mod document;
pub mod format;
pub mod item;
pub mod ledger;
pub mod parse;
pub mod tax;

// Flat public surface for domain types and functions.
#[allow(unused_imports)]
pub use document::{read_invoice_json, InvoiceDocument, ItemInput, Party};
pub use format::{format_fixed, format_money, format_plain};
#[allow(unused_imports)]
pub use item::{apply_edit, EditError, Field, ItemEdit, LineItem};
pub use ledger::{Ledger, LedgerError};
pub use parse::parse_numeric_or_zero;
#[allow(unused_imports)]
pub use tax::{compute_row, compute_totals, GstMode, InvoiceTotals, RowTax, TaxError, TaxSettings};
