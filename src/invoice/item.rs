use super::parse::parse_numeric_or_zero;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Description given to items appended from the editor
pub const DEFAULT_DESCRIPTION: &str = "New Item";

/// Reasons an item edit is rejected. A rejected edit leaves the item unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("cannot derive a rate from the total while quantity is zero")]
    ZeroQuantity,
    #[error("cannot derive a rate from the total while GST is -100%")]
    ZeroTaxFactor,
    #[error("amount is too large to represent")]
    Overflow,
}

/// One row of the invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    pub description: String,
    /// GST percentage for this item
    #[schemars(with = "f64")]
    pub gst_rate: Decimal,
    #[schemars(with = "f64")]
    pub quantity: Decimal,
    /// Unit price before tax
    #[schemars(with = "f64")]
    pub rate_excluding_tax: Decimal,
    /// `quantity * rate_excluding_tax * (1 + gst_rate / 100)` once reconciled
    #[schemars(with = "f64")]
    pub total_including_tax: Decimal,
}

impl LineItem {
    /// Build an item from its pre-tax rate, deriving the tax-inclusive total.
    #[cfg(test)]
    pub fn new(
        description: impl Into<String>,
        gst_rate: Decimal,
        quantity: Decimal,
        rate_excluding_tax: Decimal,
    ) -> Result<Self, EditError> {
        Ok(LineItem {
            description: description.into(),
            gst_rate,
            quantity,
            rate_excluding_tax,
            total_including_tax: total_from_rate(quantity, rate_excluding_tax, gst_rate)?,
        })
    }

    /// The item appended by "add item": one unit at zero rate, 18% GST.
    pub fn placeholder() -> Self {
        LineItem {
            description: DEFAULT_DESCRIPTION.to_string(),
            gst_rate: dec!(18),
            quantity: Decimal::ONE,
            rate_excluding_tax: Decimal::ZERO,
            total_including_tax: Decimal::ZERO,
        }
    }

    /// Pre-tax amount for the row
    pub fn amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.rate_excluding_tax)
    }
}

/// Editable fields of a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Description,
    GstRate,
    Quantity,
    RateExcludingTax,
    TotalIncludingTax,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Description,
        Field::GstRate,
        Field::Quantity,
        Field::RateExcludingTax,
        Field::TotalIncludingTax,
    ];

    /// Look up a field by its name or short editor alias
    pub fn from_name(s: &str) -> Option<Field> {
        match s.to_lowercase().as_str() {
            "desc" | "description" => Some(Field::Description),
            "gst" | "gst_rate" => Some(Field::GstRate),
            "qty" | "quantity" => Some(Field::Quantity),
            "rate" | "rate_excluding_tax" => Some(Field::RateExcludingTax),
            "total" | "total_including_tax" => Some(Field::TotalIncludingTax),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::GstRate => "gst_rate",
            Field::Quantity => "quantity",
            Field::RateExcludingTax => "rate_excluding_tax",
            Field::TotalIncludingTax => "total_including_tax",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Field::Description => "desc",
            Field::GstRate => "gst",
            Field::Quantity => "qty",
            Field::RateExcludingTax => "rate",
            Field::TotalIncludingTax => "total",
        }
    }

    pub fn is_numeric(self) -> bool {
        self != Field::Description
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single-field edit. Which variant is applied decides whether the rate or
/// the total is the source of truth for that edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    Description(String),
    GstRate(Decimal),
    Quantity(Decimal),
    /// Rate is authoritative: the total is re-derived from it
    Rate(Decimal),
    /// Total is authoritative: the rate is back-derived from it
    Total(Decimal),
}

impl ItemEdit {
    /// Build an edit from raw form input. Numeric fields never fail: unreadable
    /// input becomes zero.
    pub fn from_raw(field: Field, raw: &str) -> ItemEdit {
        match field {
            Field::Description => ItemEdit::Description(raw.to_string()),
            Field::GstRate => ItemEdit::GstRate(parse_numeric_or_zero(raw)),
            Field::Quantity => ItemEdit::Quantity(parse_numeric_or_zero(raw)),
            Field::RateExcludingTax => ItemEdit::Rate(parse_numeric_or_zero(raw)),
            Field::TotalIncludingTax => ItemEdit::Total(parse_numeric_or_zero(raw)),
        }
    }

    pub fn field(&self) -> Field {
        match self {
            ItemEdit::Description(_) => Field::Description,
            ItemEdit::GstRate(_) => Field::GstRate,
            ItemEdit::Quantity(_) => Field::Quantity,
            ItemEdit::Rate(_) => Field::RateExcludingTax,
            ItemEdit::Total(_) => Field::TotalIncludingTax,
        }
    }
}

/// Apply one edit to an item, returning the reconciled item.
///
/// GST and quantity edits are stored without touching the total; the next
/// display reconciliation re-derives it. They are still rejected if that
/// total would overflow.
pub fn apply_edit(item: &LineItem, edit: &ItemEdit) -> Result<LineItem, EditError> {
    let mut next = item.clone();
    match edit {
        ItemEdit::Description(text) => next.description = text.clone(),
        ItemEdit::GstRate(gst) => {
            total_from_rate(next.quantity, next.rate_excluding_tax, *gst)?;
            next.gst_rate = *gst;
        }
        ItemEdit::Quantity(qty) => {
            total_from_rate(*qty, next.rate_excluding_tax, next.gst_rate)?;
            next.quantity = *qty;
        }
        ItemEdit::Rate(rate) => {
            next.total_including_tax = total_from_rate(next.quantity, *rate, next.gst_rate)?;
            next.rate_excluding_tax = *rate;
        }
        ItemEdit::Total(total) => {
            next.rate_excluding_tax = rate_from_total(*total, next.quantity, next.gst_rate)?;
            next.total_including_tax = *total;
        }
    }
    Ok(next)
}

/// `1 + gst_rate / 100`
fn tax_factor(gst_rate: Decimal) -> Option<Decimal> {
    Decimal::ONE.checked_add(gst_rate.checked_div(Decimal::ONE_HUNDRED)?)
}

/// `quantity * rate * (1 + gst_rate / 100)`
pub fn total_from_rate(
    quantity: Decimal,
    rate: Decimal,
    gst_rate: Decimal,
) -> Result<Decimal, EditError> {
    quantity
        .checked_mul(rate)
        .and_then(|amount| amount.checked_mul(tax_factor(gst_rate)?))
        .ok_or(EditError::Overflow)
}

/// `(total / quantity) / (1 + gst_rate / 100)`
pub fn rate_from_total(
    total: Decimal,
    quantity: Decimal,
    gst_rate: Decimal,
) -> Result<Decimal, EditError> {
    if quantity.is_zero() {
        return Err(EditError::ZeroQuantity);
    }
    let factor = tax_factor(gst_rate).ok_or(EditError::Overflow)?;
    if factor.is_zero() {
        return Err(EditError::ZeroTaxFactor);
    }
    total
        .checked_div(quantity)
        .and_then(|unit| unit.checked_div(factor))
        .ok_or(EditError::Overflow)
}
