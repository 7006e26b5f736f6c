use super::item::LineItem;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which GST rate applies to each row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GstMode {
    /// Each item carries its own rate
    #[default]
    Individual,
    /// One rate applies to every item
    Global,
}

impl GstMode {
    /// Read a mode the way the form does: "individual" selects per-item
    /// rates, anything else the global rate.
    pub fn from_form_value(s: &str) -> GstMode {
        if s.trim().eq_ignore_ascii_case("individual") {
            GstMode::Individual
        } else {
            GstMode::Global
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            GstMode::Individual => "individual",
            GstMode::Global => "global",
        }
    }
}

impl std::fmt::Display for GstMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}

fn default_global_gst_rate() -> Decimal {
    dec!(18)
}

/// Invoice-wide tax inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxSettings {
    #[serde(default)]
    pub mode: GstMode,
    /// GST percentage used for every row in global mode
    #[serde(default = "default_global_gst_rate")]
    #[schemars(with = "f64")]
    pub global_gst_rate: Decimal,
    /// Flat amount subtracted once from the grand total
    #[serde(default)]
    #[schemars(with = "f64")]
    pub discount: Decimal,
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            mode: GstMode::default(),
            global_gst_rate: default_global_gst_rate(),
            discount: Decimal::ZERO,
        }
    }
}

impl TaxSettings {
    pub fn effective_gst(&self, item: &LineItem) -> Decimal {
        match self.mode {
            GstMode::Individual => item.gst_rate,
            GstMode::Global => self.global_gst_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxError {
    #[error("row {row}: amount is too large to represent")]
    RowOverflow { row: usize },
    #[error("invoice totals are too large to represent")]
    TotalsOverflow,
}

/// Tax breakdown for one preview row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowTax {
    /// 1-based position in the invoice
    pub row_num: usize,
    pub description: String,
    pub gst_rate: Decimal,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total_tax: Decimal,
    pub row_total: Decimal,
}

/// Every preview row plus the invoice aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub rows: Vec<RowTax>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

/// Compute the CGST/SGST split for a single item
pub fn compute_row(
    row_num: usize,
    item: &LineItem,
    settings: &TaxSettings,
) -> Result<RowTax, TaxError> {
    let overflow = || TaxError::RowOverflow { row: row_num };
    let gst = settings.effective_gst(item);
    let amount = item.amount().ok_or_else(overflow)?;
    let half = amount
        .checked_mul(gst)
        .and_then(|t| t.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|t| t.checked_div(Decimal::TWO))
        .ok_or_else(overflow)?;
    let total_tax = half.checked_mul(Decimal::TWO).ok_or_else(overflow)?;
    let row_total = amount.checked_add(total_tax).ok_or_else(overflow)?;

    Ok(RowTax {
        row_num,
        description: item.description.clone(),
        gst_rate: gst,
        quantity: item.quantity,
        rate: item.rate_excluding_tax,
        amount,
        cgst: half,
        sgst: half,
        total_tax,
        row_total,
    })
}

/// Compute every row and the invoice aggregates.
///
/// The discount is subtracted once from the aggregate, never per row.
pub fn compute_totals(items: &[LineItem], settings: &TaxSettings) -> Result<InvoiceTotals, TaxError> {
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, item)| compute_row(i + 1, item, settings))
        .collect::<Result<Vec<_>, _>>()?;

    let (subtotal, total_tax) = rows
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(sub, tax), row| {
            Some((sub.checked_add(row.amount)?, tax.checked_add(row.total_tax)?))
        })
        .ok_or(TaxError::TotalsOverflow)?;

    let grand_total = subtotal
        .checked_sub(settings.discount)
        .and_then(|t| t.checked_add(total_tax))
        .ok_or(TaxError::TotalsOverflow)?;

    log::debug!(
        "Totals for {} rows: subtotal {}, tax {}, grand total {}",
        rows.len(),
        subtotal,
        total_tax,
        grand_total
    );

    Ok(InvoiceTotals {
        rows,
        subtotal,
        discount: settings.discount,
        total_tax,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: &str, gst: Decimal, qty: Decimal, rate: Decimal) -> LineItem {
        LineItem::new(description, gst, qty, rate).unwrap()
    }

    #[test]
    fn widget_row_splits_tax_in_halves() {
        let widget = item("Widget", dec!(18), dec!(10), dec!(7.63));
        let row = compute_row(1, &widget, &TaxSettings::default()).unwrap();
        assert_eq!(row.amount, dec!(76.30));
        assert_eq!(row.cgst, dec!(6.867));
        assert_eq!(row.sgst, dec!(6.867));
        assert_eq!(row.total_tax, dec!(13.734));
        assert_eq!(row.row_total, dec!(90.034));
    }

    #[test]
    fn global_mode_with_discount() {
        let items = vec![
            item("A", dec!(5), dec!(1), dec!(100)),
            item("B", dec!(28), dec!(2), dec!(25)),
        ];
        let settings = TaxSettings {
            mode: GstMode::Global,
            global_gst_rate: dec!(12),
            discount: dec!(20),
        };

        let totals = compute_totals(&items, &settings).unwrap();
        assert_eq!(totals.subtotal, dec!(150));
        assert_eq!(totals.total_tax, dec!(18));
        assert_eq!(totals.discount, dec!(20));
        assert_eq!(totals.grand_total, dec!(148));
        assert!(totals.rows.iter().all(|r| r.gst_rate == dec!(12)));
    }

    #[test]
    fn individual_mode_uses_item_rates() {
        let items = vec![
            item("A", dec!(5), dec!(1), dec!(100)),
            item("B", dec!(28), dec!(2), dec!(25)),
        ];
        let totals = compute_totals(&items, &TaxSettings::default()).unwrap();
        assert_eq!(totals.rows[0].total_tax, dec!(5));
        assert_eq!(totals.rows[1].total_tax, dec!(14));
        assert_eq!(totals.total_tax, dec!(19));
        assert_eq!(totals.grand_total, dec!(169));
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let items = vec![
            item("A", dec!(0), dec!(1), dec!(1)),
            item("B", dec!(0), dec!(1), dec!(1)),
        ];
        let totals = compute_totals(&items, &TaxSettings::default()).unwrap();
        let nums: Vec<_> = totals.rows.iter().map(|r| r.row_num).collect();
        assert_eq!(nums, vec![1, 2]);
    }

    #[test]
    fn empty_invoice_is_minus_discount() {
        let settings = TaxSettings {
            discount: dec!(20),
            ..TaxSettings::default()
        };
        let totals = compute_totals(&[], &settings).unwrap();
        assert!(totals.rows.is_empty());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.grand_total, dec!(-20));
    }

    #[test]
    fn overflowing_amount_is_an_error() {
        let huge = LineItem {
            description: "Huge".to_string(),
            gst_rate: dec!(18),
            quantity: Decimal::MAX,
            rate_excluding_tax: dec!(2),
            total_including_tax: Decimal::ZERO,
        };
        let err = compute_totals(&[huge], &TaxSettings::default()).unwrap_err();
        assert_eq!(err, TaxError::RowOverflow { row: 1 });
    }

    #[test]
    fn mode_from_form_value() {
        assert_eq!(GstMode::from_form_value("individual"), GstMode::Individual);
        assert_eq!(GstMode::from_form_value(" Individual "), GstMode::Individual);
        assert_eq!(GstMode::from_form_value("global"), GstMode::Global);
        assert_eq!(GstMode::from_form_value(""), GstMode::Global);
        assert_eq!(GstMode::from_form_value("per-item"), GstMode::Global);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: TaxSettings = serde_json::from_str(r#"{"mode": "global"}"#).unwrap();
        assert_eq!(settings.mode, GstMode::Global);
        assert_eq!(settings.global_gst_rate, dec!(18));
        assert_eq!(settings.discount, Decimal::ZERO);
    }
}
