use super::item::{apply_edit, total_from_rate, EditError, Field, ItemEdit, LineItem};
use rust_decimal_macros::dec;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("no item at row {} (ledger has {len} items)", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },
    #[error("row {}: {source}", .index + 1)]
    Edit {
        index: usize,
        #[source]
        source: EditError,
    },
}

/// Ordered line items backing the editor and the preview.
///
/// Views hold no copies: after every mutation they pull [`Ledger::items`] and
/// re-derive everything they show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    items: Vec<LineItem>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two items a fresh invoice starts with
    pub fn seeded() -> Self {
        let mut ledger = Ledger::new();
        ledger.items.push(LineItem {
            description: "10k Ohm Potentiometer".to_string(),
            gst_rate: dec!(18),
            quantity: dec!(10),
            rate_excluding_tax: dec!(7.63),
            total_including_tax: dec!(0),
        });
        ledger.items.push(LineItem {
            description: "Flex Sensor 2.2\"".to_string(),
            gst_rate: dec!(12),
            quantity: dec!(5),
            rate_excluding_tax: dec!(190.68),
            total_including_tax: dec!(0),
        });
        ledger.reconcile_for_display();
        ledger
    }

    /// Snapshot of the current items, in display order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a default item, returning its index
    pub fn add_item(&mut self) -> usize {
        self.items.push(LineItem::placeholder());
        log::debug!("Added item, ledger now has {} items", self.items.len());
        self.items.len() - 1
    }

    /// Remove the item at `index`, keeping the order of the rest
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, LedgerError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        log::debug!("Removed item {}: {}", index, removed.description);
        Ok(removed)
    }

    pub fn clear_all(&mut self) {
        log::debug!("Clearing {} items", self.items.len());
        self.items.clear();
    }

    /// Set one field from raw form input
    pub fn set_field(&mut self, index: usize, field: Field, raw: &str) -> Result<(), LedgerError> {
        self.apply_edit(index, &ItemEdit::from_raw(field, raw))
    }

    /// Apply an edit to the item at `index`. A rejected edit leaves the item untouched.
    pub fn apply_edit(&mut self, index: usize, edit: &ItemEdit) -> Result<(), LedgerError> {
        self.check_index(index)?;
        let item = &mut self.items[index];
        let next = apply_edit(item, edit).map_err(|source| LedgerError::Edit { index, source })?;
        log::debug!("Item {} {} -> {:?}", index, edit.field(), next);
        *item = next;
        Ok(())
    }

    /// Re-derive every total from quantity, rate and GST, discarding any
    /// total entered since the last reconciliation.
    pub fn reconcile_for_display(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            match total_from_rate(item.quantity, item.rate_excluding_tax, item.gst_rate) {
                Ok(total) => item.total_including_tax = total,
                Err(e) => log::warn!("Keeping total for item {}: {}", index, e),
            }
        }
    }

    fn check_index(&self, index: usize) -> Result<(), LedgerError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(LedgerError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl FromIterator<LineItem> for Ledger {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Ledger {
            items: iter.into_iter().collect(),
        }
    }
}
