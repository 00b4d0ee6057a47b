//! Shared pool of inventory not yet loaded onto any vehicle.

use crate::core::{Registry, StorageItem};

/// Unassigned sku → item pool; insertion order drives distribution order.
#[derive(Default)]
pub struct UnassignedPool {
    items: Registry<StorageItem>,
}

impl UnassignedPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add stock. A sku that is already pooled keeps its position and gains quantity.
    pub fn add(&self, item: StorageItem) {
        let sku = item.sku().to_string();
        self.items
            .upsert_with(&sku, item, |existing, incoming| {
                existing.add_quantity(incoming.quantity());
            });
    }

    /// Atomically take up to `max` units of `sku`. Returns the taken slice, if any.
    pub fn take_up_to(&self, sku: &str, max: u32) -> Option<StorageItem> {
        self.items
            .update(sku, |item| {
                let taken = item.take_up_to(max);
                (taken > 0).then(|| item.with_quantity(taken))
            })
            .flatten()
    }

    /// Remove the first item with stock if `fits` accepts it. Depleted
    /// entries ahead of it are skipped and kept.
    ///
    /// Returns `Ok(None)` when nothing has stock, and `Err` with a copy of the
    /// first stocked item when `fits` refuses it; the pool is then unchanged.
    pub fn take_first_fitting(
        &self,
        fits: impl Fn(&StorageItem) -> bool,
    ) -> Result<Option<StorageItem>, StorageItem> {
        let mut decided = false;
        let mut refused = None;
        let taken = self.items.remove_first_where(|item| {
            if decided || item.quantity() == 0 {
                return false;
            }
            decided = true;
            let ok = fits(item);
            if !ok {
                refused = Some(item.clone());
            }
            ok
        });
        match (taken, refused) {
            (Some(item), _) => Ok(Some(item)),
            (None, Some(item)) => Err(item),
            (None, None) => Ok(None),
        }
    }

    /// Put an item back, merging with any stock that arrived meanwhile.
    pub fn restore(&self, item: StorageItem) {
        self.add(item);
    }

    /// Drop fully consumed items; returns how many were purged.
    pub fn purge_depleted(&self) -> usize {
        self.items.retain(|item| item.quantity() > 0)
    }

    /// Pooled items in distribution order.
    pub fn snapshot(&self) -> Vec<StorageItem> {
        self.items.values()
    }

    /// Copy of one pooled item.
    pub fn get(&self, sku: &str) -> Option<StorageItem> {
        self.items.get(sku)
    }

    /// True when nothing is pooled.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pooled SKUs.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
