use crate::error::{InventoryError, InventoryResult};
use crate::model::InventoryItem;

/// Quantity after restocking an item at or under its restock level.
///
/// The deficit below `restock_level` is added on top of `restock_level`, so the
/// result exceeds the level by exactly the prior deficit. Placeholder policy
/// until replenishment is driven by sales velocity.
pub fn restocked_quantity(quantity: i32, restock_level: i32) -> InventoryResult<i32> {
    if quantity > restock_level {
        return Err(InventoryError::RestockNotNeeded { quantity, restock_level });
    }
    restock_level
        .checked_mul(2)
        .and_then(|doubled| doubled.checked_sub(quantity))
        .ok_or_else(|| {
            InventoryError::validation(format!(
                "Restock of quantity [{quantity}] to level [{restock_level}] overflows"
            ))
        })
}

impl InventoryItem {
    /// Apply the restock rule in memory; persisting is the caller's job.
    pub fn restock(&mut self) -> InventoryResult<i32> {
        self.quantity = restocked_quantity(self.quantity, self.restock_level)?;
        Ok(self.quantity)
    }
}
