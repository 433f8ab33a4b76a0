use crate::error::InventoryResult;
use crate::model::{Condition, InventoryItem};
use crate::query::{ItemFilter, Predicate, SearchCriteria};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::MemoryInventoryRepository;
pub use postgres::PgInventoryRepository;

/// Storage for inventory items.
///
/// Each write is all-or-nothing: on failure nothing is visible and a
/// `Persistence` fault is returned. Reads never fail on empty results.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Insert a new row. Any id on `item` is ignored; the returned item carries the new key.
    async fn create(&self, item: &InventoryItem) -> InventoryResult<InventoryItem>;

    /// Write every field of an existing row. Fails with a validation fault when `item.id` is unset or zero.
    async fn update(&self, item: &InventoryItem) -> InventoryResult<InventoryItem>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> InventoryResult<bool>;

    /// Returns the number of rows removed.
    async fn remove_all(&self) -> InventoryResult<u64>;

    async fn find(&self, id: i32) -> InventoryResult<Option<InventoryItem>>;

    /// Rows matching every predicate, ordered by id.
    async fn find_matching(&self, filter: &ItemFilter) -> InventoryResult<Vec<InventoryItem>>;

    async fn all(&self) -> InventoryResult<Vec<InventoryItem>> {
        self.find_matching(&ItemFilter::all()).await
    }

    async fn search(&self, criteria: &SearchCriteria) -> InventoryResult<Vec<InventoryItem>> {
        self.find_matching(&criteria.to_filter()).await
    }

    async fn find_by_name(&self, name: &str) -> InventoryResult<Vec<InventoryItem>> {
        self.find_matching(&ItemFilter::only(Predicate::Name(name.to_string()))).await
    }

    async fn find_by_category(&self, category: &str) -> InventoryResult<Vec<InventoryItem>> {
        self.find_matching(&ItemFilter::only(Predicate::Category(category.to_string()))).await
    }

    async fn find_by_quantity(&self, quantity: i32) -> InventoryResult<Vec<InventoryItem>> {
        self.find_matching(&ItemFilter::only(Predicate::Quantity(quantity))).await
    }

    async fn find_by_condition(&self, condition: Condition) -> InventoryResult<Vec<InventoryItem>> {
        self.find_matching(&ItemFilter::only(Predicate::Condition(condition))).await
    }

    async fn find_by_restock_level(&self, restock_level: i32) -> InventoryResult<Vec<InventoryItem>> {
        self.find_matching(&ItemFilter::only(Predicate::RestockLevel(restock_level))).await
    }
}
