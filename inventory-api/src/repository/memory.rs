use super::InventoryRepository;
use crate::error::{InventoryError, InventoryResult};
use crate::model::InventoryItem;
use crate::query::ItemFilter;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    last_id: i32,
    items: BTreeMap<i32, InventoryItem>,
}

/// Process-local store with the same contract as the Postgres repository.
/// Backs the router tests; not durable.
#[derive(Default)]
pub struct MemoryInventoryRepository {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
}

impl MemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a persistence fault, leaving state untouched.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> InventoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InventoryError::Persistence(sqlx::Error::Protocol(
                "simulated write failure".into(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for MemoryInventoryRepository {
    async fn create(&self, item: &InventoryItem) -> InventoryResult<InventoryItem> {
        self.check_writable()?;
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;
        let created = InventoryItem { id: Some(id), ..item.clone() };
        state.items.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, item: &InventoryItem) -> InventoryResult<InventoryItem> {
        let id = item.persisted_id()?;
        self.check_writable()?;
        let mut state = self.lock();
        match state.items.get_mut(&id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(stored.clone())
            }
            None => Err(InventoryError::NotFound(id)),
        }
    }

    async fn delete(&self, id: i32) -> InventoryResult<bool> {
        self.check_writable()?;
        Ok(self.lock().items.remove(&id).is_some())
    }

    async fn remove_all(&self) -> InventoryResult<u64> {
        self.check_writable()?;
        let mut state = self.lock();
        let removed = state.items.len() as u64;
        state.items.clear();
        Ok(removed)
    }

    async fn find(&self, id: i32) -> InventoryResult<Option<InventoryItem>> {
        Ok(self.lock().items.get(&id).cloned())
    }

    async fn find_matching(&self, filter: &ItemFilter) -> InventoryResult<Vec<InventoryItem>> {
        Ok(self
            .lock()
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }
}
