use super::InventoryRepository;
use crate::error::{InventoryError, InventoryResult};
use crate::model::InventoryItem;
use crate::query::{ItemFilter, Predicate};
use async_trait::async_trait;
use sqlx::{query, query_as, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{error, info};

pub(crate) const SELECT_ITEMS_SQL: &str =
    "SELECT id, name, category, quantity, condition, restock_level FROM inventory";

const INSERT_ITEM_SQL: &str = "INSERT INTO inventory (name, category, quantity, condition, restock_level) VALUES ($1, $2, $3, $4, $5) RETURNING id, name, category, quantity, condition, restock_level";

const UPDATE_ITEM_SQL: &str = "UPDATE inventory SET name = $1, category = $2, quantity = $3, condition = $4, restock_level = $5 WHERE id = $6 RETURNING id, name, category, quantity, condition, restock_level";

#[derive(Clone)]
pub struct PgInventoryRepository {
    pool: PgPool,
}

impl PgInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn begin(&self) -> InventoryResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(InventoryError::Persistence)
    }
}

/// Commit on success; roll back and wrap the cause on failure.
async fn finish<T>(
    tx: Transaction<'static, Postgres>,
    outcome: Result<T, sqlx::Error>,
    action: &'static str,
) -> InventoryResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(|err| {
                error!(error = %err, action, "Commit failed");
                InventoryError::Persistence(err)
            })?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, action, "Rollback failed");
            }
            error!(error = %err, action, "Error writing inventory record");
            Err(InventoryError::Persistence(err))
        }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ItemFilter) {
    for (index, predicate) in filter.predicates().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        builder.push(predicate.column());
        builder.push(" = ");
        match predicate {
            Predicate::Name(value) | Predicate::Category(value) => {
                builder.push_bind(value.clone());
            }
            Predicate::Quantity(value) | Predicate::RestockLevel(value) => {
                builder.push_bind(*value);
            }
            Predicate::Condition(value) => {
                builder.push_bind(*value);
            }
        }
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn create(&self, item: &InventoryItem) -> InventoryResult<InventoryItem> {
        info!(name = %item.name, "Creating inventory item");
        let mut tx = self.begin().await?;
        let outcome = query_as::<_, InventoryItem>(INSERT_ITEM_SQL)
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.quantity)
            .bind(item.condition)
            .bind(item.restock_level)
            .fetch_one(&mut *tx)
            .await;
        finish(tx, outcome, "create").await
    }

    async fn update(&self, item: &InventoryItem) -> InventoryResult<InventoryItem> {
        let id = item.persisted_id()?;
        info!(item_id = id, name = %item.name, "Saving inventory item");
        let mut tx = self.begin().await?;
        let outcome = query_as::<_, InventoryItem>(UPDATE_ITEM_SQL)
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.quantity)
            .bind(item.condition)
            .bind(item.restock_level)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await;
        finish(tx, outcome, "update").await?.ok_or(InventoryError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> InventoryResult<bool> {
        info!(item_id = id, "Deleting inventory item");
        let mut tx = self.begin().await?;
        let outcome = query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await;
        let result = finish(tx, outcome, "delete").await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_all(&self) -> InventoryResult<u64> {
        let mut tx = self.begin().await?;
        let outcome = query("DELETE FROM inventory").execute(&mut *tx).await;
        let result = finish(tx, outcome, "remove_all").await?;
        Ok(result.rows_affected())
    }

    async fn find(&self, id: i32) -> InventoryResult<Option<InventoryItem>> {
        info!(item_id = id, "Processing lookup");
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ITEMS_SQL);
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder
            .build_query_as::<InventoryItem>()
            .fetch_optional(&self.pool)
            .await
            .map_err(InventoryError::Query)
    }

    async fn find_matching(&self, filter: &ItemFilter) -> InventoryResult<Vec<InventoryItem>> {
        info!(predicates = filter.predicates().len(), "Processing inventory query");
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_ITEMS_SQL);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY id");
        builder
            .build_query_as::<InventoryItem>()
            .fetch_all(&self.pool)
            .await
            .map_err(InventoryError::Query)
    }
}
